//! Provider factory for centralized provider creation.
//!
//! Maps the provider names accepted by the CLI and config file onto
//! concrete [`TileProvider`] instances.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::template::{blue_marble, open_cycle_map, osm, UrlTemplateProvider};
use super::types::{ProviderError, TileProvider};

/// Configuration for creating a provider.
///
/// # Example
///
/// ```
/// use geotiler::provider::ProviderConfig;
///
/// let osm: ProviderConfig = "osm".parse().unwrap();
/// assert_eq!(osm, ProviderConfig::Osm);
///
/// let custom = ProviderConfig::custom("http://tiles.local/{z}/{x}/{y}.png");
/// assert_eq!(custom.name(), "custom");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProviderConfig {
    /// OpenStreetMap standard layer.
    #[default]
    Osm,

    /// OpenCycleMap layer.
    OpenCycleMap,

    /// NASA Blue Marble imagery (zoom 0-9).
    BlueMarble,

    /// Any `{z}/{x}/{y}` template.
    Custom {
        /// URL template
        template: String,
    },
}

impl ProviderConfig {
    /// Create a custom template provider configuration.
    pub fn custom(template: impl Into<String>) -> Self {
        Self::Custom {
            template: template.into(),
        }
    }

    /// Short name used in config files and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Osm => "osm",
            Self::OpenCycleMap => "cycle",
            Self::BlueMarble => "bluemarble",
            Self::Custom { .. } => "custom",
        }
    }

    /// Names accepted by [`FromStr`].
    pub fn valid_names() -> &'static [&'static str] {
        &["osm", "cycle", "bluemarble"]
    }

    /// Instantiates the provider.
    pub fn create(&self) -> Result<Arc<dyn TileProvider>, ProviderError> {
        let provider: Arc<dyn TileProvider> = match self {
            Self::Osm => Arc::new(osm()),
            Self::OpenCycleMap => Arc::new(open_cycle_map()),
            Self::BlueMarble => Arc::new(blue_marble()),
            Self::Custom { template } => Arc::new(UrlTemplateProvider::new(
                format!("custom:{}", template),
                template,
            )?),
        };
        Ok(provider)
    }
}

impl fmt::Display for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom { template } => write!(f, "custom ({})", template),
            other => write!(f, "{}", other.name()),
        }
    }
}

impl FromStr for ProviderConfig {
    type Err = ProviderError;

    /// Parses a built-in provider name.
    ///
    /// `custom` needs a template and cannot be parsed from a name alone.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "osm" | "openstreetmap" => Ok(Self::Osm),
            "cycle" | "opencyclemap" => Ok(Self::OpenCycleMap),
            "bluemarble" | "blue-marble" => Ok(Self::BlueMarble),
            other => Err(ProviderError::InvalidTemplate(format!(
                "unknown provider '{}', expected one of: {}",
                other,
                Self::valid_names().join(", ")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;

    #[test]
    fn test_parse_names() {
        assert_eq!("osm".parse::<ProviderConfig>().unwrap(), ProviderConfig::Osm);
        assert_eq!(
            "OpenCycleMap".parse::<ProviderConfig>().unwrap(),
            ProviderConfig::OpenCycleMap
        );
        assert_eq!(
            " bluemarble ".parse::<ProviderConfig>().unwrap(),
            ProviderConfig::BlueMarble
        );
        assert!("bing".parse::<ProviderConfig>().is_err());
    }

    #[test]
    fn test_create_builtin() {
        let provider = ProviderConfig::BlueMarble.create().unwrap();
        assert_eq!(provider.id(), "bluemarble");
        assert_eq!(provider.max_zoom(), 9);
    }

    #[test]
    fn test_create_custom() {
        let provider = ProviderConfig::custom("http://host/{z}/{x}/{y}.png")
            .create()
            .unwrap();
        assert_eq!(
            provider.tile_urls(&Coordinate::new(1.0, 2.0, 3)),
            vec!["http://host/3/2/1.png"]
        );
    }

    #[test]
    fn test_custom_ids_follow_template() {
        let a = ProviderConfig::custom("http://a/{z}/{x}/{y}.png").create().unwrap();
        let b = ProviderConfig::custom("http://b/{z}/{x}/{y}.png").create().unwrap();
        assert_eq!(a.id(), "custom:http://a/{z}/{x}/{y}.png");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_create_custom_invalid() {
        assert!(ProviderConfig::custom("http://host/tile.png").create().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ProviderConfig::Osm.to_string(), "osm");
        assert_eq!(
            ProviderConfig::custom("http://h/{z}/{x}/{y}").to_string(),
            "custom (http://h/{z}/{x}/{y})"
        );
    }
}
