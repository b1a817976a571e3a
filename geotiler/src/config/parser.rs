//! INI parsing logic for converting `Ini` → `ConfigFile`.

use std::str::FromStr;
use std::time::Duration;

use image::Rgba;
use ini::{Ini, Properties};

use super::file::{ConfigFile, ConfigFileError};
use crate::provider::ProviderConfig;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [provider] section
    if let Some(section) = ini.section(Some("provider")) {
        let url = section
            .get("url")
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let kind = section.get("type").map(|v| v.trim().to_lowercase());

        config.provider = match (kind.as_deref(), url) {
            (Some("custom"), Some(url)) | (None, Some(url)) => ProviderConfig::custom(url),
            (Some("custom"), None) => {
                return Err(invalid("provider", "type", "custom", "custom requires url"));
            }
            (Some(name), _) => ProviderConfig::from_str(name).map_err(|_| {
                invalid(
                    "provider",
                    "type",
                    name,
                    "must be one of: osm, cycle, bluemarble, custom",
                )
            })?,
            (None, None) => ProviderConfig::default(),
        };
    }

    // [fetch] section
    if let Some(section) = ini.section(Some("fetch")) {
        if let Some(v) = parse_value::<u32>(section, "fetch", "max_attempts")? {
            if v == 0 {
                return Err(invalid("fetch", "max_attempts", "0", "must be at least 1"));
            }
            config.fetch.max_attempts = v;
        }
        if let Some(v) = parse_value::<u64>(section, "fetch", "backoff_ms")? {
            config.fetch.backoff_base = Duration::from_millis(v);
        }
        if let Some(v) = parse_value::<u64>(section, "fetch", "timeout_secs")? {
            if v == 0 {
                return Err(invalid("fetch", "timeout_secs", "0", "must be at least 1"));
            }
            config.fetch.request_timeout = Duration::from_secs(v);
        }
        if let Some(v) = parse_value::<usize>(section, "fetch", "concurrency")? {
            if v == 0 {
                return Err(invalid("fetch", "concurrency", "0", "must be at least 1"));
            }
            config.fetch.concurrency = v;
        }
        if let Some(v) = parse_value::<u64>(section, "fetch", "cache_capacity")? {
            config.fetch.cache_capacity = v;
        }
    }

    // [render] section
    if let Some(section) = ini.section(Some("render")) {
        if let Some(v) = section.get("background") {
            config.render.background = parse_color(v).ok_or_else(|| {
                invalid(
                    "render",
                    "background",
                    v,
                    "must be #rrggbb or #rrggbbaa",
                )
            })?;
        }
        if let Some(v) = parse_value::<u8>(section, "render", "min_zoom")? {
            config.render.min_zoom = v;
        }
        if let Some(v) = parse_value::<u8>(section, "render", "max_zoom")? {
            config.render.max_zoom = v;
        }
        if config.render.min_zoom > config.render.max_zoom {
            return Err(invalid(
                "render",
                "min_zoom",
                &config.render.min_zoom.to_string(),
                "must not exceed max_zoom",
            ));
        }
        if let Some(v) = parse_value::<bool>(section, "render", "fail_when_all_unavailable")? {
            config.render.fail_when_all_unavailable = v;
        }
    }

    Ok(config)
}

/// Parse a `#rrggbb` or `#rrggbbaa` hex colour. Opaque when alpha is omitted.
pub fn parse_color(value: &str) -> Option<Rgba<u8>> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

fn parse_value<T: FromStr>(
    section: &Properties,
    section_name: &str,
    key: &str,
) -> Result<Option<T>, ConfigFileError> {
    match section.get(key) {
        None => Ok(None),
        Some(v) => v.trim().parse::<T>().map(Some).map_err(|_| {
            invalid(
                section_name,
                key,
                v,
                &format!("expected {}", std::any::type_name::<T>()),
            )
        }),
    }
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
