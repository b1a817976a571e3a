//! Provider types and traits

use std::fmt;

use crate::coord::{ColumnWrap, Coordinate};
use crate::geo::MercatorProjection;

/// Errors that can occur while fetching a tile from a provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed before a response arrived
    HttpError(String),
    /// Server answered with a non-success status
    HttpStatus { status: u16, url: String },
    /// Request exceeded the per-attempt timeout
    Timeout { url: String, timeout_ms: u64 },
    /// Response body was empty
    EmptyResponse(String),
    /// Response body could not be decoded as an image
    InvalidResponse(String),
    /// Zoom level not supported by this provider
    UnsupportedZoom(u8),
    /// URL template is malformed
    InvalidTemplate(String),
}

impl ProviderError {
    /// Whether another attempt against the same URL could succeed.
    ///
    /// Client errors (4xx) and undecodable bodies are permanent for a URL;
    /// the fetcher moves on to the next candidate instead of retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::HttpError(_) | ProviderError::Timeout { .. } => true,
            ProviderError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            ProviderError::EmptyResponse(_)
            | ProviderError::InvalidResponse(_)
            | ProviderError::UnsupportedZoom(_)
            | ProviderError::InvalidTemplate(_) => false,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::HttpStatus { status, url } => {
                write!(f, "HTTP {} from {}", status, url)
            }
            ProviderError::Timeout { url, timeout_ms } => {
                write!(f, "Timed out after {}ms fetching {}", timeout_ms, url)
            }
            ProviderError::EmptyResponse(url) => write!(f, "Empty response from {}", url),
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ProviderError::UnsupportedZoom(zoom) => {
                write!(f, "Zoom level {} not supported by provider", zoom)
            }
            ProviderError::InvalidTemplate(msg) => write!(f, "Invalid URL template: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// A source of map tiles.
///
/// A provider only describes where tiles live: fetching, caching and
/// compositing are done by [`crate::fetch::TileFetcher`] and
/// [`crate::compositor::Compositor`]. Implementations are independent of
/// each other and hold no shared mutable state.
pub trait TileProvider: Send + Sync {
    /// Stable identity used in cache keys and logs.
    fn id(&self) -> &str;

    /// Tile width in pixels.
    fn tile_width(&self) -> u32 {
        256
    }

    /// Tile height in pixels.
    fn tile_height(&self) -> u32 {
        256
    }

    /// Projection mapping locations onto this provider's tile grid.
    fn projection(&self) -> &MercatorProjection;

    /// Candidate URLs for the tile containing `coordinate`, in priority
    /// order. Never empty.
    fn tile_urls(&self, coordinate: &Coordinate) -> Vec<String>;

    /// Returns the minimum supported zoom level.
    fn min_zoom(&self) -> u8 {
        0
    }

    /// Returns the maximum supported zoom level.
    fn max_zoom(&self) -> u8 {
        19
    }

    /// Checks if this provider supports the given zoom level.
    fn supports_zoom(&self, zoom: u8) -> bool {
        zoom >= self.min_zoom() && zoom <= self.max_zoom()
    }

    /// How columns outside `[0, 2^zoom)` are treated.
    fn column_wrap(&self) -> ColumnWrap {
        ColumnWrap::Wrap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ProviderError::HttpError("reset".into()).is_retryable());
        assert!(ProviderError::HttpStatus {
            status: 503,
            url: "u".into()
        }
        .is_retryable());
        assert!(ProviderError::HttpStatus {
            status: 429,
            url: "u".into()
        }
        .is_retryable());
        assert!(!ProviderError::HttpStatus {
            status: 404,
            url: "u".into()
        }
        .is_retryable());
        assert!(!ProviderError::InvalidResponse("garbage".into()).is_retryable());
    }

    #[test]
    fn test_display() {
        let err = ProviderError::HttpStatus {
            status: 404,
            url: "http://host/1/2/3.png".into(),
        };
        assert_eq!(err.to_string(), "HTTP 404 from http://host/1/2/3.png");
    }
}
