//! Decoded tile values and cache keys.

use std::fmt;
use std::sync::Arc;

use image::RgbaImage;

use crate::coord::TileKey;

/// Outcome of resolving one tile.
#[derive(Debug, Clone)]
pub enum TileImage {
    /// Decoded RGBA pixels, shared between the cache and every requester.
    Available(Arc<RgbaImage>),
    /// Every candidate URL failed; `reason` is the last failure.
    Unavailable { reason: String },
}

impl TileImage {
    /// Wraps a decoded image.
    pub fn available(image: RgbaImage) -> Self {
        Self::Available(Arc::new(image))
    }

    /// Builds an unavailable marker.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// The pixels, if available.
    pub fn image(&self) -> Option<&Arc<RgbaImage>> {
        match self {
            Self::Available(image) => Some(image),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Cache identity of a tile: the provider plus the integer tile address.
///
/// The URL is deliberately not part of the key; any shard of a provider
/// serves the same tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    provider: Arc<str>,
    tile: TileKey,
}

impl CacheKey {
    pub fn new(provider: impl Into<Arc<str>>, tile: TileKey) -> Self {
        Self {
            provider: provider.into(),
            tile,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn tile(&self) -> TileKey {
        self.tile
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.tile)
    }
}
