//! Cached, coalescing tile fetcher.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{debug, trace, warn};

use super::download::download_tile;
use crate::cache::{CacheKey, TileCache, TileImage};
use crate::config::FetchConfig;
use crate::coord::Coordinate;
use crate::provider::{AsyncHttpClient, ProviderError, TileProvider};
use crate::telemetry::FetchMetrics;

/// One shared result per in-flight tile.
type InFlight = Arc<OnceCell<TileImage>>;

/// Resolves coordinates to decoded tiles.
///
/// Holds the HTTP client, the tile cache and the in-flight map. Share it
/// between tasks behind an `Arc`.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use geotiler::config::FetchConfig;
/// use geotiler::coord::Coordinate;
/// use geotiler::fetch::TileFetcher;
/// use geotiler::provider::{AsyncReqwestClient, ProviderConfig};
///
/// let fetcher = TileFetcher::new(AsyncReqwestClient::new()?, FetchConfig::default());
/// let provider = ProviderConfig::Osm.create()?;
/// let tile = fetcher.resolve(&Coordinate::new(10.0, 13.0, 7), &provider).await;
/// ```
pub struct TileFetcher<C: AsyncHttpClient> {
    client: C,
    cache: Arc<TileCache>,
    in_flight: DashMap<CacheKey, InFlight>,
    config: FetchConfig,
    metrics: Arc<FetchMetrics>,
}

impl<C: AsyncHttpClient> TileFetcher<C> {
    /// Creates a fetcher with a fresh cache sized by `config.cache_capacity`.
    pub fn new(client: C, config: FetchConfig) -> Self {
        let cache = Arc::new(TileCache::new(config.cache_capacity));
        Self::with_cache(client, cache, config)
    }

    /// Creates a fetcher over an existing cache.
    pub fn with_cache(client: C, cache: Arc<TileCache>, config: FetchConfig) -> Self {
        Self {
            client,
            cache,
            in_flight: DashMap::new(),
            config,
            metrics: Arc::new(FetchMetrics::new()),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn cache(&self) -> &Arc<TileCache> {
        &self.cache
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<FetchMetrics> {
        &self.metrics
    }

    /// Number of tiles currently being fetched.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Resolves the tile containing `coordinate`.
    ///
    /// Never fails: anything that prevents a tile from being fetched and
    /// decoded yields [`TileImage::Unavailable`]. Available tiles are cached;
    /// unavailable ones are not, so a later call retries.
    ///
    /// The coordinate must already be inside the grid (wrap or clip columns
    /// first); coordinates outside it are unavailable.
    pub async fn resolve(
        &self,
        coordinate: &Coordinate,
        provider: &Arc<dyn TileProvider>,
    ) -> TileImage {
        let Some(tile) = coordinate.tile_key() else {
            return TileImage::unavailable(format!("{} is outside the tile grid", coordinate));
        };
        let key = CacheKey::new(provider.id(), tile);

        if let Some(image) = self.cache.get(&key).await {
            trace!(tile = %key, "Tile cache hit");
            self.metrics.cache_hit();
            return TileImage::Available(image);
        }
        self.metrics.cache_miss();

        let cell = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => {
                trace!(tile = %key, "Joining in-flight fetch");
                self.metrics.coalesced_wait();
                Arc::clone(entry.get())
            }
            Entry::Vacant(entry) => Arc::clone(entry.insert(Arc::new(OnceCell::new())).value()),
        };

        let result = cell
            .get_or_init(|| self.fetch_uncached(&key, coordinate, provider))
            .await
            .clone();

        // Only the cell this call used; a newer fetch may already own the key
        self.in_flight
            .remove_if(&key, |_, current| Arc::ptr_eq(current, &cell));

        result
    }

    async fn fetch_uncached(
        &self,
        key: &CacheKey,
        coordinate: &Coordinate,
        provider: &Arc<dyn TileProvider>,
    ) -> TileImage {
        // A fetch that finished between the cache miss and claiming the
        // in-flight slot has already populated the cache
        if let Some(image) = self.cache.get(key).await {
            return TileImage::Available(image);
        }

        let zoom = coordinate.zoom();
        if !provider.supports_zoom(zoom) {
            self.metrics.tile_failed();
            return TileImage::unavailable(ProviderError::UnsupportedZoom(zoom).to_string());
        }

        let urls = provider.tile_urls(&coordinate.container());
        debug!(tile = %key, urls = urls.len(), "Fetching tile");

        match download_tile(&self.client, &urls, &self.config, &self.metrics).await {
            Ok(image) => {
                let image = Arc::new(image);
                self.cache.insert(key.clone(), Arc::clone(&image)).await;
                self.metrics.tile_fetched();
                TileImage::Available(image)
            }
            Err(e) => {
                warn!(tile = %key, error = %e, "Tile unavailable");
                self.metrics.tile_failed();
                TileImage::unavailable(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{png_tile, RecordingHttpClient, UrlTemplateProvider};
    use image::Rgba;
    use std::time::Duration;

    const TEMPLATE: &str = "http://host/{z}/{x}/{y}.png";

    fn provider() -> Arc<dyn TileProvider> {
        Arc::new(UrlTemplateProvider::new("test", TEMPLATE).unwrap())
    }

    fn fast_config() -> FetchConfig {
        FetchConfig::default().with_backoff_base(Duration::from_millis(1))
    }

    fn red_tile() -> Vec<u8> {
        png_tile(Rgba([255, 0, 0, 255]), 256, 256)
    }

    #[tokio::test]
    async fn test_resolve_fetches_then_caches() {
        let fetcher = TileFetcher::new(RecordingHttpClient::new(Ok(red_tile())), fast_config());
        let provider = provider();
        let coordinate = Coordinate::new(10.0, 13.0, 7);

        let first = fetcher.resolve(&coordinate, &provider).await;
        let second = fetcher.resolve(&coordinate, &provider).await;

        assert!(first.is_available());
        assert!(second.is_available());
        assert_eq!(fetcher.client.call_count(), 1);
        assert_eq!(fetcher.client.urls(), vec!["http://host/7/13/10.png"]);

        let snapshot = fetcher.metrics().snapshot();
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.tiles_fetched, 1);
    }

    #[tokio::test]
    async fn test_fractional_coordinates_share_a_tile() {
        let fetcher = TileFetcher::new(RecordingHttpClient::new(Ok(red_tile())), fast_config());
        let provider = provider();

        fetcher.resolve(&Coordinate::new(10.2, 13.7, 7), &provider).await;
        fetcher.resolve(&Coordinate::new(10.9, 13.1, 7), &provider).await;

        assert_eq!(fetcher.client.call_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_resolves_coalesce() {
        let client = RecordingHttpClient::new(Ok(red_tile())).with_delay(Duration::from_millis(50));
        let fetcher = Arc::new(TileFetcher::new(client, fast_config()));
        let provider = provider();
        let coordinate = Coordinate::new(10.0, 13.0, 7);

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let fetcher = Arc::clone(&fetcher);
                let provider = Arc::clone(&provider);
                tokio::spawn(async move { fetcher.resolve(&coordinate, &provider).await })
            })
            .collect();

        let results = futures::future::join_all(handles).await;
        let images: Vec<_> = results
            .into_iter()
            .map(|r| r.unwrap().image().cloned().unwrap())
            .collect();

        assert_eq!(fetcher.client.call_count(), 1);
        assert!(images.iter().all(|i| Arc::ptr_eq(i, &images[0])));
        assert_eq!(fetcher.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_is_not_cached() {
        let client = RecordingHttpClient::new(Err(ProviderError::HttpStatus {
            status: 404,
            url: "x".into(),
        }));
        let fetcher = TileFetcher::new(client, fast_config());
        let provider = provider();
        let coordinate = Coordinate::new(1.0, 1.0, 2);

        let first = fetcher.resolve(&coordinate, &provider).await;
        let second = fetcher.resolve(&coordinate, &provider).await;

        assert!(matches!(first, TileImage::Unavailable { .. }));
        assert!(matches!(second, TileImage::Unavailable { .. }));
        assert_eq!(fetcher.client.call_count(), 2);
        assert_eq!(fetcher.cache().entry_count(), 0);
        assert_eq!(fetcher.metrics().snapshot().tiles_failed, 2);
    }

    #[tokio::test]
    async fn test_outside_grid_is_unavailable_without_fetch() {
        let fetcher = TileFetcher::new(RecordingHttpClient::new(Ok(red_tile())), fast_config());
        let provider = provider();

        let result = fetcher
            .resolve(&Coordinate::new(-1.0, 0.0, 3), &provider)
            .await;

        assert!(!result.is_available());
        assert_eq!(fetcher.client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_zoom_is_unavailable_without_fetch() {
        let provider: Arc<dyn TileProvider> = Arc::new(
            UrlTemplateProvider::new("low", TEMPLATE)
                .unwrap()
                .with_zoom_range(0, 5),
        );
        let fetcher = TileFetcher::new(RecordingHttpClient::new(Ok(red_tile())), fast_config());

        let result = fetcher.resolve(&Coordinate::new(0.0, 0.0, 6), &provider).await;

        match result {
            TileImage::Unavailable { reason } => assert!(reason.contains("Zoom level 6")),
            TileImage::Available(_) => panic!("expected unavailable"),
        }
        assert_eq!(fetcher.client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_providers_do_not_share_cache_entries() {
        let cache = Arc::new(TileCache::new(16));
        let fetcher = TileFetcher::with_cache(
            RecordingHttpClient::new(Ok(red_tile())),
            Arc::clone(&cache),
            fast_config(),
        );
        let a: Arc<dyn TileProvider> =
            Arc::new(UrlTemplateProvider::new("a", "http://a/{z}/{x}/{y}.png").unwrap());
        let b: Arc<dyn TileProvider> =
            Arc::new(UrlTemplateProvider::new("b", "http://b/{z}/{x}/{y}.png").unwrap());
        let coordinate = Coordinate::new(0.0, 0.0, 1);

        fetcher.resolve(&coordinate, &a).await;
        fetcher.resolve(&coordinate, &b).await;

        assert_eq!(fetcher.client.call_count(), 2);
        cache.run_pending_tasks().await;
        assert_eq!(cache.entry_count(), 2);
    }

    #[tokio::test]
    async fn test_custom_templates_do_not_share_cache_entries() {
        use crate::provider::ProviderConfig;

        let fetcher = TileFetcher::new(RecordingHttpClient::new(Ok(red_tile())), fast_config());
        let a = ProviderConfig::custom("http://a/{z}/{x}/{y}.png").create().unwrap();
        let b = ProviderConfig::custom("http://b/{z}/{x}/{y}.png").create().unwrap();
        let coordinate = Coordinate::new(10.0, 13.0, 7);

        assert!(fetcher.resolve(&coordinate, &a).await.is_available());
        assert!(fetcher.resolve(&coordinate, &b).await.is_available());

        assert_eq!(
            fetcher.client.urls(),
            vec!["http://a/7/13/10.png", "http://b/7/13/10.png"]
        );
    }
}
