//! Concurrent tile fetch and stitching.

use std::sync::Arc;
use std::time::Instant;

use image::{imageops, RgbaImage};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::layout::{PlacedTile, TileLayout};
use super::types::{RenderError, RenderReport, RenderRequest};
use crate::cache::TileImage;
use crate::config::RenderConfig;
use crate::fetch::TileFetcher;
use crate::provider::{AsyncHttpClient, TileProvider};

/// Renders bounding boxes into rasters.
///
/// Cheap to share: clone the `Arc<TileFetcher>` into several compositors,
/// or share one compositor behind an `Arc`.
pub struct Compositor<C: AsyncHttpClient + 'static> {
    fetcher: Arc<TileFetcher<C>>,
    config: RenderConfig,
}

impl<C: AsyncHttpClient + 'static> Compositor<C> {
    pub fn new(fetcher: Arc<TileFetcher<C>>, config: RenderConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn fetcher(&self) -> &Arc<TileFetcher<C>> {
        &self.fetcher
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Renders `request` into an RGBA raster of exactly the requested size.
    ///
    /// Unavailable tiles leave the background showing.
    ///
    /// # Errors
    ///
    /// - [`RenderError::InvalidDimensions`] for a zero width or height
    /// - [`RenderError::Cancelled`] as soon as `cancel` fires
    /// - [`RenderError::AllTilesUnavailable`] only when configured
    pub async fn render(
        &self,
        request: &RenderRequest,
        provider: Arc<dyn TileProvider>,
        cancel: &CancellationToken,
    ) -> Result<RgbaImage, RenderError> {
        self.render_with_report(request, provider, cancel)
            .await
            .map(|(image, _)| image)
    }

    /// Like [`render`](Self::render), also returning what happened.
    pub async fn render_with_report(
        &self,
        request: &RenderRequest,
        provider: Arc<dyn TileProvider>,
        cancel: &CancellationToken,
    ) -> Result<(RgbaImage, RenderReport), RenderError> {
        let start = Instant::now();

        if request.width() == 0 || request.height() == 0 {
            return Err(RenderError::InvalidDimensions {
                width: request.width(),
                height: request.height(),
            });
        }
        if cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }

        let layout = TileLayout::plan(
            request,
            provider.as_ref(),
            self.config.min_zoom,
            self.config.max_zoom,
        );
        let (tiles, skipped) = layout.placements(provider.column_wrap());

        debug!(
            provider = provider.id(),
            zoom = layout.zoom(),
            tiles = tiles.len(),
            skipped = skipped,
            width = request.width(),
            height = request.height(),
            "Render planned"
        );

        let (resolved, failed_tasks) = self.resolve_all(&tiles, &provider, cancel).await?;

        let mut canvas =
            RgbaImage::from_pixel(request.width(), request.height(), self.config.background);
        let mut report = RenderReport {
            zoom: layout.zoom(),
            tiles_requested: tiles.len(),
            tiles_skipped: skipped,
            tiles_unavailable: failed_tasks,
            ..Default::default()
        };

        for (placed, tile) in resolved {
            match tile {
                TileImage::Available(image) => {
                    imageops::replace(&mut canvas, &*image, placed.x, placed.y);
                    report.tiles_available += 1;
                }
                TileImage::Unavailable { reason } => {
                    warn!(
                        tile = %placed.coordinate,
                        reason = %reason,
                        "Tile unavailable, leaving blank"
                    );
                    report.tiles_unavailable += 1;
                }
            }
        }
        report.elapsed = start.elapsed();

        if self.config.fail_when_all_unavailable
            && report.tiles_requested > 0
            && report.tiles_available == 0
        {
            return Err(RenderError::AllTilesUnavailable {
                tiles: report.tiles_requested,
            });
        }

        info!(
            provider = provider.id(),
            zoom = report.zoom,
            available = report.tiles_available,
            unavailable = report.tiles_unavailable,
            skipped = report.tiles_skipped,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Render complete"
        );

        Ok((canvas, report))
    }

    /// Fetches every tile, at most `concurrency` at a time.
    ///
    /// Also returns how many tile tasks died without a result.
    ///
    /// On cancellation the spawned tasks are detached: the ones already
    /// fetching finish and fill the cache, the ones still queued for a
    /// permit exit without fetching.
    async fn resolve_all(
        &self,
        tiles: &[PlacedTile],
        provider: &Arc<dyn TileProvider>,
        cancel: &CancellationToken,
    ) -> Result<(Vec<(PlacedTile, TileImage)>, usize), RenderError> {
        let semaphore = Arc::new(Semaphore::new(self.fetcher.config().concurrency.max(1)));
        let mut join_set = JoinSet::new();

        for placed in tiles.iter().copied() {
            let fetcher = Arc::clone(&self.fetcher);
            let provider = Arc::clone(provider);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();

            join_set.spawn(async move {
                let _permit = tokio::select! {
                    _ = cancel.cancelled() => return None,
                    permit = semaphore.acquire_owned() => permit.ok()?,
                };
                let tile = fetcher.resolve(&placed.coordinate, &provider).await;
                Some((placed, tile))
            });
        }

        let mut resolved = Vec::with_capacity(tiles.len());
        let mut failed = 0;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(pending = join_set.len(), "Render cancelled");
                    join_set.detach_all();
                    return Err(RenderError::Cancelled);
                }
                next = join_set.join_next() => match next {
                    None => break,
                    Some(Ok(Some(result))) => resolved.push(result),
                    Some(Ok(None)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "Tile task failed");
                        failed += 1;
                    }
                },
            }
        }

        Ok((resolved, failed))
    }
}
