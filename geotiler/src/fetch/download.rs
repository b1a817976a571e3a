//! Per-tile download with retry, timeout, and decode.

use std::time::Instant;

use image::RgbaImage;
use tracing::{debug, trace, warn};

use crate::config::FetchConfig;
use crate::provider::{AsyncHttpClient, ProviderError};
use crate::telemetry::FetchMetrics;

/// Tries every candidate URL in order until one yields a decodable image.
///
/// Each URL gets `max_attempts` attempts. Non-retryable errors (4xx,
/// undecodable body) skip straight to the next URL.
///
/// Returns the last error when every URL fails.
pub(super) async fn download_tile<C: AsyncHttpClient>(
    client: &C,
    urls: &[String],
    config: &FetchConfig,
    metrics: &FetchMetrics,
) -> Result<RgbaImage, ProviderError> {
    let mut last_error = ProviderError::InvalidTemplate("provider returned no URLs".to_string());

    for url in urls {
        match download_url(client, url, config, metrics).await {
            Ok(image) => return Ok(image),
            Err(e) => {
                debug!(url = %url, error = %e, "Tile URL exhausted, trying next");
                last_error = e;
            }
        }
    }

    Err(last_error)
}

async fn download_url<C: AsyncHttpClient>(
    client: &C,
    url: &str,
    config: &FetchConfig,
    metrics: &FetchMetrics,
) -> Result<RgbaImage, ProviderError> {
    let max_attempts = config.max_attempts.max(1);
    let mut last_error = ProviderError::HttpError("no attempt made".to_string());

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            let backoff = config.backoff_for(attempt);
            trace!(url = url, backoff_ms = backoff.as_millis() as u64, "Backoff before retry");
            metrics.retry();
            tokio::time::sleep(backoff).await;
        }

        debug!(url = url, attempt = attempt, "HTTP download attempt");
        metrics.network_request();
        let start = Instant::now();

        let result = match tokio::time::timeout(config.request_timeout, client.get(url)).await {
            Ok(Ok(bytes)) => {
                metrics.download_time(start.elapsed().as_micros() as u64);
                metrics.bytes_downloaded(bytes.len() as u64);
                decode(url, bytes).await
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProviderError::Timeout {
                url: url.to_string(),
                timeout_ms: config.request_timeout.as_millis() as u64,
            }),
        };

        match result {
            Ok(image) => {
                trace!(
                    url = url,
                    attempt = attempt,
                    width = image.width(),
                    height = image.height(),
                    "Tile download success"
                );
                return Ok(image);
            }
            Err(e) => {
                warn!(
                    url = url,
                    attempt = attempt,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Tile download error"
                );
                let retryable = e.is_retryable();
                last_error = e;
                if !retryable {
                    break;
                }
            }
        }
    }

    Err(last_error)
}

/// Decodes a response body on the blocking pool.
async fn decode(url: &str, bytes: Vec<u8>) -> Result<RgbaImage, ProviderError> {
    if bytes.is_empty() {
        return Err(ProviderError::EmptyResponse(url.to_string()));
    }

    let decoded = tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes).map(|image| image.to_rgba8())
    })
    .await
    .map_err(|e| ProviderError::InvalidResponse(format!("decode task failed: {}", e)))?;

    decoded.map_err(|e| ProviderError::InvalidResponse(format!("{}: {}", url, e)))
}
