//! The `render` command.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use geotiler::compositor::{Compositor, RenderRequest};
use geotiler::config::{parse_color, ConfigFile, FetchConfig, RenderConfig};
use geotiler::fetch::TileFetcher;
use geotiler::provider::{AsyncReqwestClient, ProviderConfig};

use crate::error::CliError;

/// Bounding box in degrees, as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// Parsed `render` arguments.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub bbox: BoundingBox,
    pub width: u32,
    pub height: u32,
    pub output: PathBuf,
    pub provider: Option<String>,
    pub url: Option<String>,
    pub config: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub retries: Option<u32>,
    pub background: Option<String>,
    pub fail_when_empty: bool,
}

/// Parses `WEST,SOUTH,EAST,NORTH`.
pub fn parse_bbox(value: &str) -> Result<BoundingBox, String> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("'{}' is not a number list: {}", value, e))?;

    let [west, south, east, north] = parts[..] else {
        return Err(format!(
            "expected WEST,SOUTH,EAST,NORTH, got {} values",
            parts.len()
        ));
    };
    if south >= north {
        return Err(format!("south ({}) must be less than north ({})", south, north));
    }

    Ok(BoundingBox {
        west,
        south,
        east,
        north,
    })
}

/// Parses `WIDTHxHEIGHT`.
pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .to_lowercase()
        .split_once('x')
        .map(|(w, h)| (w.trim().parse::<u32>(), h.trim().parse::<u32>()))
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;

    match (width, height) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(format!(
            "'{}' must be two positive integers like 800x600",
            value
        )),
    }
}

/// Settings after layering command-line overrides on the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub provider: ProviderConfig,
    pub fetch: FetchConfig,
    pub render: RenderConfig,
}

/// Applies command-line overrides to a loaded config file.
pub fn resolve_settings(options: &RenderOptions, file: ConfigFile) -> Result<Settings, CliError> {
    let provider = match (options.provider.as_deref(), options.url.as_deref()) {
        (Some("custom"), Some(url)) | (None, Some(url)) => ProviderConfig::custom(url),
        (Some("custom"), None) => {
            return Err(CliError::InvalidArgument(
                "--provider custom requires --url".to_string(),
            ))
        }
        (Some(name), _) => name.parse::<ProviderConfig>()?,
        (None, None) => file.provider,
    };

    let mut fetch = file.fetch;
    if let Some(concurrency) = options.concurrency {
        fetch = fetch.with_concurrency(concurrency);
    }
    if let Some(retries) = options.retries {
        fetch = fetch.with_max_attempts(retries.saturating_add(1));
    }

    let mut render = file.render;
    if let Some(background) = &options.background {
        let color = parse_color(background).ok_or_else(|| {
            CliError::InvalidArgument(format!(
                "--background '{}' must be #rrggbb or #rrggbbaa",
                background
            ))
        })?;
        render = render.with_background(color);
    }
    if options.fail_when_empty {
        render = render.with_fail_when_all_unavailable(true);
    }

    Ok(Settings {
        provider,
        fetch,
        render,
    })
}

/// Runs the `render` command to completion.
pub fn run(options: RenderOptions) -> Result<(), CliError> {
    let file = match &options.config {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    let settings = resolve_settings(&options, file)?;

    let bbox = options.bbox;
    let request = RenderRequest::from_bounds(
        bbox.west,
        bbox.south,
        bbox.east,
        bbox.north,
        options.width,
        options.height,
    )?;
    let provider = settings.provider.create()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let _runtime_guard = runtime.enter();

    let client = AsyncReqwestClient::with_timeout(settings.fetch.request_timeout)?;
    let fetcher = Arc::new(TileFetcher::new(client, settings.fetch));
    let compositor = Compositor::new(Arc::clone(&fetcher), settings.render);

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        warn!(error = %e, "Could not install Ctrl-C handler");
    }

    info!(provider = %settings.provider, output = %options.output.display(), "Rendering");
    let (image, report) =
        runtime.block_on(compositor.render_with_report(&request, provider, &cancel))?;

    image
        .save(&options.output)
        .map_err(|error| CliError::FileWrite {
            path: options.output.clone(),
            error,
        })?;

    eprintln!("{}", report);
    eprintln!("{}", fetcher.metrics().snapshot());
    eprintln!("Wrote {}", options.output.display());
    Ok(())
}
