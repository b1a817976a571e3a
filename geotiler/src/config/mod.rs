//! Configuration
//!
//! Runtime settings for fetching ([`FetchConfig`]) and rendering
//! ([`RenderConfig`]), plus the optional `~/.geotiler/config.ini` file
//! that populates them.
//!
//! ```ini
//! [provider]
//! type = osm
//!
//! [fetch]
//! max_attempts = 3
//! backoff_ms = 100
//! timeout_secs = 30
//! concurrency = 8
//! cache_capacity = 4096
//!
//! [render]
//! background = #ffffff00
//! min_zoom = 0
//! max_zoom = 19
//! fail_when_all_unavailable = false
//! ```

mod file;
mod parser;
mod settings;

pub use file::{config_directory, config_file_path, ConfigFile, ConfigFileError};
pub use parser::parse_color;
pub use settings::{
    FetchConfig, RenderConfig, DEFAULT_BACKOFF_BASE_MS, DEFAULT_CONCURRENCY,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT_SECS,
};
