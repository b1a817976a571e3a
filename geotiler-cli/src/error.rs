//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use geotiler::compositor::RenderError;
use geotiler::config::ConfigFileError;
use geotiler::provider::ProviderError;

/// Exit code used when the user interrupts a render.
const EXIT_INTERRUPTED: i32 = 130;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// Invalid command-line argument
    InvalidArgument(String),
    /// Configuration file error
    Config(ConfigFileError),
    /// Failed to create provider or HTTP client
    Provider(ProviderError),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Render failed
    Render(RenderError),
    /// Failed to write output file
    FileWrite {
        path: PathBuf,
        error: image::ImageError,
    },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Render(RenderError::Cancelled) => process::exit(EXIT_INTERRUPTED),
            CliError::Provider(ProviderError::InvalidTemplate(_)) => {
                eprintln!();
                eprintln!("Custom templates need {{z}}, {{x}} and {{y}} placeholders, e.g.");
                eprintln!("  --provider custom --url 'https://tiles.example.com/{{z}}/{{x}}/{{y}}.png'");
            }
            CliError::FileWrite { .. } => {
                eprintln!();
                eprintln!("The output format is taken from the file extension (.png, .jpg, ...).");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Provider(e) => write!(f, "Provider error: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Render(e) => write!(f, "Render failed: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) | CliError::Runtime(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::Provider(e) => Some(e),
            CliError::Render(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::InvalidArgument(_) => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Provider(e)
    }
}

impl From<RenderError> for CliError {
    fn from(e: RenderError) -> Self {
        CliError::Render(e)
    }
}
