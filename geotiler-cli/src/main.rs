//! geotiler CLI - render map images from the command line
//!
//! ```text
//! geotiler render --bbox -0.5,51.3,0.3,51.7 --size 800x600 --output london.png
//! ```

mod error;
mod render;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use error::CliError;
use render::{parse_bbox, parse_size, BoundingBox};

#[derive(Parser)]
#[command(name = "geotiler")]
#[command(version = geotiler::VERSION)]
#[command(about = "Render map images for a bounding box from slippy map tiles", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a bounding box to an image file
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Bounding box as WEST,SOUTH,EAST,NORTH in degrees
    #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
    bbox: BoundingBox,

    /// Output size as WIDTHxHEIGHT pixels
    #[arg(long, value_parser = parse_size)]
    size: (u32, u32),

    /// Output file; format from the extension
    #[arg(short, long)]
    output: PathBuf,

    /// Tile provider: osm, cycle, bluemarble, custom
    #[arg(long)]
    provider: Option<String>,

    /// URL template for --provider custom, e.g. https://host/{z}/{x}/{y}.png
    #[arg(long)]
    url: Option<String>,

    /// Config file (default ~/.geotiler/config.ini)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tiles fetched concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// Retries per tile URL after the first attempt
    #[arg(long)]
    retries: Option<u32>,

    /// Background colour for missing tiles, #rrggbb or #rrggbbaa
    #[arg(long)]
    background: Option<String>,

    /// Fail instead of writing a blank image when no tile could be fetched
    #[arg(long)]
    fail_when_empty: bool,
}

fn main() {
    let cli = Cli::parse();

    let _logging = match geotiler::logging::init_logging(cli.verbose, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => CliError::LoggingInit(e).exit(),
    };

    let result = match cli.command {
        Commands::Render(args) => render::run(args.into()),
    };

    if let Err(e) = result {
        e.exit();
    }
}

impl From<RenderArgs> for render::RenderOptions {
    fn from(args: RenderArgs) -> Self {
        Self {
            bbox: args.bbox,
            width: args.size.0,
            height: args.size.1,
            output: args.output,
            provider: args.provider,
            url: args.url,
            config: args.config,
            concurrency: args.concurrency,
            retries: args.retries,
            background: args.background,
            fail_when_empty: args.fail_when_empty,
        }
    }
}
