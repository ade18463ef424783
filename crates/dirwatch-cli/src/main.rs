use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use dirwatch_core::{Config, EventFormat};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "dirwatch")]
#[command(about = "Watch a directory for files containing a magic text", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory to watch (default: from config, else current directory)
    pub dir: Option<PathBuf>,

    /// Text to search for (default: from config)
    pub magic: Option<String>,

    /// File extension to watch, including the dot
    #[arg(short, long)]
    pub extension: Option<String>,

    /// Seconds between polls
    #[arg(short, long)]
    pub interval: Option<f64>,

    /// Interval multiplier to wait after the directory could not be read
    #[arg(long)]
    pub backoff: Option<f64>,

    /// Config file (default: .dirwatch.toml, then the user config dir)
    #[arg(short, long, env = "DIRWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Event output format
    #[arg(short, long)]
    pub format: Option<Format>,

    /// Scan once, report, and exit
    #[arg(long)]
    pub once: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Log lines on stderr (default)
    Log,
    /// JSON lines on stdout
    Json,
}

impl Cli {
    /// Command line flags take precedence over the config file
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.dir {
            config.watch.directory = dir.clone();
        }
        if let Some(magic) = &self.magic {
            config.watch.magic = magic.clone();
        }
        if let Some(extension) = &self.extension {
            config.watch.extension = extension.clone();
        }
        if let Some(interval) = self.interval {
            config.watch.interval_secs = interval;
        }
        if let Some(backoff) = self.backoff {
            config.watch.error_backoff = backoff;
        }
        if let Some(format) = self.format {
            config.output.format = match format {
                Format::Log => EventFormat::Log,
                Format::Json => EventFormat::Json,
            };
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load(),
    };
    cli.apply(&mut config);

    logging::init(&config.logging.level, cli.verbose);

    commands::watch::run(config, cli.once).await
}
