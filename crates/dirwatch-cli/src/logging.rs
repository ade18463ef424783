//! Logging setup for the dirwatch binary.
//!
//! `RUST_LOG` wins over everything else, then `DIRWATCH_DEBUG` or
//! `--verbose`, then the `[logging]` level from the config file.

use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::EnvFilter;

/// Compact time format: HH:MM:SS.mmm
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

pub fn init(config_level: &str, verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose || std::env::var("DIRWATCH_DEBUG").is_ok() {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(config_level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(CompactTime)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
