use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use dirwatch_core::{Config, EventFormat};
use dirwatch_daemon::{signal, Daemon, EventSink, JsonSink, LogSink, RunSummary};

const RULE: &str = "-------------------------------------------------------------------";

pub async fn run(config: Config, once: bool) -> Result<()> {
    let watch = config.watch.clone();
    let directory =
        std::fs::canonicalize(&watch.directory).unwrap_or_else(|_| watch.directory.clone());

    tracing::info!(
        "Watching directory: {}, extension: {}, magic text: {:?}, polling every {} seconds",
        directory.display(),
        watch.extension,
        watch.magic,
        watch.interval_secs
    );

    let mut daemon = Daemon::new(watch).context("Cannot start watching")?;

    let mut sink: Box<dyn EventSink> = match config.output.format {
        EventFormat::Log => Box::new(LogSink::new(config.watch.magic.clone())),
        EventFormat::Json => Box::new(JsonSink::new(std::io::stdout(), config.watch.magic.clone())),
    };

    if once {
        for event in daemon.run_once() {
            sink.emit(&event).context("Failed to report event")?;
        }
        return Ok(());
    }

    tracing::info!(
        "\n{RULE}\n    dirwatch started at {}\n{RULE}",
        chrono::Local::now().to_rfc3339()
    );

    let shutdown = CancellationToken::new();
    let listener = signal::spawn_listener(shutdown.clone());

    let summary = daemon.run(shutdown.clone(), sink.as_mut()).await;

    shutdown.cancel();
    if let Err(e) = listener.await {
        tracing::debug!("Signal listener ended abnormally: {}", e);
    }

    log_summary(&summary);
    Ok(())
}

fn log_summary(summary: &RunSummary) {
    tracing::info!(
        "\n{RULE}\n    dirwatch ended at {} (started {}), uptime {:.1}s\n    {}\n{RULE}",
        chrono::Local::now().to_rfc3339(),
        summary.started_at.to_rfc3339(),
        summary.uptime.as_secs_f64(),
        totals(summary)
    );
}

fn totals(summary: &RunSummary) -> String {
    format!(
        "{} ticks, {} matches, {} errors, {} panics",
        summary.ticks,
        summary.matches,
        summary.errors,
        summary.panics
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_totals() {
        let summary = RunSummary {
            started_at: chrono::Local::now(),
            uptime: Duration::from_secs(9),
            ticks: 3,
            matches: 2,
            errors: 1,
            panics: 0,
        };
        assert_eq!(totals(&summary), "3 ticks, 2 matches, 1 errors, 0 panics");
    }
}
