//! Destinations for scan events

use std::io::Write;

use dirwatch_core::ScanEvent;

/// Receives every event produced by a tick, in order
pub trait EventSink {
    fn emit(&mut self, event: &ScanEvent) -> std::io::Result<()>;
}

/// Reports events through `tracing`
pub struct LogSink {
    magic: String,
}

impl LogSink {
    pub fn new(magic: impl Into<String>) -> Self {
        Self {
            magic: magic.into(),
        }
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &ScanEvent) -> std::io::Result<()> {
        let message = event.format_text(&self.magic);
        if event.is_error() {
            tracing::warn!("{}", message);
        } else {
            tracing::info!("{}", message);
        }
        Ok(())
    }
}

/// Writes one JSON object per event, and logs it as well
pub struct JsonSink<W: Write> {
    writer: W,
    log: LogSink,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W, magic: impl Into<String>) -> Self {
        Self {
            writer,
            log: LogSink::new(magic),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonSink<W> {
    fn emit(&mut self, event: &ScanEvent) -> std::io::Result<()> {
        self.log.emit(event)?;
        writeln!(self.writer, "{}", event.format_json())?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirwatch_core::ErrorScope;
    use std::path::PathBuf;

    #[test]
    fn test_json_sink_writes_lines() {
        let mut sink = JsonSink::new(Vec::new(), "MAGIC");
        sink.emit(&ScanEvent::FileAppeared {
            name: "a.txt".to_string(),
        })
        .unwrap();
        sink.emit(&ScanEvent::ScanError {
            path: PathBuf::from("/tmp/a.txt"),
            scope: ErrorScope::File,
            cause: "gone".to_string(),
        })
        .unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "file_appeared");
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["scope"], "file");
        assert_eq!(second["cause"], "gone");
    }

    #[test]
    fn test_log_sink_never_fails() {
        let mut sink = LogSink::new("MAGIC");
        assert!(sink
            .emit(&ScanEvent::MatchFound {
                name: "a.txt".to_string(),
                line: 1,
            })
            .is_ok());
    }
}
