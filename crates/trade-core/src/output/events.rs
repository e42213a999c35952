//! Event Log
//!
//! Append-only JSONL log of every event a run records.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use trade_events::{TickReport, TradeEvent};

/// Writes tick events to a JSONL file, one event per line
pub struct EventLog {
    writer: Option<BufWriter<File>>,
    event_count: u64,
}

impl EventLog {
    /// Create a log writing to `path`, truncating any existing file
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            event_count: 0,
        })
    }

    /// A log that counts events but writes nothing
    pub fn null() -> Self {
        Self {
            writer: None,
            event_count: 0,
        }
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn log(&mut self, event: &TradeEvent) -> std::io::Result<()> {
        self.event_count += 1;
        if let Some(ref mut writer) = self.writer {
            writeln!(writer, "{}", event.to_jsonl()?)?;
        }
        Ok(())
    }

    /// Log every event of a tick
    pub fn log_report(&mut self, report: &TickReport) -> std::io::Result<()> {
        for event in &report.events {
            self.log(event)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for EventLog {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, "failed to flush event log");
        }
    }
}

/// Read back a log written by [`EventLog`]. Blank lines are skipped.
pub fn read_events(path: impl AsRef<Path>) -> std::io::Result<Vec<TradeEvent>> {
    let reader = BufReader::new(File::open(path)?);
    let mut events = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        events.push(TradeEvent::from_jsonl(&line)?);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trade_events::TradeEventKind;

    fn report() -> TickReport {
        let mut report = TickReport::new(1);
        report.record(
            TradeEvent::new(1, TradeEventKind::TradeCompleted, 0)
                .with_counterpart(1)
                .with_resource("A", 1.0),
        );
        report.record(TradeEvent::new(1, TradeEventKind::AgentDied, 2));
        report
    }

    #[test]
    fn test_log_writes_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        let mut log = EventLog::new(&path).unwrap();
        log.log_report(&report()).unwrap();
        log.flush().unwrap();

        assert_eq!(log.event_count(), 2);
        let events = read_events(&path).unwrap();
        assert_eq!(events, report().events);
    }

    #[test]
    fn test_null_log_only_counts() {
        let mut log = EventLog::null();
        log.log_report(&report()).unwrap();
        assert_eq!(log.event_count(), 2);
    }

    #[test]
    fn test_malformed_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        std::fs::write(&path, "{\"tick\":1}\nnot json\n").unwrap();

        assert!(read_events(&path).is_err());
    }
}
