//! Per-conversion log sink
//!
//! Every conversion carries a [`ConversionLog`]. Entries are forwarded to the
//! `log` facade as they are recorded and kept in order so callers can inspect
//! what was skipped or degraded. Nothing here influences control flow.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
}

/// Ordered record of advisory messages produced during one conversion.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionLog {
    entries: Vec<LogEntry>,
}

impl ConversionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Debug => log::debug!("{message}"),
            Severity::Info => log::info!("{message}"),
            Severity::Warning => log::warn!("{message}"),
            Severity::Error => log::error!("{message}"),
        }
        self.entries.push(LogEntry { severity, message });
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.record(Severity::Debug, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(Severity::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.record(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record(Severity::Error, message);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when any entry at `severity` or above mentions `needle`.
    pub fn contains(&self, severity: Severity, needle: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.severity >= severity && e.message.contains(needle))
    }

    /// Move all entries of `other` to the end of this log without re-emitting them.
    pub fn absorb(&mut self, other: ConversionLog) {
        self.entries.extend(other.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_entries_in_order() {
        let mut log = ConversionLog::new();
        log.info("first");
        log.warn("second");
        let messages: Vec<_> = log.entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn contains_respects_severity_floor() {
        let mut log = ConversionLog::new();
        log.debug("unknown node: Sdt");
        assert!(log.contains(Severity::Debug, "Sdt"));
        assert!(!log.contains(Severity::Warning, "Sdt"));
    }
}
