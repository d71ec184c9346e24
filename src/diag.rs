//! Leveled diagnostic sink consumed by the hierarchy builder.
//!
//! The builder reports anomalies (duplicate certificates, key-identifier
//! mismatches, signature failures, broken cycles) through a [`DiagnosticSink`]
//! and never inspects the sink's behavior: diagnostics carry free-form text
//! and do not influence any result.

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}", label)
    }
}

/// Receiver for diagnostic messages emitted during hierarchy computation.
pub trait DiagnosticSink {
    fn emit(&mut self, severity: Severity, message: &str);

    fn debug(&mut self, message: &str) {
        self.emit(Severity::Debug, message);
    }

    fn info(&mut self, message: &str) {
        self.emit(Severity::Info, message);
    }

    fn warning(&mut self, message: &str) {
        self.emit(Severity::Warning, message);
    }

    fn error(&mut self, message: &str) {
        self.emit(Severity::Error, message);
    }
}

/// Sink that forwards diagnostics to the `log` crate facade at the
/// corresponding level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&mut self, severity: Severity, message: &str) {
        match severity {
            Severity::Debug => log::debug!("{}", message),
            Severity::Info => log::info!("{}", message),
            Severity::Warning => log::warn!("{}", message),
            Severity::Error => log::error!("{}", message),
        }
    }
}

/// Sink that discards all diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _severity: Severity, _message: &str) {}
}

/// Sink that captures diagnostics in memory, primarily for tests and
/// batch reporting.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub entries: Vec<(Severity, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded at exactly the given severity.
    pub fn messages_at(&self, severity: Severity) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(s, _)| *s == severity)
            .map(|(_, m)| m.as_str())
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&mut self, severity: Severity, message: &str) {
        self.entries.push((severity, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_captures_in_order() {
        let mut sink = MemorySink::new();
        sink.info("first");
        sink.warning("second");
        sink.error("third");
        assert_eq!(sink.entries.len(), 3);
        assert_eq!(sink.entries[0], (Severity::Info, "first".to_string()));
        assert_eq!(
            sink.messages_at(Severity::Warning).collect::<Vec<_>>(),
            vec!["second"]
        );
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn null_sink_accepts_everything() {
        let mut sink = NullSink;
        sink.debug("ignored");
        sink.error("ignored");
    }
}
