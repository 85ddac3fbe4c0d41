use serde::Serialize;
use std::fmt;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Severe,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Severe => "severe",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Rule or phase that emitted the message.
    pub rule: String,
    pub message: String,
}

/// Collected transformation messages. Every entry is also emitted as a
/// `tracing` event at the matching level.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, rule: &str, message: impl Into<String>) {
        self.push(Severity::Info, rule, message.into());
    }

    pub fn warning(&mut self, rule: &str, message: impl Into<String>) {
        self.push(Severity::Warning, rule, message.into());
    }

    pub fn severe(&mut self, rule: &str, message: impl Into<String>) {
        self.push(Severity::Severe, rule, message.into());
    }

    pub fn report(&mut self, severity: Severity, rule: &str, message: impl Into<String>) {
        self.push(severity, rule, message.into());
    }

    fn push(&mut self, severity: Severity, rule: &str, message: String) {
        match severity {
            Severity::Info => info!(rule, "{}", message),
            Severity::Warning => warn!(rule, "{}", message),
            Severity::Severe => error!(rule, "{}", message),
        }
        self.entries.push(Diagnostic {
            severity,
            rule: rule.to_string(),
            message,
        });
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_severity() {
        let mut d = Diagnostics::new();
        d.info("driver", "starting");
        d.warning("port", "no interface");
        d.severe("runnable", "no port");
        d.severe("runnable", "no port again");

        assert_eq!(d.count(Severity::Info), 1);
        assert_eq!(d.count(Severity::Warning), 1);
        assert_eq!(d.count(Severity::Severe), 2);
        assert_eq!(d.entries()[1].rule, "port");
    }
}
