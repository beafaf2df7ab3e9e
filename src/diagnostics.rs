use std::fmt;

use tracing::debug;

use crate::error::{NormalizeError, ReadError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Record lacking a preamble, answer, or page; skipped or passed through.
    MalformedRecord,
    /// Title/author pair not in the catalog; record dropped.
    UnresolvedBook,
    /// Input file absent.
    MissingInput,
    /// Input file unreadable or structurally invalid.
    InvalidInput,
}

impl DiagnosticKind {
    pub const ALL: [DiagnosticKind; 4] = [
        DiagnosticKind::MalformedRecord,
        DiagnosticKind::UnresolvedBook,
        DiagnosticKind::MissingInput,
        DiagnosticKind::InvalidInput,
    ];

    fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::MalformedRecord => "malformed",
            DiagnosticKind::UnresolvedBook => "unresolved",
            DiagnosticKind::MissingInput => "missing",
            DiagnosticKind::InvalidInput => "invalid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// File name, optionally with a line number.
    pub origin: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.label(), self.origin, self.message)
    }
}

/// Collects recoverable problems found during a run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, origin: impl Into<String>, message: impl Into<String>) {
        let d = Diagnostic {
            kind,
            origin: origin.into(),
            message: message.into(),
        };
        debug!(kind = d.kind.label(), origin = %d.origin, "{}", d.message);
        self.items.push(d);
    }

    pub fn malformed(&mut self, origin: impl Into<String>, message: impl Into<String>) {
        self.push(DiagnosticKind::MalformedRecord, origin, message);
    }

    pub fn unresolved(&mut self, origin: impl Into<String>, title_author: &str) {
        self.push(
            DiagnosticKind::UnresolvedBook,
            origin,
            format!("No book key, skipping: {}", title_author),
        );
    }

    pub fn normalize_issue(&mut self, origin: impl Into<String>, issue: &NormalizeError) {
        self.push(DiagnosticKind::MalformedRecord, origin, issue.to_string());
    }

    pub fn read_failure(&mut self, err: &ReadError) {
        let kind = if err.is_missing() {
            DiagnosticKind::MissingInput
        } else {
            DiagnosticKind::InvalidInput
        };
        self.push(kind, "-", err.to_string());
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// "2 unresolved, 1 missing", skipping kinds with no entries.
    pub fn summary(&self) -> String {
        DiagnosticKind::ALL
            .iter()
            .map(|k| (k, self.count(*k)))
            .filter(|(_, n)| *n > 0)
            .map(|(k, n)| format!("{} {}", n, k.label()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Print every diagnostic as one line on stdout.
    pub fn print(&self) {
        if self.items.is_empty() {
            return;
        }
        println!("\n{} diagnostics ({}):", self.len(), self.summary());
        for d in &self.items {
            println!("  {}", d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_message_names_the_book() {
        let mut diags = Diagnostics::new();
        diags.unresolved("questions.txt:4", "Unknown Book by Nobody");
        let d = diags.iter().next().unwrap();
        assert_eq!(d.kind, DiagnosticKind::UnresolvedBook);
        assert!(d.message.contains("Unknown Book by Nobody"));
        assert_eq!(
            d.to_string(),
            "[unresolved] questions.txt:4: No book key, skipping: Unknown Book by Nobody"
        );
    }

    #[test]
    fn read_failures_split_missing_from_invalid() {
        let mut diags = Diagnostics::new();
        diags.read_failure(&ReadError::NotFound { path: "a.csv".into() });
        diags.read_failure(&ReadError::MissingColumn {
            path: "b.csv".into(),
            column: "Question".into(),
        });
        assert_eq!(diags.count(DiagnosticKind::MissingInput), 1);
        assert_eq!(diags.count(DiagnosticKind::InvalidInput), 1);
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.summary(), "1 missing, 1 invalid");
    }
}
