//! Non-fatal diagnostics accumulated during one hook invocation.
//!
//! Hooks must never block the host turn, so failures that are recovered
//! locally (a degraded secondary query, a skipped transcript line, a slow
//! oracle) are collected here and surfaced alongside the best-effort output.

use std::fmt;

use serde::Serialize;

/// Where a diagnostic came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    Transcript,
    PrimaryQuery,
    SecondaryQuery,
    Reconciliation,
    Performance,
    Fatal,
}

impl DiagnosticKind {
    fn prefix(&self) -> &'static str {
        match self {
            DiagnosticKind::Transcript => "Transcript parsing error",
            DiagnosticKind::PrimaryQuery => "Knowledge graph query error",
            DiagnosticKind::SecondaryQuery => "Agent context query error",
            DiagnosticKind::Reconciliation => "Deduplication error",
            DiagnosticKind::Performance => "Performance warning",
            DiagnosticKind::Fatal => "Fatal hook error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.prefix(), self.message)
    }
}

/// An ordered list of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            kind,
            message: message.into(),
        });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.entries.iter().any(|d| d.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display_has_prefix() {
        let mut diags = Diagnostics::new();
        diags.push(DiagnosticKind::SecondaryQuery, "connection refused");
        let line = diags.iter().next().unwrap().to_string();
        assert_eq!(line, "Agent context query error: connection refused");
        assert!(diags.has(DiagnosticKind::SecondaryQuery));
        assert!(!diags.has(DiagnosticKind::Fatal));
    }

    #[test]
    fn extend_preserves_order() {
        let mut a = Diagnostics::new();
        a.push(DiagnosticKind::Transcript, "one");
        let mut b = Diagnostics::new();
        b.push(DiagnosticKind::Performance, "two");
        a.extend(b);
        let kinds: Vec<_> = a.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DiagnosticKind::Transcript, DiagnosticKind::Performance]);
    }
}
