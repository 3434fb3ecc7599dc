//! Per-test collection of assertion outcomes

use crate::error::SendError;
use crate::predicates::Outcome;
use std::fmt::Write;

/// One recorded check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub label: String,
    pub outcome: Outcome,
}

/// Collects every check of one generated test and fails it once at the end
#[derive(Debug, Clone)]
pub struct Report {
    name: String,
    entries: Vec<Entry>,
}

impl Report {
    /// Create a report for the named test
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Record the outcome of one assertion
    pub fn check(&mut self, label: &str, outcome: Outcome) {
        tracing::debug!("{}: {} -> {}", self.name, label, outcome);
        self.entries.push(Entry {
            label: label.to_string(),
            outcome,
        });
    }

    /// Record a send error that no assertion expected
    pub fn expect_no_send_error(&mut self, err: Option<&SendError>) {
        let outcome = match err {
            Some(err) => Outcome::mismatch("no error", err.to_string()),
            None => Outcome::Pass,
        };
        self.check("send", outcome);
    }

    /// Entries that did not pass
    pub fn failures(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| !e.outcome.is_pass())
    }

    /// Whether every entry passed
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Render the failure summary, `None` when everything passed
    pub fn summary(&self) -> Option<String> {
        if self.is_success() {
            return None;
        }
        let mut out = format!("{} failed:", self.name);
        for entry in self.failures() {
            let kind = match entry.outcome {
                Outcome::Malformed(_) => "malformed",
                _ => "failed",
            };
            let _ = write!(out, "\n  expected {} {}: {}", entry.label, kind, entry.outcome);
        }
        Some(out)
    }

    /// Fail the current test if any entry did not pass
    pub fn finish(self) {
        if let Some(summary) = self.summary() {
            panic!("{summary}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_failure_is_listed() {
        let mut report = Report::new("behavior_000");
        report.check("requestUrlMatches", Outcome::mismatch("a", "b"));
        report.check("requestMethodEquals", Outcome::Pass);
        report.check("requestBodyEqualsBytes", Outcome::Malformed("invalid base64".into()));

        let summary = report.summary().unwrap();
        assert!(summary.contains("expected requestUrlMatches failed"));
        assert!(summary.contains("expected requestBodyEqualsBytes malformed"));
        assert!(!summary.contains("requestMethodEquals"));
        assert_eq!(report.failures().count(), 2);
    }

    #[test]
    fn test_success_finishes_quietly() {
        let mut report = Report::new("behavior_001");
        report.check("requestIdEquals", Outcome::Pass);
        report.expect_no_send_error(None);
        assert!(report.is_success());
        report.finish();
    }

    #[test]
    #[should_panic(expected = "expected send failed")]
    fn test_unexpected_send_error_fails() {
        let mut report = Report::new("behavior_002");
        report.expect_no_send_error(Some(&SendError::Transport("down".into())));
        report.finish();
    }
}
