//! Error-tolerance gate: settles a collected report as pass or fail.

use serde::{Deserialize, Serialize};

use crate::report::{Outcome, RunReport};

/// Default number of errored checks a run tolerates before failing.
pub const DEFAULT_ERROR_TOLERANCE: usize = 2;

/// Gate evaluation verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunVerdict {
    /// Whether the gate passed.
    pub passed: bool,

    /// Violations that caused failure (empty if passed).
    pub violations: Vec<String>,

    /// Summary message.
    pub message: String,
}

/// Settlement rules for a collected run report.
///
/// Any failed check fails the run. Errored checks are tolerated up to the
/// configured tolerance: strictly more than `tolerance` errors fails.
#[derive(Debug, Clone)]
pub struct ErrorGate {
    tolerance: usize,
}

impl Default for ErrorGate {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_TOLERANCE)
    }
}

impl ErrorGate {
    /// Gate with a custom error tolerance.
    pub fn new(tolerance: usize) -> Self {
        Self { tolerance }
    }

    /// The configured tolerance.
    pub fn tolerance(&self) -> usize {
        self.tolerance
    }

    /// Evaluate a collected report.
    pub fn evaluate(&self, report: &RunReport) -> RunVerdict {
        let mut violations = Vec::new();

        for outcome in &report.failed {
            if let Outcome::Failed {
                url,
                check,
                expected,
                actual,
            } = outcome
            {
                violations.push(format!(
                    "Check '{check}' on {url}: expected {expected}, got {actual}"
                ));
            }
        }

        if report.errors.len() > self.tolerance {
            violations.push(format!(
                "{} checks errored (tolerance is {})",
                report.errors.len(),
                self.tolerance
            ));
        }

        let passed = violations.is_empty();
        let message = if passed {
            format!(
                "{} checks passed across {} URLs",
                report.passed.len(),
                report.urls_tested
            )
        } else {
            format!("Run failed with {} violation(s)", violations.len())
        };

        RunVerdict {
            passed,
            violations,
            message,
        }
    }
}
