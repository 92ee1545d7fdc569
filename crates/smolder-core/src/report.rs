//! Classified outcomes and the aggregated run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::CheckVerdict;
use crate::spec::CheckSpec;

/// Classified result of one check execution.
///
/// Every eligible spec produces exactly one outcome in exactly one bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The evaluator's comparison held.
    Passed {
        url: String,
        check: String,
        expected: String,
        actual: String,
    },

    /// The evaluator's comparison did not hold.
    Failed {
        url: String,
        check: String,
        expected: String,
        actual: String,
    },

    /// The evaluator (or navigation) raised a fault instead of comparing.
    Errored {
        url: String,
        check: String,
        fault: String,
    },
}

impl Outcome {
    /// Classify an evaluator verdict.
    pub fn from_verdict(spec: &CheckSpec, verdict: CheckVerdict) -> Self {
        if verdict.result {
            Outcome::Passed {
                url: spec.url.to_string(),
                check: spec.check_type.clone(),
                expected: verdict.expected,
                actual: verdict.actual,
            }
        } else {
            Outcome::Failed {
                url: spec.url.to_string(),
                check: spec.check_type.clone(),
                expected: verdict.expected,
                actual: verdict.actual,
            }
        }
    }

    /// An errored outcome carrying the fault description.
    pub fn errored(spec: &CheckSpec, fault: impl Into<String>) -> Self {
        Outcome::Errored {
            url: spec.url.to_string(),
            check: spec.check_type.clone(),
            fault: fault.into(),
        }
    }

    /// URL this outcome was evaluated against.
    pub fn url(&self) -> &str {
        match self {
            Outcome::Passed { url, .. }
            | Outcome::Failed { url, .. }
            | Outcome::Errored { url, .. } => url,
        }
    }

    /// Check type that produced this outcome.
    pub fn check(&self) -> &str {
        match self {
            Outcome::Passed { check, .. }
            | Outcome::Failed { check, .. }
            | Outcome::Errored { check, .. } => check,
        }
    }
}

/// Aggregated result of one smoke run.
///
/// Buckets are append-only while the run collects outcomes and frozen once
/// the run settles. The same shape is carried on both the success and the
/// failure arm of the settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique id for this run.
    pub run_id: String,

    /// When the run started collecting.
    pub started_at: DateTime<Utc>,

    /// Checks whose comparison held.
    pub passed: Vec<Outcome>,

    /// Checks whose comparison did not hold.
    pub failed: Vec<Outcome>,

    /// Checks that raised a fault.
    pub errors: Vec<Outcome>,

    /// Distinct URLs that had at least one eligible check.
    pub urls_tested: usize,

    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl RunReport {
    /// A fresh, empty report for a run about to collect outcomes.
    pub fn new(run_id: impl Into<String>, urls_tested: usize) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Utc::now(),
            passed: Vec::new(),
            failed: Vec::new(),
            errors: Vec::new(),
            urls_tested,
            duration_ms: 0,
        }
    }

    /// Append one outcome to its bucket.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Passed { .. } => self.passed.push(outcome),
            Outcome::Failed { .. } => self.failed.push(outcome),
            Outcome::Errored { .. } => self.errors.push(outcome),
        }
    }

    /// Total outcomes across all buckets.
    pub fn total(&self) -> usize {
        self.passed.len() + self.failed.len() + self.errors.len()
    }
}

/// Terminal settlement of a run: success or failure, same report shape on
/// both arms.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// No failed checks and errors within tolerance.
    Success(RunReport),

    /// At least one failed check, or errors beyond tolerance.
    Failure(RunReport),
}

impl RunOutcome {
    /// Whether the run settled as a success.
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success(_))
    }

    /// The report, regardless of settlement arm.
    pub fn report(&self) -> &RunReport {
        match self {
            RunOutcome::Success(report) | RunOutcome::Failure(report) => report,
        }
    }

    /// Resolve-with-data / reject-with-data duality: `Ok` carries the report
    /// on success, `Err` carries the identical shape on failure.
    pub fn into_result(self) -> std::result::Result<RunReport, RunReport> {
        match self {
            RunOutcome::Success(report) => Ok(report),
            RunOutcome::Failure(report) => Err(report),
        }
    }
}
