//! Run coordination: fan out eligible checks, collect outcomes, settle.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::config;
use crate::error::{Result, SmokeError};
use crate::executor::CheckExecutor;
use crate::gate::ErrorGate;
use crate::policy::HostPolicy;
use crate::registry::{CheckRegistry, Evaluator};
use crate::report::{RunOutcome, RunReport};
use crate::session::PageProvider;
use crate::spec::CheckSpec;

/// Smoke-test engine: the single public entry point for a run.
///
/// Each engine instance owns its own registry, policy, and gate; instances
/// never interfere with one another. `run` is re-entrant — every invocation
/// collects into a fresh report.
pub struct SmokeEngine {
    host: Url,
    specs: Vec<CheckSpec>,
    registry: CheckRegistry,
    executor: CheckExecutor,
    policy: HostPolicy,
    gate: ErrorGate,
}

impl SmokeEngine {
    /// Engine over an already-resolved check list.
    pub fn new(host: Url, specs: Vec<CheckSpec>, provider: Arc<dyn PageProvider>) -> Self {
        Self {
            host,
            specs,
            registry: CheckRegistry::with_builtins(),
            executor: CheckExecutor::new(provider),
            policy: HostPolicy::default(),
            gate: ErrorGate::default(),
        }
    }

    /// Engine over a check-list descriptor file.
    pub fn from_config(host: Url, config_path: &Path, provider: Arc<dyn PageProvider>) -> Result<Self> {
        let specs = config::load_check_file(config_path, &host)?;
        Ok(Self::new(host, specs, provider))
    }

    /// Replace the host policy.
    pub fn with_policy(mut self, policy: HostPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the error-tolerance gate.
    pub fn with_gate(mut self, gate: ErrorGate) -> Self {
        self.gate = gate;
        self
    }

    /// Target host this engine runs against.
    pub fn host(&self) -> &Url {
        &self.host
    }

    /// Register (or override) a check evaluator on this instance.
    pub fn add_check(&mut self, name: impl Into<String>, evaluator: impl Evaluator + 'static) {
        self.registry.register(name, evaluator);
    }

    /// Execute the run: filter by host policy, dispatch every eligible spec
    /// concurrently, fold the outcomes into one report, and settle it
    /// against the gate.
    ///
    /// Setup faults (a spec naming an unregistered check type) abort before
    /// any dispatch. After dispatch, individual faults are recovered into
    /// the report's error bucket; the run only settles as [`RunOutcome::Failure`]
    /// on failed checks or errors beyond tolerance, carrying the same report
    /// shape as the success arm.
    pub async fn run(&self) -> Result<RunOutcome> {
        for spec in &self.specs {
            if !self.registry.contains(&spec.check_type) {
                return Err(SmokeError::UnknownCheckType(spec.check_type.clone()));
            }
        }

        let started = Instant::now();
        let run_id = Uuid::new_v4().to_string();

        let eligible: Vec<&CheckSpec> = self
            .specs
            .iter()
            .filter(|spec| self.policy.is_eligible(spec, &self.host))
            .collect();

        let skipped = self.specs.len() - eligible.len();
        if skipped > 0 {
            info!(
                skipped,
                host = %self.host,
                "Skipping session-dependent checks on local host"
            );
        }

        let urls_tested = eligible
            .iter()
            .map(|spec| spec.url.as_str())
            .collect::<HashSet<_>>()
            .len();

        info!(
            run_id = %run_id,
            host = %self.host,
            checks = eligible.len(),
            urls = urls_tested,
            "Starting smoke run"
        );

        // Fan out every eligible check at once; the single awaiting task is
        // the only writer folding completions into the report, so bucket
        // appends are serialized by construction.
        let outcomes = join_all(
            eligible
                .iter()
                .map(|spec| self.executor.execute(&self.registry, spec)),
        )
        .await;

        let mut report = RunReport::new(run_id.clone(), urls_tested);
        for outcome in outcomes {
            debug!(url = outcome.url(), check = outcome.check(), "Collected outcome");
            report.record(outcome);
        }
        report.duration_ms = started.elapsed().as_millis() as u64;

        let verdict = self.gate.evaluate(&report);
        if verdict.passed {
            info!(
                run_id = %run_id,
                passed = report.passed.len(),
                errors = report.errors.len(),
                duration_ms = report.duration_ms,
                "Smoke run passed"
            );
            Ok(RunOutcome::Success(report))
        } else {
            info!(
                run_id = %run_id,
                passed = report.passed.len(),
                failed = report.failed.len(),
                errors = report.errors.len(),
                duration_ms = report.duration_ms,
                message = %verdict.message,
                "Smoke run failed"
            );
            Ok(RunOutcome::Failure(report))
        }
    }
}
