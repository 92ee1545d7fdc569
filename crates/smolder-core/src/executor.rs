//! Check execution: one spec, one page session, one classified outcome.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::registry::CheckRegistry;
use crate::report::Outcome;
use crate::session::PageProvider;
use crate::spec::CheckSpec;

/// Executes a single check spec against a freshly acquired page session.
///
/// Faults are recovered locally: a navigation failure, an unresolvable
/// check type, or an evaluator error all become an `Errored` outcome rather
/// than propagating, so transient instability counts against the run's
/// error tolerance instead of aborting it. The session is released on every
/// path before the outcome is returned.
pub struct CheckExecutor {
    provider: Arc<dyn PageProvider>,
}

impl CheckExecutor {
    pub fn new(provider: Arc<dyn PageProvider>) -> Self {
        Self { provider }
    }

    /// Execute one spec and classify the result.
    pub async fn execute(&self, registry: &CheckRegistry, spec: &CheckSpec) -> Outcome {
        debug!(url = %spec.url, check = %spec.check_type, "Executing check");

        let session = self.provider.acquire(&spec.url).await;

        let outcome = if let Some(fault) = session.fault() {
            warn!(url = %spec.url, fault, "Navigation failed");
            Outcome::errored(spec, format!("navigation failed: {fault}"))
        } else {
            match registry.resolve(&spec.check_type) {
                Ok(evaluator) => match evaluator.evaluate(&session, spec).await {
                    Ok(verdict) => Outcome::from_verdict(spec, verdict),
                    Err(fault) => {
                        warn!(url = %spec.url, check = %spec.check_type, %fault, "Evaluator fault");
                        Outcome::errored(spec, fault.to_string())
                    }
                },
                Err(fault) => Outcome::errored(spec, fault.to_string()),
            }
        };

        self.provider.release(session).await;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::ScriptedPageProvider;
    use crate::registry::{CheckVerdict, FnEvaluator, STATUS_CHECK};
    use crate::session::PageSession;
    use serde_json::json;
    use url::Url;

    fn spec(path: &str, check_type: &str, params: serde_json::Value) -> CheckSpec {
        let url = Url::parse("http://localhost:3004")
            .and_then(|base| base.join(path))
            .expect("url");
        CheckSpec::new(url, check_type, params)
    }

    #[tokio::test]
    async fn test_passing_check() {
        let provider = Arc::new(ScriptedPageProvider::new().with_page("/", 200, "<html></html>"));
        let executor = CheckExecutor::new(provider);
        let registry = CheckRegistry::with_builtins();

        let outcome = executor
            .execute(&registry, &spec("/", STATUS_CHECK, json!(200)))
            .await;
        assert!(matches!(outcome, Outcome::Passed { .. }));
    }

    #[tokio::test]
    async fn test_failing_check() {
        let provider = Arc::new(ScriptedPageProvider::new().with_page("/", 404, ""));
        let executor = CheckExecutor::new(provider);
        let registry = CheckRegistry::with_builtins();

        let outcome = executor
            .execute(&registry, &spec("/", STATUS_CHECK, json!(200)))
            .await;
        assert!(matches!(outcome, Outcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_navigation_fault_becomes_errored() {
        let provider =
            Arc::new(ScriptedPageProvider::new().with_fault("/down", "connection refused"));
        let executor = CheckExecutor::new(provider);
        let registry = CheckRegistry::with_builtins();

        let outcome = executor
            .execute(&registry, &spec("/down", STATUS_CHECK, json!(200)))
            .await;
        match outcome {
            Outcome::Errored { fault, .. } => assert!(fault.contains("connection refused")),
            other => panic!("expected errored outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_evaluator_fault_becomes_errored() {
        let provider = Arc::new(ScriptedPageProvider::new().with_page("/", 200, ""));
        let executor = CheckExecutor::new(provider);
        let mut registry = CheckRegistry::with_builtins();
        registry.register(
            "flaky",
            FnEvaluator(|_session: &PageSession, _spec: &CheckSpec| -> anyhow::Result<CheckVerdict> {
                anyhow::bail!("metrics query timed out")
            }),
        );

        let outcome = executor
            .execute(&registry, &spec("/", "flaky", json!(null)))
            .await;
        match outcome {
            Outcome::Errored { fault, .. } => assert!(fault.contains("metrics query timed out")),
            other => panic!("expected errored outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unresolvable_type_becomes_errored() {
        let provider = Arc::new(ScriptedPageProvider::new().with_page("/", 200, ""));
        let executor = CheckExecutor::new(provider);
        let registry = CheckRegistry::with_builtins();

        let outcome = executor
            .execute(&registry, &spec("/", "missing-type", json!(null)))
            .await;
        assert!(matches!(outcome, Outcome::Errored { .. }));
    }

    #[tokio::test]
    async fn test_session_released_on_every_path() {
        let provider = Arc::new(
            ScriptedPageProvider::new()
                .with_page("/", 200, "")
                .with_fault("/down", "refused"),
        );
        let executor = CheckExecutor::new(provider.clone());
        let registry = CheckRegistry::with_builtins();

        executor
            .execute(&registry, &spec("/", STATUS_CHECK, json!(200)))
            .await;
        executor
            .execute(&registry, &spec("/down", STATUS_CHECK, json!(200)))
            .await;
        executor
            .execute(&registry, &spec("/", "missing-type", json!(null)))
            .await;

        assert_eq!(provider.acquired_count(), 3);
        assert_eq!(provider.released_count(), 3);
    }
}
