//! Check registry: maps check type names to evaluators.
//!
//! Each engine instance owns its own registry, so concurrent engines never
//! see each other's registrations. Built-ins are seeded at construction;
//! registration is additive and overrides by name.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Result, SmokeError};
use crate::session::PageSession;
use crate::spec::CheckSpec;

/// Built-in check type: final HTTP status against an expected code or set.
pub const STATUS_CHECK: &str = "status";

/// Built-in check type: presence of a session identity cookie on the page.
pub const SESSION_TOKEN_CHECK: &str = "session-token";

/// Structured comparison produced by an evaluator.
///
/// `result` drives classification: `true` → passed, `false` → failed.
/// Anything an evaluator raises instead is classified as an errored outcome
/// by the executor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckVerdict {
    /// Human-readable description of the expected condition.
    pub expected: String,

    /// What was actually observed on the page.
    pub actual: String,

    /// Whether the observation satisfied the expectation.
    pub result: bool,
}

/// Executable logic bound to a check type.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Evaluate one spec against one loaded page.
    async fn evaluate(
        &self,
        session: &PageSession,
        spec: &CheckSpec,
    ) -> anyhow::Result<CheckVerdict>;
}

/// Adapter registering a plain closure as an evaluator.
pub struct FnEvaluator<F>(pub F);

#[async_trait]
impl<F> Evaluator for FnEvaluator<F>
where
    F: Fn(&PageSession, &CheckSpec) -> anyhow::Result<CheckVerdict> + Send + Sync,
{
    async fn evaluate(
        &self,
        session: &PageSession,
        spec: &CheckSpec,
    ) -> anyhow::Result<CheckVerdict> {
        (self.0)(session, spec)
    }
}

/// Instance-scoped mapping from check type name to evaluator.
pub struct CheckRegistry {
    evaluators: HashMap<String, Arc<dyn Evaluator>>,
}

impl CheckRegistry {
    /// Create a registry seeded with the built-in evaluators.
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            evaluators: HashMap::new(),
        };
        registry.register(STATUS_CHECK, StatusCheck);
        registry.register(SESSION_TOKEN_CHECK, SessionTokenCheck);
        registry
    }

    /// Register an evaluator, overriding any existing one with the same name.
    pub fn register(&mut self, name: impl Into<String>, evaluator: impl Evaluator + 'static) {
        self.evaluators.insert(name.into(), Arc::new(evaluator));
    }

    /// Resolve the evaluator for a check type.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Evaluator>> {
        self.evaluators
            .get(name)
            .cloned()
            .ok_or_else(|| SmokeError::UnknownCheckType(name.to_string()))
    }

    /// Whether a check type is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.evaluators.contains_key(name)
    }
}

/// Built-in status-code evaluator.
///
/// Params: a status code (`200`) or a set of acceptable codes (`[200, 204]`).
pub struct StatusCheck;

#[async_trait]
impl Evaluator for StatusCheck {
    async fn evaluate(
        &self,
        session: &PageSession,
        spec: &CheckSpec,
    ) -> anyhow::Result<CheckVerdict> {
        let expected = expected_statuses(&spec.params)?;
        let actual = session.status();

        let expected_text = match expected.as_slice() {
            [single] => format!("status {single}"),
            set => format!(
                "status in [{}]",
                set.iter()
                    .map(u16::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };

        Ok(CheckVerdict {
            expected: expected_text,
            actual: format!("status {actual}"),
            result: expected.contains(&actual),
        })
    }
}

fn expected_statuses(params: &JsonValue) -> anyhow::Result<Vec<u16>> {
    match params {
        JsonValue::Number(_) => Ok(vec![status_code(params)?]),
        JsonValue::Array(items) => {
            if items.is_empty() {
                bail!("status check expects at least one expected code");
            }
            items.iter().map(status_code).collect()
        }
        other => bail!("status check expects a code or array of codes, got {other}"),
    }
}

fn status_code(value: &JsonValue) -> anyhow::Result<u16> {
    let code = value
        .as_u64()
        .and_then(|n| u16::try_from(n).ok())
        .filter(|n| (100..=599).contains(n));
    match code {
        Some(code) => Ok(code),
        None => bail!("'{value}' is not a valid HTTP status code"),
    }
}

/// Built-in session-token evaluator.
///
/// Asserts that the page set a non-empty session identity cookie. Params:
/// the cookie name as a string, or null for the default `session`.
pub struct SessionTokenCheck;

const DEFAULT_SESSION_TOKEN: &str = "session";

#[async_trait]
impl Evaluator for SessionTokenCheck {
    async fn evaluate(
        &self,
        session: &PageSession,
        spec: &CheckSpec,
    ) -> anyhow::Result<CheckVerdict> {
        let token = spec.params.as_str().unwrap_or(DEFAULT_SESSION_TOKEN);
        let prefix = format!("{token}=");

        let present = session
            .header("set-cookie")
            .map(|cookies| {
                cookies.split(&[',', ';'][..]).any(|kv| {
                    let kv = kv.trim();
                    kv.starts_with(&prefix) && kv.len() > prefix.len()
                })
            })
            .unwrap_or(false);

        Ok(CheckVerdict {
            expected: format!("session cookie '{token}' present"),
            actual: if present {
                format!("cookie '{token}' set")
            } else {
                format!("no '{token}' cookie")
            },
            result: present,
        })
    }
}
