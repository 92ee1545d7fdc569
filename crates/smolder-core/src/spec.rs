//! Check specifications: one declared assertion against one URL.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use url::Url;

/// A single declared check: a URL, the check type to evaluate against the
/// loaded page, and the opaque parameters that check type understands.
///
/// Specs are immutable after config resolution. A single URL may carry
/// several specs (one per configured check type).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckSpec {
    /// Fully resolved URL to navigate.
    pub url: Url,

    /// Registered check type name (e.g. `status`).
    pub check_type: String,

    /// Opaque parameters handed to the evaluator (expected status code,
    /// node budget, token name, ...).
    pub params: JsonValue,

    /// Whether this check depends on a real session identity and must be
    /// skipped on local/development hosts.
    pub requires_session: bool,
}

impl CheckSpec {
    /// Create a new check spec that does not require a session.
    pub fn new(url: Url, check_type: impl Into<String>, params: JsonValue) -> Self {
        Self {
            url,
            check_type: check_type.into(),
            params,
            requires_session: false,
        }
    }

    /// Mark this spec as session-dependent.
    pub fn with_session(mut self) -> Self {
        self.requires_session = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_spec_new() {
        let url = Url::parse("http://localhost:3004/").expect("url");
        let spec = CheckSpec::new(url.clone(), "status", json!(200));

        assert_eq!(spec.url, url);
        assert_eq!(spec.check_type, "status");
        assert_eq!(spec.params, json!(200));
        assert!(!spec.requires_session);
    }

    #[test]
    fn test_check_spec_with_session() {
        let url = Url::parse("http://localhost:3004/account").expect("url");
        let spec = CheckSpec::new(url, "session-token", json!("session")).with_session();
        assert!(spec.requires_session);
    }
}
