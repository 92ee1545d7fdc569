//! Check-list descriptor loading.
//!
//! The descriptor is a JSON array of entries, each naming a URL (absolute or
//! host-relative) and the checks to evaluate against it:
//!
//! ```json
//! [
//!   { "url": "/", "checks": { "status": 200 } },
//!   { "url": "/search", "checks": { "status": [200, 204], "dom-nodes": 5000 } },
//!   { "url": "/account", "checks": { "session-token": "session" } }
//! ]
//! ```
//!
//! One [`CheckSpec`] is produced per (url, check) pair. The `session-token`
//! check type implies `requires_session` unless the entry overrides it.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value as JsonValue;
use url::Url;

use crate::error::{Result, SmokeError};
use crate::registry::SESSION_TOKEN_CHECK;
use crate::spec::CheckSpec;

/// One entry of the check-list descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckEntry {
    /// Absolute URL, or a path resolved against the engine's host.
    pub url: String,

    /// Check type name → parameters for that check.
    pub checks: BTreeMap<String, JsonValue>,

    /// Override for session dependence; defaults per check type.
    #[serde(default)]
    pub requires_session: Option<bool>,
}

/// Load and resolve a descriptor file against the target host.
pub fn load_check_file(path: &Path, host: &Url) -> Result<Vec<CheckSpec>> {
    let raw = std::fs::read_to_string(path)?;
    let entries: Vec<CheckEntry> = serde_json::from_str(&raw)?;
    resolve_entries(&entries, host)
}

/// Expand descriptor entries into one spec per (url, check) pair.
pub fn resolve_entries(entries: &[CheckEntry], host: &Url) -> Result<Vec<CheckSpec>> {
    let mut specs = Vec::new();

    for entry in entries {
        let url = resolve_url(&entry.url, host)?;

        if entry.checks.is_empty() {
            return Err(SmokeError::Config(format!(
                "entry for '{}' declares no checks",
                entry.url
            )));
        }

        for (check_type, params) in &entry.checks {
            let requires_session = entry
                .requires_session
                .unwrap_or(check_type == SESSION_TOKEN_CHECK);

            let mut spec = CheckSpec::new(url.clone(), check_type, params.clone());
            if requires_session {
                spec = spec.with_session();
            }
            specs.push(spec);
        }
    }

    Ok(specs)
}

fn resolve_url(raw: &str, host: &Url) -> Result<Url> {
    match Url::parse(raw) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            host.join(raw).map_err(|e| SmokeError::InvalidUrl {
                url: raw.to_string(),
                reason: e.to_string(),
            })
        }
        Err(e) => Err(SmokeError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn host() -> Url {
        Url::parse("http://localhost:3004").expect("url")
    }

    fn parse(json: &str) -> Vec<CheckEntry> {
        serde_json::from_str(json).expect("entries")
    }

    #[test]
    fn test_relative_urls_joined_against_host() {
        let entries = parse(r#"[{ "url": "/search", "checks": { "status": 200 } }]"#);
        let specs = resolve_entries(&entries, &host()).expect("resolve");

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].url.as_str(), "http://localhost:3004/search");
        assert_eq!(specs[0].check_type, "status");
    }

    #[test]
    fn test_absolute_urls_kept() {
        let entries = parse(r#"[{ "url": "https://www.example.com/", "checks": { "status": 200 } }]"#);
        let specs = resolve_entries(&entries, &host()).expect("resolve");
        assert_eq!(specs[0].url.as_str(), "https://www.example.com/");
    }

    #[test]
    fn test_one_spec_per_check() {
        let entries = parse(
            r#"[{ "url": "/", "checks": { "status": 200, "dom-nodes": 4000 } }]"#,
        );
        let specs = resolve_entries(&entries, &host()).expect("resolve");
        assert_eq!(specs.len(), 2);
    }

    #[test]
    fn test_session_token_implies_requires_session() {
        let entries = parse(
            r#"[
                { "url": "/account", "checks": { "session-token": null } },
                { "url": "/", "checks": { "status": 200 } }
            ]"#,
        );
        let specs = resolve_entries(&entries, &host()).expect("resolve");

        let session_spec = specs
            .iter()
            .find(|s| s.check_type == SESSION_TOKEN_CHECK)
            .expect("session spec");
        let status_spec = specs.iter().find(|s| s.check_type == "status").expect("status spec");

        assert!(session_spec.requires_session);
        assert!(!status_spec.requires_session);
    }

    #[test]
    fn test_explicit_requires_session_override() {
        let entries = parse(
            r#"[{ "url": "/beta", "checks": { "status": 200 }, "requires_session": true }]"#,
        );
        let specs = resolve_entries(&entries, &host()).expect("resolve");
        assert!(specs[0].requires_session);
    }

    #[test]
    fn test_entry_without_checks_rejected() {
        let entries = parse(r#"[{ "url": "/", "checks": {} }]"#);
        let err = resolve_entries(&entries, &host()).expect_err("should reject");
        assert!(matches!(err, SmokeError::Config(_)));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let entries = parse(r#"[{ "url": "http://[not-a-host/", "checks": { "status": 200 } }]"#);
        let err = resolve_entries(&entries, &host()).expect_err("should reject");
        assert!(matches!(err, SmokeError::InvalidUrl { .. }));
    }

    #[test]
    fn test_load_check_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"[{{ "url": "/", "checks": {{ "status": 200 }} }}]"#
        )
        .expect("write");

        let specs = load_check_file(file.path(), &host()).expect("load");
        assert_eq!(specs.len(), 1);
    }

    #[test]
    fn test_malformed_descriptor_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, "not json").expect("write");

        let err = load_check_file(file.path(), &host()).expect_err("should reject");
        assert!(matches!(err, SmokeError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_check_file(Path::new("/nonexistent/checks.json"), &host())
            .expect_err("should reject");
        assert!(matches!(err, SmokeError::ConfigIo(_)));
    }
}
