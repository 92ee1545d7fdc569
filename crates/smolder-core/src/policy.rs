//! Host policy: which checks may run against the current target.
//!
//! Session-dependent checks cannot be exercised meaningfully against a
//! local/development host, so they are skipped there — not failed, not
//! errored, and invisible to the run report.

use url::{Host, Url};

use crate::spec::CheckSpec;

/// Decides per-spec eligibility for a target host.
#[derive(Debug, Clone)]
pub struct HostPolicy {
    local_hostnames: Vec<String>,
}

impl Default for HostPolicy {
    fn default() -> Self {
        Self {
            local_hostnames: vec!["localhost".to_string()],
        }
    }
}

impl HostPolicy {
    /// Treat an additional hostname as local/development.
    pub fn with_local_hostname(mut self, name: impl Into<String>) -> Self {
        self.local_hostnames.push(name.into());
        self
    }

    /// Whether `host` is a local/development target.
    ///
    /// Matches the configured hostnames (case-insensitive) and any loopback
    /// IP literal; a loopback address cannot carry a real session either.
    pub fn is_local(&self, host: &Url) -> bool {
        match host.host() {
            Some(Host::Domain(domain)) => self
                .local_hostnames
                .iter()
                .any(|name| name.eq_ignore_ascii_case(domain)),
            Some(Host::Ipv4(ip)) => ip.is_loopback(),
            Some(Host::Ipv6(ip)) => ip.is_loopback(),
            None => true,
        }
    }

    /// Whether `spec` may run against `host`.
    pub fn is_eligible(&self, spec: &CheckSpec, host: &Url) -> bool {
        !(spec.requires_session && self.is_local(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn host(s: &str) -> Url {
        Url::parse(s).expect("url")
    }

    fn session_spec() -> CheckSpec {
        CheckSpec::new(host("http://localhost:3004/account"), "session-token", json!(null))
            .with_session()
    }

    fn plain_spec() -> CheckSpec {
        CheckSpec::new(host("http://localhost:3004/"), "status", json!(200))
    }

    #[test]
    fn test_localhost_is_local() {
        let policy = HostPolicy::default();
        assert!(policy.is_local(&host("http://localhost:3004")));
        assert!(policy.is_local(&host("http://LOCALHOST")));
    }

    #[test]
    fn test_loopback_ips_are_local() {
        let policy = HostPolicy::default();
        assert!(policy.is_local(&host("http://127.0.0.1:8080")));
        assert!(policy.is_local(&host("http://127.1.2.3")));
        assert!(policy.is_local(&host("http://[::1]:3000")));
    }

    #[test]
    fn test_real_hosts_are_not_local() {
        let policy = HostPolicy::default();
        assert!(!policy.is_local(&host("https://www.example.com")));
        assert!(!policy.is_local(&host("http://10.0.0.5")));
    }

    #[test]
    fn test_extra_local_hostname() {
        let policy = HostPolicy::default().with_local_hostname("dev.internal");
        assert!(policy.is_local(&host("http://dev.internal:9000")));
    }

    #[test]
    fn test_session_spec_skipped_on_local_host() {
        let policy = HostPolicy::default();
        assert!(!policy.is_eligible(&session_spec(), &host("http://localhost:3004")));
        assert!(policy.is_eligible(&session_spec(), &host("https://www.example.com")));
    }

    #[test]
    fn test_plain_spec_always_eligible() {
        let policy = HostPolicy::default();
        assert!(policy.is_eligible(&plain_spec(), &host("http://localhost:3004")));
        assert!(policy.is_eligible(&plain_spec(), &host("https://www.example.com")));
    }
}
