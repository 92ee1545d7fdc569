//! Page sessions and the provider port.
//!
//! A [`PageSession`] wraps one navigated page: final status, response
//! headers, body, and a metrics snapshot computed lazily on first access.
//! The engine acquires sessions through the [`PageProvider`] port; the
//! concrete transport (HTTP client, browser runtime) lives behind it.

use std::collections::HashMap;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use url::Url;

/// Derived metrics for one loaded page, computed once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMetrics {
    /// Number of DOM element nodes in the page body.
    pub dom_nodes: u64,

    /// Body size in bytes.
    pub body_bytes: u64,
}

/// One navigated page, exclusively owned by a single check execution.
///
/// Navigation failure produces a session in a *faulted* state rather than an
/// error, so the executor can classify every navigation problem uniformly.
#[derive(Debug)]
pub struct PageSession {
    url: Url,
    status: u16,
    headers: HashMap<String, String>,
    body: String,
    fault: Option<String>,
    metrics: OnceCell<PageMetrics>,
}

impl PageSession {
    /// A successfully navigated page.
    pub fn loaded(url: Url, status: u16, headers: HashMap<String, String>, body: String) -> Self {
        Self {
            url,
            status,
            headers,
            body,
            fault: None,
            metrics: OnceCell::new(),
        }
    }

    /// A session whose navigation failed.
    pub fn faulted(url: Url, fault: impl Into<String>) -> Self {
        Self {
            url,
            status: 0,
            headers: HashMap::new(),
            body: String::new(),
            fault: Some(fault.into()),
            metrics: OnceCell::new(),
        }
    }

    /// Final URL of the page (after any redirects the provider followed).
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Final HTTP status code, or 0 for a faulted session.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// All response headers (lowercase names).
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Raw page body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Navigation fault, if the page never loaded.
    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    /// Metrics snapshot, computed on first access and cached for the
    /// session's lifetime.
    pub fn metrics(&self) -> &PageMetrics {
        self.metrics.get_or_init(|| PageMetrics {
            dom_nodes: count_dom_nodes(&self.body),
            body_bytes: self.body.len() as u64,
        })
    }
}

/// Count element open tags in a page body.
///
/// No HTML parser: `<` followed by an ASCII letter marks an element node,
/// which is accurate enough for a node-budget smoke check.
fn count_dom_nodes(body: &str) -> u64 {
    let bytes = body.as_bytes();
    let mut nodes = 0;
    for window in bytes.windows(2) {
        if window[0] == b'<' && window[1].is_ascii_alphabetic() {
            nodes += 1;
        }
    }
    nodes
}

/// Port for acquiring navigated pages.
///
/// `acquire` suspends until navigation completes or fails; a failed
/// navigation yields a faulted session, never an error. The engine calls
/// `release` exactly once per acquired session, on every outcome path.
#[async_trait]
pub trait PageProvider: Send + Sync {
    /// Navigate `url` and return the resulting session.
    async fn acquire(&self, url: &Url) -> PageSession;

    /// Release a session's underlying page resource.
    async fn release(&self, session: PageSession) {
        drop(session);
    }
}
