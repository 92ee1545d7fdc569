//! In-memory fakes for the page-provider port (testing only)
//!
//! Provides `ScriptedPageProvider`, which serves canned pages keyed by URL
//! path and satisfies the [`PageProvider`] contract without any network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use url::Url;

use crate::session::{PageProvider, PageSession};

#[derive(Debug, Clone)]
struct ScriptedPage {
    status: u16,
    headers: HashMap<String, String>,
    body: String,
    fault: Option<String>,
}

/// Scripted page provider: responds per URL path with a canned page or a
/// navigation fault. Unknown paths fault, like a dead route would.
///
/// Tracks acquire/release counts so tests can assert the session lifecycle.
#[derive(Debug, Default)]
pub struct ScriptedPageProvider {
    pages: HashMap<String, ScriptedPage>,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl ScriptedPageProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with `status` for `path`.
    pub fn with_page(mut self, path: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.pages.insert(
            path.into(),
            ScriptedPage {
                status,
                headers: HashMap::new(),
                body: body.into(),
                fault: None,
            },
        );
        self
    }

    /// Serve a page with an extra response header (lowercase name).
    pub fn with_header(
        mut self,
        path: impl Into<String> + Clone,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        if let Some(page) = self.pages.get_mut(&path.clone().into()) {
            page.headers
                .insert(name.into().to_ascii_lowercase(), value.into());
        }
        self
    }

    /// Fail navigation for `path` with `fault`.
    pub fn with_fault(mut self, path: impl Into<String>, fault: impl Into<String>) -> Self {
        self.pages.insert(
            path.into(),
            ScriptedPage {
                status: 0,
                headers: HashMap::new(),
                body: String::new(),
                fault: Some(fault.into()),
            },
        );
        self
    }

    /// Number of sessions handed out so far.
    pub fn acquired_count(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    /// Number of sessions released so far.
    pub fn released_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageProvider for ScriptedPageProvider {
    async fn acquire(&self, url: &Url) -> PageSession {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        match self.pages.get(url.path()) {
            Some(page) => match &page.fault {
                Some(fault) => PageSession::faulted(url.clone(), fault.clone()),
                None => PageSession::loaded(
                    url.clone(),
                    page.status,
                    page.headers.clone(),
                    page.body.clone(),
                ),
            },
            None => PageSession::faulted(url.clone(), format!("no route for {}", url.path())),
        }
    }

    async fn release(&self, session: PageSession) {
        self.released.fetch_add(1, Ordering::SeqCst);
        drop(session);
    }
}
