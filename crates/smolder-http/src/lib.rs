//! HTTP-backed page session provider.
//!
//! Implements the engine's [`PageProvider`] port with a `reqwest` client:
//! navigation is a GET request following redirects, the session captures the
//! final status, folded headers, and body. Transport failures surface as
//! faulted sessions, never as errors, so the executor classifies them
//! uniformly.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use smolder_core::session::{PageProvider, PageSession};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Page provider that navigates with an HTTP client.
pub struct HttpPageProvider {
    client: Client,
}

impl HttpPageProvider {
    /// Provider with the default timeout.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Provider with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("smolder/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Provider over an existing client (shared pools, custom TLS, ...).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageProvider for HttpPageProvider {
    async fn acquire(&self, url: &Url) -> PageSession {
        debug!(url = %url, "Navigating");

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "Navigation failed");
                return PageSession::faulted(url.clone(), e.to_string());
            }
        };

        let final_url = response.url().clone();
        let status = response.status().as_u16();

        // Fold repeated headers (e.g. several Set-Cookie lines) into one
        // comma-separated value under a lowercase name.
        let mut headers: HashMap<String, String> = HashMap::new();
        for (name, value) in response.headers() {
            let Ok(value) = value.to_str() else { continue };
            headers
                .entry(name.as_str().to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to read page body");
                return PageSession::faulted(url.clone(), format!("failed to read body: {e}"));
            }
        };

        debug!(url = %final_url, status, bytes = body.len(), "Page loaded");
        PageSession::loaded(final_url, status, headers, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_builds_with_defaults() {
        assert!(HttpPageProvider::new().is_ok());
        assert!(HttpPageProvider::with_timeout(Duration::from_secs(5)).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_yields_faulted_session() {
        let provider = HttpPageProvider::with_timeout(Duration::from_secs(2)).expect("provider");
        // Port 9 (discard) is not listening; connection is refused fast.
        let url = Url::parse("http://127.0.0.1:9/").expect("url");

        let session = provider.acquire(&url).await;
        assert!(session.fault().is_some());
        assert_eq!(session.status(), 0);
    }
}
