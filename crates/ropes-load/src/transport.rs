//! Where payloads come from.
//!
//! The loader calls [`Transport::fetch_json`] once per unique endpoint per
//! dispatch and never retries. The returned future must own everything it
//! needs because it runs on a local task after `dispatch` returns.
//!
//! Two transports ship with the crate:
//!
//! | Transport         | Resolves `url` as                     |
//! |-------------------|---------------------------------------|
//! | [`HttpTransport`] | `GET <base_url>/<url>` via `reqwest`  |
//! | [`FileTransport`] | `<root>/<url>` read with `tokio::fs`  |

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;

use crate::error::TransportError;

/// Fetches one JSON document per call.
pub trait Transport: 'static {
    fn fetch_json(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Value, TransportError>> + 'static;
}

// ============================================================================
// HTTP
// ============================================================================

/// `reqwest`-backed transport. Relative URLs are joined onto `base_url`;
/// absolute `http(s)://` URLs are used as given.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a client with an optional per-request timeout.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(TransportError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The absolute URL requested for `url`.
    #[must_use]
    pub fn url_for(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") || self.base_url.is_empty() {
            return url.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }
}

impl Transport for HttpTransport {
    fn fetch_json(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Value, TransportError>> + 'static {
        let client = self.client.clone();
        let url = self.url_for(url);
        async move {
            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|source| TransportError::Http {
                    url: url.clone(),
                    source,
                })?;
            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Status {
                    url,
                    status: status.as_u16(),
                });
            }
            let body = response.bytes().await.map_err(|source| TransportError::Http {
                url: url.clone(),
                source,
            })?;
            serde_json::from_slice(&body).map_err(|source| TransportError::Decode { url, source })
        }
    }
}

// ============================================================================
// Files
// ============================================================================

/// Serves endpoints from a directory, for fixtures and offline demos.
#[derive(Debug, Clone)]
pub struct FileTransport {
    root: PathBuf,
}

impl FileTransport {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.root.join(url.trim_start_matches('/'))
    }
}

impl Transport for FileTransport {
    fn fetch_json(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Value, TransportError>> + 'static {
        let path = self.path_for(url);
        let url = url.to_string();
        async move {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|source| TransportError::Io { path, source })?;
            serde_json::from_slice(&bytes).map_err(|source| TransportError::Decode { url, source })
        }
    }
}
