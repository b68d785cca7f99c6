//! Runtime configuration.
//!
//! ```toml
//! log_filter = "info,ropes_load=debug"
//! log_format = "json"
//! manifest = "ropes.toml"
//!
//! [transport]
//! kind = "http"
//! base_url = "https://api.example.com"
//! timeout_ms = 5000
//! ```
//!
//! Every key is optional. The default transport serves files from the
//! current directory.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use ropes_load::{FileTransport, HttpTransport, Transport, TransportError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, RopesError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransportConfig {
    Http {
        base_url: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    Files {
        root: PathBuf,
    },
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::Files {
            root: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RopesConfig {
    pub log_filter: String,
    pub log_format: LogFormat,
    pub manifest: Option<PathBuf>,
    pub transport: TransportConfig,
}

impl Default for RopesConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            log_format: LogFormat::Human,
            manifest: None,
            transport: TransportConfig::default(),
        }
    }
}

impl RopesConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| RopesError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// The transport described by [`transport`](Self::transport).
    pub fn build_transport(&self) -> Result<ConfiguredTransport> {
        Ok(match &self.transport {
            TransportConfig::Http {
                base_url,
                timeout_ms,
            } => ConfiguredTransport::Http(HttpTransport::new(
                base_url.clone(),
                timeout_ms.map(Duration::from_millis),
            )?),
            TransportConfig::Files { root } => ConfiguredTransport::Files(FileTransport::new(root)),
        })
    }
}

/// A transport chosen at runtime from [`RopesConfig`].
#[derive(Debug, Clone)]
pub enum ConfiguredTransport {
    Http(HttpTransport),
    Files(FileTransport),
}

type Fetch = Pin<Box<dyn Future<Output = std::result::Result<Value, TransportError>>>>;

impl Transport for ConfiguredTransport {
    fn fetch_json(
        &self,
        url: &str,
    ) -> impl Future<Output = std::result::Result<Value, TransportError>> + 'static {
        let fetch: Fetch = match self {
            Self::Http(http) => Box::pin(http.fetch_json(url)),
            Self::Files(files) => Box::pin(files.fetch_json(url)),
        };
        fetch
    }
}
