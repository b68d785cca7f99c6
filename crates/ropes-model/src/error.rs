use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest parse error: {0}")]
    Manifest(#[from] toml::de::Error),

    #[error("duplicate data object name: {name}")]
    DuplicateName { name: String },

    #[error("unknown data object: {name}")]
    UnknownDataObject { name: String },

    #[error("data object '{object}' has no field '{client_key}'")]
    UnknownField { object: String, client_key: String },

    #[error("duplicate field '{client_key}' in data object '{object}'")]
    DuplicateField { object: String, client_key: String },

    #[error("invalid api key '{api_key}' for field '{client_key}': {reason}")]
    InvalidApiKey {
        client_key: String,
        api_key: String,
        reason: &'static str,
    },
}
