use std::path::PathBuf;

use ropes_load::{LoadError, TransportError};
use ropes_model::ModelError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RopesError>;

#[derive(Debug, Error)]
pub enum RopesError {
    #[error("anchor '{anchor}' depends on unknown data object '{name}'")]
    UnknownDataObject { anchor: String, name: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid log filter '{filter}': {message}")]
    LogFilter { filter: String, message: String },

    #[error("failed to install log subscriber: {0}")]
    Logging(String),
}
