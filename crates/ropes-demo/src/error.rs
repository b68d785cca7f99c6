use std::path::PathBuf;

use ropes::{ModelError, RopesError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Ropes(#[from] RopesError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("required path does not exist: {path}")]
    MissingPath { path: PathBuf },

    #[error("{failed} of {total} endpoints failed to load")]
    LoadFailed { failed: usize, total: usize },
}

impl DemoError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::LoadFailed { .. } => 3,
            Self::Ropes(_) | Self::Model(_) | Self::MissingPath { .. } => 2,
            Self::Io(_) => 1,
        }
    }
}
