#![forbid(unsafe_code)]

//! Quick-stats demo: a contact panel and an outlet panel bound to two data
//! objects, loaded from two endpoints.

pub mod cli;
pub mod error;
pub mod format;
pub mod text_engine;
pub mod view_models;

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{DemoError, Result};
