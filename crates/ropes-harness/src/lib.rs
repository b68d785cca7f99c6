#![forbid(unsafe_code)]

//! Test harness for Ropes.
//!
//! - [`ScriptedTransport`] answers fetches from a script and records every
//!   requested URL.
//! - [`RecordingEngine`] binds view models in memory and counts binds and
//!   refreshes per anchor.
//! - [`TraceCapture`] collects `tracing` events so tests can assert on
//!   diagnostics.

pub mod recording;
pub mod scripted;
pub mod trace;

pub use recording::RecordingEngine;
pub use scripted::ScriptedTransport;
pub use trace::{CapturedEvent, TraceCapture};
