#![forbid(unsafe_code)]

//! Ropes: declarative data objects, coalesced loading, and view-model
//! binding.
//!
//! # Role in Ropes
//! `ropes` is the public facade crate. It re-exports the model, loader, and
//! reactive runtime, and adds the orchestrator that ties them together.
//!
//! # How it fits in the system
//! A [`Registry`] of [`DataObject`]s is built at startup, usually from a
//! TOML [`Manifest`]. View model factories declare which data objects they
//! read. [`Ropes::bind`] binds every view model to its anchor through a
//! [`BindingEngine`], queues the declared data objects on a [`Loader`], and
//! dispatches one fetch per distinct endpoint. Bound anchors show defaults
//! immediately and update as payloads arrive.

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod view_model;

pub use config::{ConfiguredTransport, LogFormat, RopesConfig, TransportConfig};
pub use engine::{BindingEngine, keep_live};
pub use error::{Result, RopesError};
pub use orchestrator::Ropes;
pub use view_model::{FieldViewModel, FnFactory, ViewModel, ViewModelFactory, factory};

pub use ropes_load::{
    Dispatch, EndpointOutcome, FileTransport, HttpTransport, LoadError, Loader, Transport,
    TransportError,
};
pub use ropes_model::{
    DataObject, DataObjectOptions, ExtractReport, FieldSpec, Manifest, ModelError, Registry,
};
pub use ropes_runtime::{Binding, BindingScope, Computed, FieldCell, Observable, derive};

/// Everything an application needs to declare data and bind view models.
pub mod prelude {
    pub use crate::{
        Binding, BindingEngine, Computed, DataObject, DataObjectOptions, FieldCell, FieldSpec,
        FieldViewModel, Loader, Manifest, Observable, Registry, Ropes, RopesError, ViewModel,
        ViewModelFactory, derive, factory,
    };
    pub use ropes_load;
    pub use ropes_model;
    pub use ropes_runtime;
}
