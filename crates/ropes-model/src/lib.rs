#![forbid(unsafe_code)]

//! Schema-driven data objects for Ropes.
//!
//! A [`DataObject`] is a named bundle of reactive fields populated from one
//! JSON endpoint. Each field is declared by a [`FieldSpec`] that maps a flat
//! client key to a dot path inside the API response, with a default value the
//! UI can bind to before anything has been fetched.
//!
//! Data objects live in a [`Registry`], usually built from a TOML
//! [`Manifest`].

pub mod data_object;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod schema;

pub use data_object::{DataObject, DataObjectOptions, ExtractReport};
pub use error::{ModelError, Result};
pub use manifest::{DataObjectDecl, Manifest};
pub use registry::Registry;
pub use schema::{FieldMiss, FieldSpec, resolve_path};
