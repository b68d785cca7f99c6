#![forbid(unsafe_code)]

//! Coalesced loading for Ropes data objects.
//!
//! A [`Loader`] collects data objects from any number of consumers and
//! fetches each distinct endpoint once per [`Loader::dispatch`], feeding the
//! same payload to every object that shares it. Payloads come from a
//! [`Transport`]; [`HttpTransport`] and [`FileTransport`] are provided.

pub mod error;
pub mod loader;
pub mod plan;
pub mod transport;

pub use error::{LoadError, TransportError};
pub use loader::{Dispatch, EndpointOutcome, FetchHandle, Loader};
pub use plan::{Bucket, partition};
pub use transport::{FileTransport, HttpTransport, Transport};
