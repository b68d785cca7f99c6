//! The load coordinator.
//!
//! # Design
//!
//! Data objects are registered into a pending queue, typically by several
//! view models that share some of them. [`Loader::dispatch`] drains the
//! queue, groups it by endpoint, and spawns one fetch task per unique
//! endpoint. Each task hands the same payload to every object in its group.
//!
//! # Invariants
//!
//! 1. Exactly one [`Transport::fetch_json`] call per unique endpoint per
//!    dispatch, made before `dispatch` returns.
//! 2. The queue is empty when `dispatch` returns; objects registered later
//!    wait for the next dispatch.
//! 3. Groups are captured by value, so a new register/dispatch cycle is safe
//!    while earlier fetches are still in flight.
//! 4. A failed fetch is not retried. Its objects keep their last values and
//!    the failure is reported only through the task's result.
//!
//! # Runtime
//!
//! Data objects are `Rc`-based, so fetch tasks are spawned with
//! [`tokio::task::spawn_local`]. `dispatch` must be called from inside a
//! [`tokio::task::LocalSet`]; completion order across endpoints is
//! unspecified.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ropes_model::{DataObject, ExtractReport};
use ropes_runtime::{FieldCell, Observable};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::error::LoadError;
use crate::plan::partition;
use crate::transport::Transport;

pub struct Loader<T: Transport, C: FieldCell = Observable<Value>> {
    transport: T,
    pending: RefCell<Vec<Rc<DataObject<C>>>>,
}

impl<T: Transport, C: FieldCell> Loader<T, C> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            pending: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Queue `objects` for the next dispatch. Duplicates are allowed.
    pub fn register_for_load(&self, objects: impl IntoIterator<Item = Rc<DataObject<C>>>) {
        let mut pending = self.pending.borrow_mut();
        let before = pending.len();
        pending.extend(objects);
        tracing::trace!(
            added = (pending.len() - before) as u64,
            pending = pending.len() as u64,
            "load.register"
        );
    }

    /// Alias for [`register_for_load`](Self::register_for_load).
    pub fn using(&self, objects: impl IntoIterator<Item = Rc<DataObject<C>>>) {
        self.register_for_load(objects);
    }

    /// Objects queued since the last dispatch, duplicates included.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Fetch every endpoint in the queue once and clear the queue.
    ///
    /// Returns without awaiting. The returned [`Dispatch`] may be dropped;
    /// the fetches still run to completion on the local task set.
    ///
    /// # Panics
    ///
    /// Panics if called outside a [`tokio::task::LocalSet`] while the queue
    /// holds at least one object with an endpoint.
    pub fn dispatch(&self) -> Dispatch {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        let buckets = partition(&pending);
        tracing::debug!(
            queued = pending.len() as u64,
            endpoints = buckets.len() as u64,
            "load.dispatch"
        );

        let mut fetches = Vec::with_capacity(buckets.len());
        for bucket in buckets {
            let endpoint = bucket.endpoint;
            let objects = bucket.objects;
            let request = self.transport.fetch_json(&endpoint);
            let task_endpoint = endpoint.clone();
            let handle = tokio::task::spawn_local(async move {
                let payload = match request.await {
                    Ok(payload) => payload,
                    Err(source) => {
                        tracing::warn!(
                            endpoint = %task_endpoint,
                            error = %source,
                            "load.fetch.failed"
                        );
                        return Err(LoadError::Transport {
                            endpoint: task_endpoint,
                            source,
                        });
                    }
                };
                let reports: Vec<ExtractReport> =
                    objects.iter().map(|object| object.extract(&payload)).collect();
                tracing::debug!(
                    endpoint = %task_endpoint,
                    objects = objects.len() as u64,
                    "load.fetch.done"
                );
                Ok(reports)
            });
            fetches.push((endpoint, handle));
        }
        Dispatch { fetches }
    }
}

impl<T: Transport + fmt::Debug, C: FieldCell> fmt::Debug for Loader<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("transport", &self.transport)
            .field("pending", &self.pending_len())
            .finish()
    }
}

/// Task handle for one endpoint's fetch and extraction.
pub type FetchHandle = JoinHandle<Result<Vec<ExtractReport>, LoadError>>;

/// In-flight fetches started by one [`Loader::dispatch`].
#[derive(Debug)]
pub struct Dispatch {
    fetches: Vec<(String, FetchHandle)>,
}

impl Dispatch {
    /// Endpoints in the order they were requested.
    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        self.fetches.iter().map(|(endpoint, _)| endpoint.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fetches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fetches.is_empty()
    }

    /// Wait for every fetch. Outcomes follow request order.
    pub async fn settle(self) -> Vec<EndpointOutcome> {
        let mut outcomes = Vec::with_capacity(self.fetches.len());
        for (endpoint, handle) in self.fetches {
            let result = match handle.await {
                Ok(result) => result,
                Err(source) => Err(LoadError::Join {
                    endpoint: endpoint.clone(),
                    source,
                }),
            };
            outcomes.push(EndpointOutcome { endpoint, result });
        }
        outcomes
    }

    /// The raw task handles, one per endpoint.
    #[must_use]
    pub fn into_handles(self) -> Vec<(String, FetchHandle)> {
        self.fetches
    }
}

/// How one endpoint's fetch ended.
#[derive(Debug)]
pub struct EndpointOutcome {
    pub endpoint: String,
    /// One report per object fed by the payload, in bucket order.
    pub result: Result<Vec<ExtractReport>, LoadError>,
}

impl EndpointOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}
