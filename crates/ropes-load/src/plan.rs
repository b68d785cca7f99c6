//! Grouping pending data objects into one fetch per endpoint.

use std::rc::Rc;

use ahash::{AHashMap, AHashSet};
use ropes_model::DataObject;
use ropes_runtime::FieldCell;

/// One endpoint and the distinct objects fed by its payload.
pub struct Bucket<C: FieldCell> {
    pub endpoint: String,
    pub objects: Vec<Rc<DataObject<C>>>,
}

impl<C: FieldCell> std::fmt::Debug for Bucket<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bucket")
            .field("endpoint", &self.endpoint)
            .field("objects", &self.objects.len())
            .finish()
    }
}

/// Partition `pending` by endpoint.
///
/// Buckets appear in the order their endpoint was first seen. Within a
/// bucket, objects are unique by identity and keep first-seen order. Objects
/// without an endpoint are skipped.
#[must_use]
pub fn partition<C: FieldCell>(pending: &[Rc<DataObject<C>>]) -> Vec<Bucket<C>> {
    let mut buckets: Vec<Bucket<C>> = Vec::new();
    let mut by_endpoint: AHashMap<&str, usize> = AHashMap::new();
    let mut seen: AHashSet<*const DataObject<C>> = AHashSet::new();

    for object in pending {
        let Some(endpoint) = object.endpoint_url() else {
            tracing::debug!(
                data_object = object.name().unwrap_or("<unnamed>"),
                "data object has no endpoint; not loaded"
            );
            continue;
        };
        if !seen.insert(Rc::as_ptr(object)) {
            continue;
        }
        let slot = *by_endpoint.entry(endpoint).or_insert_with(|| {
            buckets.push(Bucket {
                endpoint: endpoint.to_string(),
                objects: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[slot].objects.push(Rc::clone(object));
    }
    buckets
}
