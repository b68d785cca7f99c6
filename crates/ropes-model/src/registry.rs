//! Named data objects.
//!
//! A [`Registry`] is constructed once at startup and passed by reference to
//! whatever needs to look data objects up. Objects are shared as `Rc` so a
//! loader's in-flight fetch and any number of view models can hold the same
//! instance. Names are unique and iteration follows insertion order.

use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use ropes_runtime::{FieldCell, Observable};
use serde_json::Value;

use crate::data_object::DataObject;
use crate::error::{ModelError, Result};

pub struct Registry<C: FieldCell = Observable<Value>> {
    objects: Vec<(String, Rc<DataObject<C>>)>,
    index: AHashMap<String, usize>,
}

impl<C: FieldCell> Registry<C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            index: AHashMap::new(),
        }
    }

    /// Add `object` under `name`. The object takes the name for diagnostics.
    pub fn insert(&mut self, name: &str, mut object: DataObject<C>) -> Result<Rc<DataObject<C>>> {
        if self.index.contains_key(name) {
            return Err(ModelError::DuplicateName {
                name: name.to_string(),
            });
        }
        object.set_name(name);
        let object = Rc::new(object);
        self.index.insert(name.to_string(), self.objects.len());
        self.objects.push((name.to_string(), Rc::clone(&object)));
        tracing::debug!(
            data_object = name,
            fields = object.len() as u64,
            endpoint = object.endpoint_url().unwrap_or("-"),
            "registry.insert"
        );
        Ok(object)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rc<DataObject<C>>> {
        self.index.get(name).map(|&i| &self.objects[i].1)
    }

    /// Look `name` up, failing with [`ModelError::UnknownDataObject`].
    pub fn resolve(&self, name: &str) -> Result<Rc<DataObject<C>>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| ModelError::UnknownDataObject {
                name: name.to_string(),
            })
    }

    /// The cell behind `object.client_key`.
    pub fn field(&self, object: &str, client_key: &str) -> Result<C> {
        self.resolve(object)?.require(client_key)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rc<DataObject<C>>)> {
        self.objects.iter().map(|(name, object)| (name.as_str(), object))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl<C: FieldCell> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: FieldCell> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
