//! Binding view models to anchors and loading what they need.
//!
//! [`Ropes::bind`] takes an ordered list of `(anchor, factory)` pairs and:
//!
//! 1. resolves every factory's declared dependencies against the registry,
//!    failing the whole call on the first unknown name;
//! 2. builds every view model, failing the whole call on the first error;
//! 3. for each entry in order, queues its dependencies on the loader and
//!    hands the view model to the binding engine;
//! 4. dispatches the loader exactly once.
//!
//! Nothing is queued or bound unless steps 1 and 2 succeed for every entry.
//! Anchors therefore render defaults first and update as payloads arrive.

use std::rc::Rc;

use ropes_load::{Dispatch, Loader, Transport};
use ropes_model::{DataObject, Registry};
use ropes_runtime::{FieldCell, Observable};
use serde_json::Value;

use crate::engine::BindingEngine;
use crate::error::{Result, RopesError};
use crate::view_model::{ViewModel, ViewModelFactory};

/// The orchestrator. Holds the registry, loader, and engine by reference.
pub struct Ropes<'a, T, E, C = Observable<Value>>
where
    T: Transport,
    E: BindingEngine<C> + ?Sized,
    C: FieldCell,
{
    registry: &'a Registry<C>,
    loader: &'a Loader<T, C>,
    engine: &'a E,
}

impl<'a, T, E, C> Ropes<'a, T, E, C>
where
    T: Transport,
    E: BindingEngine<C> + ?Sized,
    C: FieldCell,
{
    #[must_use]
    pub fn new(registry: &'a Registry<C>, loader: &'a Loader<T, C>, engine: &'a E) -> Self {
        Self {
            registry,
            loader,
            engine,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &'a Registry<C> {
        self.registry
    }

    #[must_use]
    pub fn loader(&self) -> &'a Loader<T, C> {
        self.loader
    }

    /// Bind every entry, then fetch their data once.
    ///
    /// Must be called inside a [`tokio::task::LocalSet`] when any dependency
    /// has an endpoint; see [`Loader::dispatch`].
    ///
    /// [`tokio::task::LocalSet`]: https://docs.rs/tokio/latest/tokio/task/struct.LocalSet.html
    pub fn bind(&self, entries: &[(&str, &dyn ViewModelFactory<C>)]) -> Result<Dispatch> {
        let mut resolved: Vec<Vec<Rc<DataObject<C>>>> = Vec::with_capacity(entries.len());
        for (anchor, factory) in entries {
            resolved.push(self.resolve_dependencies(anchor, *factory)?);
        }

        let mut built: Vec<Box<dyn ViewModel<C>>> = Vec::with_capacity(entries.len());
        for (_, factory) in entries {
            built.push(factory.build(self.registry)?);
        }

        for (((anchor, _), objects), view_model) in entries.iter().zip(resolved).zip(built) {
            let dependencies = objects.len();
            self.loader.register_for_load(objects);
            self.engine.bind(anchor, view_model);
            tracing::debug!(
                anchor = *anchor,
                dependencies = dependencies as u64,
                "ropes.bind"
            );
        }

        let dispatch = self.loader.dispatch();
        tracing::info!(
            anchors = entries.len() as u64,
            endpoints = dispatch.len() as u64,
            "ropes.bind.done"
        );
        Ok(dispatch)
    }

    /// Look up `factory`'s dependencies, each name once, in declared order.
    fn resolve_dependencies(
        &self,
        anchor: &str,
        factory: &dyn ViewModelFactory<C>,
    ) -> Result<Vec<Rc<DataObject<C>>>> {
        let mut names: Vec<&str> = Vec::new();
        for name in factory.dependencies() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
            .into_iter()
            .map(|name| {
                self.registry
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RopesError::UnknownDataObject {
                        anchor: anchor.to_string(),
                        name: name.to_string(),
                    })
            })
            .collect()
    }
}
