//! View models and the factories that build them.
//!
//! A view model exposes named display values as [`Binding`]s and lists the
//! cells whose changes should re-render it. It reads data object fields and
//! derives from them, but never writes them.

use std::fmt;

use ropes_model::Registry;
use ropes_runtime::{Binding, FieldCell, Observable};
use serde_json::Value;

use crate::error::Result;

pub trait ViewModel<C: FieldCell = Observable<Value>> {
    /// Named display values in render order.
    fn fields(&self) -> Vec<(String, Binding<Value>)>;

    /// Cells whose changes refresh the bound anchor.
    fn sources(&self) -> Vec<C>;

    /// Current value of every field.
    fn render(&self) -> Vec<(String, Value)> {
        self.fields()
            .into_iter()
            .map(|(name, binding)| (name, binding.get()))
            .collect()
    }
}

/// Builds a view model for one anchor.
///
/// [`dependencies`](Self::dependencies) must name every data object the
/// built view model reads. Only declared objects are registered for loading;
/// an undeclared object can still be read through the registry but is not
/// fetched on its behalf.
pub trait ViewModelFactory<C: FieldCell = Observable<Value>> {
    /// Data object names this view model reads.
    fn dependencies(&self) -> Vec<&str>;

    fn build(&self, registry: &Registry<C>) -> Result<Box<dyn ViewModel<C>>>;
}

/// A factory from a dependency list and a closure.
pub struct FnFactory<F> {
    dependencies: Vec<String>,
    build: F,
}

impl<F> fmt::Debug for FnFactory<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFactory")
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Declare `dependencies` and build with `build`.
pub fn factory<C, F>(
    dependencies: impl IntoIterator<Item = impl Into<String>>,
    build: F,
) -> FnFactory<F>
where
    C: FieldCell,
    F: Fn(&Registry<C>) -> Result<Box<dyn ViewModel<C>>>,
{
    FnFactory {
        dependencies: dependencies.into_iter().map(Into::into).collect(),
        build,
    }
}

impl<C, F> ViewModelFactory<C> for FnFactory<F>
where
    C: FieldCell,
    F: Fn(&Registry<C>) -> Result<Box<dyn ViewModel<C>>>,
{
    fn dependencies(&self) -> Vec<&str> {
        self.dependencies.iter().map(String::as_str).collect()
    }

    fn build(&self, registry: &Registry<C>) -> Result<Box<dyn ViewModel<C>>> {
        (self.build)(registry)
    }
}

/// A view model assembled field by field.
pub struct FieldViewModel<C: FieldCell = Observable<Value>> {
    fields: Vec<(String, Binding<Value>)>,
    sources: Vec<C>,
}

impl<C: FieldCell> FieldViewModel<C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Show `cell` as `name`.
    #[must_use]
    pub fn cell(mut self, name: impl Into<String>, cell: &C) -> Self {
        self.fields.push((name.into(), Binding::cell(cell)));
        self.sources.push(cell.clone());
        self
    }

    /// Show a value derived from `sources` as `name`.
    #[must_use]
    pub fn derived(
        mut self,
        name: impl Into<String>,
        binding: Binding<Value>,
        sources: &[C],
    ) -> Self {
        self.fields.push((name.into(), binding));
        self.sources.extend(sources.iter().cloned());
        self
    }

    #[must_use]
    pub fn boxed(self) -> Box<dyn ViewModel<C>> {
        Box::new(self)
    }
}

impl<C: FieldCell> Default for FieldViewModel<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: FieldCell> ViewModel<C> for FieldViewModel<C> {
    fn fields(&self) -> Vec<(String, Binding<Value>)> {
        self.fields.clone()
    }

    fn sources(&self) -> Vec<C> {
        self.sources.clone()
    }
}
