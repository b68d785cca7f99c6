#![forbid(unsafe_code)]

//! What a view model hands to a binding engine.
//!
//! A [`Binding<T>`] is a read-through projection: every [`get`](Binding::get)
//! evaluates against current state, with no caching. Wrap a [`Computed`]
//! when the projection is expensive.
//!
//! A [`BindingScope`] is the engine's side of a bound anchor. It holds the
//! watches that re-render the anchor; releasing or dropping the scope
//! disconnects them before the next write.
//!
//! [`Computed`]: super::Computed

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use super::cell::FieldCell;
use super::computed::Computed;
use super::observable::Subscription;

/// A read-only projection of reactive state.
///
/// Clones evaluate the same projection.
pub struct Binding<T> {
    read: Rc<dyn Fn() -> T>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            read: Rc::clone(&self.read),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Binding").field(&self.get()).finish()
    }
}

impl<T: 'static> Binding<T> {
    pub fn new(read: impl Fn() -> T + 'static) -> Self {
        Self { read: Rc::new(read) }
    }

    #[must_use]
    pub fn get(&self) -> T {
        (self.read)()
    }

    /// Project the bound value further.
    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Binding<U> {
        let read = self.read;
        Binding::new(move || f(read()))
    }
}

impl Binding<Value> {
    /// Read a field cell directly.
    pub fn cell<C: FieldCell>(cell: &C) -> Self {
        let cell = cell.clone();
        Self::new(move || cell.read())
    }

    /// Read a derived value, converting it to JSON.
    pub fn computed<T: Clone + Into<Value> + 'static>(computed: &Computed<T>) -> Self {
        let computed = computed.clone();
        Self::new(move || computed.get().into())
    }
}

/// The live watches behind one bound anchor.
#[derive(Default)]
pub struct BindingScope {
    watches: Vec<Subscription>,
}

impl BindingScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `on_change` after every write that changes `cell`, until the
    /// scope is released.
    pub fn watch<C: FieldCell>(
        &mut self,
        cell: &C,
        on_change: impl Fn(&Value) + 'static,
    ) -> &mut Self {
        self.watches.push(cell.watch(on_change));
        self
    }

    /// Take ownership of a watch created elsewhere.
    pub fn keep(&mut self, watch: Subscription) {
        self.watches.push(watch);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.watches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    /// Disconnect every watch. The scope can be reused.
    pub fn release(&mut self) {
        self.watches.clear();
    }
}

impl fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingScope")
            .field("watches", &self.watches.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::observable::Observable;
    use serde_json::json;
    use std::cell::Cell;

    fn cell(value: Value) -> Observable<Value> {
        <Observable<Value> as FieldCell>::create(value)
    }

    #[test]
    fn cell_binding_reads_through() {
        let name = cell(json!(""));
        let binding = Binding::cell(&name);
        assert_eq!(binding.get(), json!(""));
        name.write(json!("Ada"));
        assert_eq!(binding.get(), json!("Ada"));
    }

    #[test]
    fn map_projects_on_every_read() {
        let circulation = cell(json!(3));
        let label = Binding::cell(&circulation)
            .map(|v| v.as_i64().unwrap_or(0) * 1000)
            .map(|n| format!("{n} copies"));
        assert_eq!(label.get(), "3000 copies");
        circulation.write(json!(7));
        assert_eq!(label.get(), "7000 copies");
    }

    #[test]
    fn computed_binding_converts_to_json() {
        let name = cell(json!("ada"));
        let upper = Computed::from_cells(&[name.clone()], |v| {
            v[0].as_str().unwrap_or_default().to_uppercase()
        });
        let binding = Binding::computed(&upper);
        assert_eq!(binding.get(), json!("ADA"));
        name.write(json!("grace"));
        assert_eq!(binding.get(), json!("GRACE"));
    }

    #[test]
    fn dropped_scope_stops_callbacks() {
        let phone = cell(json!(""));
        let hits = Rc::new(Cell::new(0));
        {
            let mut scope = BindingScope::new();
            let h = Rc::clone(&hits);
            scope.watch(&phone, move |_| h.set(h.get() + 1));
            phone.write(json!("555"));
            assert_eq!(scope.len(), 1);
        }
        phone.write(json!("777"));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn released_scope_is_reusable() {
        let phone = cell(json!(""));
        let mut scope = BindingScope::new();
        scope.keep(phone.watch(|_| {}));
        scope.release();
        assert!(scope.is_empty());
        assert_eq!(phone.subscriber_count(), 0);

        scope.watch(&phone, |_| {});
        assert!(format!("{scope:?}").contains("watches: 1"));
    }
}
