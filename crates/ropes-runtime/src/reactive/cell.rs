#![forbid(unsafe_code)]

//! The reactive capability a data object field is built on.
//!
//! Data objects, loaders, and the orchestrator are generic over
//! [`FieldCell`], so any signal or observable implementation can back them.
//! The crate ships one: [`Observable<Value>`].

use serde_json::Value;

use super::computed::Computed;
use super::observable::{Observable, Subscription};

/// A holder of a JSON value that notifies watchers when written.
///
/// Implementations must be cheap handles: cloning shares the same value.
pub trait FieldCell: Clone + 'static {
    /// Create a cell holding `initial`.
    fn create(initial: Value) -> Self;

    /// Current value.
    fn read(&self) -> Value;

    /// Store `value`, notifying watchers. Returns `true` when the value
    /// changed; writing an equal value must not notify.
    fn write(&self, value: Value) -> bool;

    /// Run `callback` after every change while the guard is alive.
    fn watch(&self, callback: impl Fn(&Value) + 'static) -> Subscription;
}

impl FieldCell for Observable<Value> {
    fn create(initial: Value) -> Self {
        Observable::new(initial)
    }

    fn read(&self) -> Value {
        self.get()
    }

    fn write(&self, value: Value) -> bool {
        self.set(value)
    }

    fn watch(&self, callback: impl Fn(&Value) + 'static) -> Subscription {
        self.subscribe(callback)
    }
}

/// Derive a read-only value from other cells.
///
/// Shorthand for [`Computed::from_cells`].
pub fn derive<C: FieldCell, T: Clone + 'static>(
    sources: &[C],
    compute: impl Fn(&[Value]) -> T + 'static,
) -> Computed<T> {
    Computed::from_cells(sources, compute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn observable_cell_round_trip() {
        let cell = <Observable<Value> as FieldCell>::create(json!(""));
        assert_eq!(cell.read(), json!(""));
        assert!(cell.write(json!("x")));
        assert!(!cell.write(json!("x")));
        assert_eq!(cell.read(), json!("x"));
    }

    #[test]
    fn watch_fires_once_per_change() {
        let cell = <Observable<Value> as FieldCell>::create(json!(0));
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _guard = cell.watch(move |_| h.set(h.get() + 1));

        cell.write(json!(1));
        cell.write(json!(1));
        cell.write(json!(2));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn derive_recomputes_after_write() {
        let count = <Observable<Value> as FieldCell>::create(json!(2));
        let doubled = derive(&[count.clone()], |v| v[0].as_i64().unwrap_or(0) * 2);
        assert_eq!(doubled.get(), 4);
        count.write(json!(21));
        assert_eq!(doubled.get(), 42);
    }
}
