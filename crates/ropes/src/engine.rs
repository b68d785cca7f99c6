//! The seam between view models and whatever displays them.

use std::rc::Rc;

use ropes_runtime::{BindingScope, FieldCell, Observable};
use serde_json::Value;

use crate::view_model::ViewModel;

/// Attaches view models to anchors.
///
/// An engine renders the view model's fields onto the anchor when bound and
/// again whenever one of its [`sources`](ViewModel::sources) changes.
/// Engines are used through `&self`; keep per-anchor state behind a
/// `RefCell`.
pub trait BindingEngine<C: FieldCell = Observable<Value>> {
    fn bind(&self, anchor: &str, view_model: Box<dyn ViewModel<C>>);
}

/// Call `refresh` after every change to any of the view model's sources.
///
/// The returned scope owns the subscriptions and the view model; dropping it
/// stops the refreshes.
pub fn keep_live<C: FieldCell>(
    view_model: Box<dyn ViewModel<C>>,
    refresh: impl Fn(&dyn ViewModel<C>) + 'static,
) -> BindingScope {
    let view_model: Rc<dyn ViewModel<C>> = Rc::from(view_model);
    let refresh: Rc<dyn Fn(&dyn ViewModel<C>)> = Rc::new(refresh);
    let mut scope = BindingScope::new();
    for source in view_model.sources() {
        let view_model = Rc::clone(&view_model);
        let refresh = Rc::clone(&refresh);
        scope.watch(&source, move |_| refresh(&*view_model));
    }
    scope
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view_model::FieldViewModel;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn refreshes_once_per_source_change() {
        let name = <Observable<Value> as FieldCell>::create(json!(""));
        let phone = <Observable<Value> as FieldCell>::create(json!(""));
        let vm = FieldViewModel::new().cell("name", &name).cell("phone", &phone);

        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let scope = keep_live(vm.boxed(), move |vm| {
            h.set(h.get() + 1);
            assert_eq!(vm.fields().len(), 2);
        });
        assert_eq!(scope.len(), 2);

        name.write(json!("Ada"));
        name.write(json!("Ada"));
        phone.write(json!("555"));
        assert_eq!(hits.get(), 2);

        drop(scope);
        name.write(json!("Grace"));
        assert_eq!(hits.get(), 2);
    }
}
