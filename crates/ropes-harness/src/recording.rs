//! A binding engine that records what it was asked to do.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ropes::{BindingEngine, BindingScope, FieldCell, ViewModel, keep_live};
use serde_json::Value;

#[derive(Debug, Default)]
struct AnchorLog {
    binds: Cell<usize>,
    refreshes: Cell<usize>,
    rendered: RefCell<Vec<(String, Value)>>,
}

/// Renders every bound view model into memory and counts binds and
/// refreshes per anchor.
///
/// Binding the same anchor twice keeps both view models live; the anchor's
/// rendering follows whichever refreshed last.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    anchors: RefCell<Vec<(String, Rc<AnchorLog>)>>,
    scopes: RefCell<Vec<BindingScope>>,
}

impl RecordingEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self, anchor: &str) -> Rc<AnchorLog> {
        let mut anchors = self.anchors.borrow_mut();
        if let Some((_, log)) = anchors.iter().find(|(name, _)| name == anchor) {
            return Rc::clone(log);
        }
        let log = Rc::new(AnchorLog::default());
        anchors.push((anchor.to_string(), Rc::clone(&log)));
        log
    }

    fn lookup(&self, anchor: &str) -> Option<Rc<AnchorLog>> {
        self.anchors
            .borrow()
            .iter()
            .find(|(name, _)| name == anchor)
            .map(|(_, log)| Rc::clone(log))
    }

    /// Anchors in first-bound order.
    #[must_use]
    pub fn anchors(&self) -> Vec<String> {
        self.anchors
            .borrow()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    #[must_use]
    pub fn binds(&self, anchor: &str) -> usize {
        self.lookup(anchor).map_or(0, |log| log.binds.get())
    }

    #[must_use]
    pub fn refreshes(&self, anchor: &str) -> usize {
        self.lookup(anchor).map_or(0, |log| log.refreshes.get())
    }

    /// The latest rendering of `anchor`.
    #[must_use]
    pub fn rendered(&self, anchor: &str) -> Vec<(String, Value)> {
        self.lookup(anchor)
            .map(|log| log.rendered.borrow().clone())
            .unwrap_or_default()
    }

    /// The latest value of one field on `anchor`.
    #[must_use]
    pub fn value(&self, anchor: &str, field: &str) -> Option<Value> {
        self.rendered(anchor)
            .into_iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Drop every live binding. Counts and renderings are kept.
    pub fn unbind_all(&self) {
        self.scopes.borrow_mut().clear();
    }
}

impl<C: FieldCell> BindingEngine<C> for RecordingEngine {
    fn bind(&self, anchor: &str, view_model: Box<dyn ViewModel<C>>) {
        let log = self.log(anchor);
        log.binds.set(log.binds.get() + 1);
        *log.rendered.borrow_mut() = view_model.render();

        let refreshed = Rc::clone(&log);
        let scope = keep_live(view_model, move |view_model| {
            refreshed.refreshes.set(refreshed.refreshes.get() + 1);
            *refreshed.rendered.borrow_mut() = view_model.render();
        });
        self.scopes.borrow_mut().push(scope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ropes::{FieldViewModel, Observable};
    use serde_json::json;

    #[test]
    fn records_binds_and_refreshes() {
        let engine = RecordingEngine::new();
        let name = <Observable<Value> as FieldCell>::create(json!(""));
        let vm = FieldViewModel::new().cell("name", &name);
        BindingEngine::bind(&engine, "#a", vm.boxed());

        assert_eq!(engine.binds("#a"), 1);
        assert_eq!(engine.value("#a", "name"), Some(json!("")));

        name.write(json!("Ada"));
        assert_eq!(engine.refreshes("#a"), 1);
        assert_eq!(engine.value("#a", "name"), Some(json!("Ada")));

        engine.unbind_all();
        name.write(json!("Grace"));
        assert_eq!(engine.refreshes("#a"), 1);
        assert_eq!(engine.binds("#missing"), 0);
    }
}
