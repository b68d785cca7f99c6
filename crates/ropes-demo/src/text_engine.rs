//! Renders bound anchors as plain text.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use ropes::{BindingEngine, BindingScope, FieldCell, ViewModel, keep_live};
use serde_json::Value;

use crate::format::display;

type Panel = Rc<RefCell<Vec<(String, Value)>>>;

/// Keeps the latest rendering of every anchor.
#[derive(Debug, Default)]
pub struct TextEngine {
    panels: RefCell<Vec<(String, Panel)>>,
    scopes: RefCell<Vec<BindingScope>>,
}

impl TextEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every anchor with its fields, one `key: value` per line.
    #[must_use]
    pub fn snapshot(&self) -> String {
        let mut out = String::new();
        for (anchor, panel) in self.panels.borrow().iter() {
            let _ = writeln!(out, "{anchor}");
            let panel = panel.borrow();
            let width = panel.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
            for (key, value) in panel.iter() {
                let _ = writeln!(out, "  {key:<width$}  {}", display(value));
            }
        }
        out
    }
}

impl<C: FieldCell> BindingEngine<C> for TextEngine {
    fn bind(&self, anchor: &str, view_model: Box<dyn ViewModel<C>>) {
        let panel: Panel = Rc::new(RefCell::new(view_model.render()));
        self.panels
            .borrow_mut()
            .push((anchor.to_string(), Rc::clone(&panel)));

        let scope = keep_live(view_model, move |view_model| {
            *panel.borrow_mut() = view_model.render();
        });
        self.scopes.borrow_mut().push(scope);
        tracing::debug!(anchor, "demo.bind");
    }
}
