#![forbid(unsafe_code)]

//! Single-threaded reactive cells.
//!
//! | Type | Role |
//! |------|------|
//! | [`Observable`] | shared value with ordered change callbacks |
//! | [`Subscription`] | guard that keeps one callback registered |
//! | [`FieldCell`] | what a data object field needs: create, read, write, watch |
//! | [`Computed`] | memo over field cells, refreshed on the next read after a write |
//! | [`Binding`] | uncached projection handed to a binding engine |
//! | [`BindingScope`] | the watches keeping one anchor live |
//!
//! Everything here is `Rc`-based and `!Send`. Observables hold their
//! callbacks weakly, so a callback lives exactly as long as its
//! [`Subscription`]. A write of an equal value is ignored: no version bump
//! and no callbacks.

pub mod binding;
pub mod cell;
pub mod computed;
pub mod observable;

pub use binding::{Binding, BindingScope};
pub use cell::{FieldCell, derive};
pub use computed::Computed;
pub use observable::{Observable, Subscription};
