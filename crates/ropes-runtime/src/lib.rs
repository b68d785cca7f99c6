#![forbid(unsafe_code)]

//! Reactive runtime for Ropes.
//!
//! Data objects store their fields in [`FieldCell`]s, view models derive
//! display values with [`Computed`] and [`Binding`], and binding engines keep
//! their subscriptions alive in a [`BindingScope`].

pub mod reactive;

pub use reactive::{
    Binding, BindingScope, Computed, FieldCell, Observable, Subscription, derive,
};
