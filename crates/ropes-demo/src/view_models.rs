//! The two quick-stats panels.
//!
//! `ContactQuickStats` shows a subset of the contact plus the outlet's name;
//! `OutletQuickStats` shows the outlet with its circulation formatted. Both
//! read fields straight from the registry and derive the rest.

use std::rc::Rc;

use chrono::{DateTime, Utc};
use ropes::{
    Binding, Computed, FnFactory, Observable, Registry, Result, ViewModel, derive, factory,
};
use serde_json::Value;

use crate::format::{format_thousands, time_ago, to_number};

/// Source of "now" for relative dates.
pub type Clock = Rc<dyn Fn() -> DateTime<Utc>>;

#[must_use]
pub fn system_clock() -> Clock {
    Rc::new(Utc::now)
}

type Cell = Observable<Value>;

pub struct ContactQuickStats {
    name: Cell,
    phone: Cell,
    email: Cell,
    date_of_birth: Cell,
    born_ago: Computed<String>,
    outlet_name: Cell,
}

impl ContactQuickStats {
    pub const DEPENDENCIES: [&'static str; 2] = ["contact", "outlet"];

    pub fn new(registry: &Registry, clock: Clock) -> Result<Self> {
        let date_of_birth = registry.field("contact", "date_of_birth")?;
        let born_ago = derive(&[date_of_birth.clone()], move |values| {
            values[0]
                .as_str()
                .map(|raw| time_ago(raw, clock()))
                .unwrap_or_default()
        });
        Ok(Self {
            name: registry.field("contact", "name")?,
            phone: registry.field("contact", "phone")?,
            email: registry.field("contact", "email")?,
            date_of_birth,
            born_ago,
            outlet_name: registry.field("outlet", "name")?,
        })
    }

    #[must_use]
    pub fn born_ago(&self) -> String {
        self.born_ago.get()
    }

    pub fn factory(clock: Clock) -> FnFactory<impl Fn(&Registry) -> Result<Box<dyn ViewModel>>> {
        factory(Self::DEPENDENCIES, move |registry: &Registry| {
            let view_model: Box<dyn ViewModel> = Box::new(Self::new(registry, Rc::clone(&clock))?);
            Ok(view_model)
        })
    }
}

impl ViewModel for ContactQuickStats {
    fn fields(&self) -> Vec<(String, Binding<Value>)> {
        vec![
            ("name".to_string(), Binding::cell(&self.name)),
            ("phone".to_string(), Binding::cell(&self.phone)),
            ("email".to_string(), Binding::cell(&self.email)),
            ("born_ago".to_string(), Binding::computed(&self.born_ago)),
            ("outlet_name".to_string(), Binding::cell(&self.outlet_name)),
        ]
    }

    fn sources(&self) -> Vec<Cell> {
        vec![
            self.name.clone(),
            self.phone.clone(),
            self.email.clone(),
            self.date_of_birth.clone(),
            self.outlet_name.clone(),
        ]
    }
}

pub struct OutletQuickStats {
    name: Cell,
    circulation_raw: Cell,
    circulation: Computed<String>,
}

impl OutletQuickStats {
    pub const DEPENDENCIES: [&'static str; 1] = ["outlet"];

    pub fn new(registry: &Registry) -> Result<Self> {
        let circulation_raw = registry.field("outlet", "circulation")?;
        let circulation = derive(&[circulation_raw.clone()], |values| {
            to_number(&values[0]).map(format_thousands).unwrap_or_default()
        });
        Ok(Self {
            name: registry.field("outlet", "name")?,
            circulation_raw,
            circulation,
        })
    }

    #[must_use]
    pub fn circulation(&self) -> String {
        self.circulation.get()
    }

    pub fn factory() -> FnFactory<impl Fn(&Registry) -> Result<Box<dyn ViewModel>>> {
        factory(Self::DEPENDENCIES, |registry: &Registry| {
            let view_model: Box<dyn ViewModel> = Box::new(Self::new(registry)?);
            Ok(view_model)
        })
    }
}

impl ViewModel for OutletQuickStats {
    fn fields(&self) -> Vec<(String, Binding<Value>)> {
        vec![
            ("name".to_string(), Binding::cell(&self.name)),
            ("circulation".to_string(), Binding::computed(&self.circulation)),
        ]
    }

    fn sources(&self) -> Vec<Cell> {
        vec![self.name.clone(), self.circulation_raw.clone()]
    }
}
