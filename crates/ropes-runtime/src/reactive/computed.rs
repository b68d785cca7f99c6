#![forbid(unsafe_code)]

//! Memoized values derived from field cells.
//!
//! A [`Computed<T>`] reads a fixed list of [`FieldCell`]s through a mapping
//! function. It watches every source; a write to any of them marks the memo
//! stale, and the next read runs the mapping again. Reads between writes are
//! served from the memo.
//!
//! View models use this for display values built from data object fields,
//! such as a formatted circulation figure or a relative date.
//!
//! Guarantees:
//!
//! - a read after a source write never sees the old memo;
//! - the mapping runs at most once per stale period, however many sources
//!   changed;
//! - a write that stores an equal value does not mark the memo stale.
//!
//! If the mapping panics the memo stays stale and the next read tries again.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

use super::cell::FieldCell;
use super::observable::Subscription;

struct Memo<T> {
    map: Box<dyn Fn() -> T>,
    value: Option<T>,
    stale: bool,
    runs: u64,
}

struct Shared<T> {
    memo: RefCell<Memo<T>>,
    /// Keeps the source watches registered for the life of the value.
    _watches: RefCell<Vec<Subscription>>,
}

/// A read-only value derived from field cells.
///
/// Clones share the memo.
pub struct Computed<T> {
    shared: Rc<Shared<T>>,
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Computed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let memo = self.shared.memo.borrow();
        f.debug_struct("Computed")
            .field("value", &memo.value)
            .field("stale", &memo.stale)
            .field("runs", &memo.runs)
            .finish()
    }
}

fn mark_stale<T>(weak: &Weak<Shared<T>>) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    // Busy means the mapping itself is running; its result already reflects
    // the write.
    if let Ok(mut memo) = shared.memo.try_borrow_mut() {
        memo.stale = true;
    }
}

impl<T: Clone + 'static> Computed<T> {
    /// Derive a value from `sources`.
    ///
    /// `map` receives the sources' current values in the order given.
    pub fn from_cells<C: FieldCell>(sources: &[C], map: impl Fn(&[Value]) -> T + 'static) -> Self {
        let cells = sources.to_vec();
        let shared = Rc::new(Shared {
            memo: RefCell::new(Memo {
                map: Box::new(move || {
                    let values: Vec<Value> = cells.iter().map(FieldCell::read).collect();
                    map(&values)
                }),
                value: None,
                stale: true,
                runs: 0,
            }),
            _watches: RefCell::new(Vec::with_capacity(sources.len())),
        });

        let watches: Vec<Subscription> = sources
            .iter()
            .map(|cell| {
                let weak = Rc::downgrade(&shared);
                cell.watch(move |_| mark_stale(&weak))
            })
            .collect();
        *shared._watches.borrow_mut() = watches;

        Self { shared }
    }

    /// Current value, recomputed first if a source changed.
    #[must_use]
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// # Panics
    ///
    /// Panics if `f` reads this same value again.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let mut guard = self.shared.memo.borrow_mut();
        let memo = &mut *guard;
        if memo.stale || memo.value.is_none() {
            memo.value = Some((memo.map)());
            memo.stale = false;
            memo.runs += 1;
        }
        let map = &memo.map;
        f(memo.value.get_or_insert_with(|| map()))
    }

    /// Whether the next read will run the mapping.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.shared.memo.borrow().stale
    }

    /// How many times the mapping has run.
    #[must_use]
    pub fn runs(&self) -> u64 {
        self.shared.memo.borrow().runs
    }
}
