//! Watchers - Callbacks on value change.
//!
//! [`watch`] compares with `PartialEq`, which for [`Value`] is value equality
//! on primitives and identity on records. A field changed inside a record
//! that was not itself replaced does not fire.
//!
//! [`deep_watch`] subscribes to every field of a record tree instead.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::effect::{effect, untracked, Effect};
use super::observable::Observable;
use crate::types::{Record, Value};

/// Call `callback(new, old)` whenever `getter()` yields a different value.
///
/// The initial value is read without tracking; the returned effect owns the
/// subscription and can be disposed to stop watching.
pub fn watch<T, G, C>(getter: G, mut callback: C) -> Effect
where
    T: PartialEq + 'static,
    G: Fn() -> T + 'static,
    C: FnMut(&T, &T) + 'static,
{
    let old = RefCell::new(untracked(&getter));
    effect(move || {
        let new = getter();
        let mut old = old.borrow_mut();
        if new != *old {
            callback(&new, &old);
            *old = new;
        }
    })
}

/// Callback type for [`deep_watch`]: the record and the field that was written.
pub type DeepWatchCallback = Rc<dyn Fn(&Record, &str)>;

/// Watch every field of `record` and, recursively, of each nested record.
///
/// The callback fires after each write that changes a field. Fields added
/// after registration are not watched. Returns one effect per watched field.
pub fn deep_watch(record: &Record, callback: impl Fn(&Record, &str) + 'static) -> Vec<Effect> {
    let callback: DeepWatchCallback = Rc::new(callback);
    let mut effects = Vec::new();
    let mut visited = Vec::new();
    traverse(record, &callback, &mut effects, &mut visited);
    effects
}

fn traverse(
    record: &Record,
    callback: &DeepWatchCallback,
    effects: &mut Vec<Effect>,
    visited: &mut Vec<Record>,
) {
    // Cycles through shared records are cut at the second visit.
    if visited.iter().any(|r| r.ptr_eq(record)) {
        return;
    }
    visited.push(record.clone());

    for (field, value) in record.entries() {
        let observable = Observable::new(record.clone());
        let notify = callback.clone();
        let first = Cell::new(true);
        let field_name = field.clone();
        effects.push(effect(move || {
            observable.get(&field_name);
            if !first.replace(false) {
                notify(observable.record(), &field_name);
            }
        }));

        if let Value::Record(nested) = value {
            traverse(&nested, callback, effects, visited);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
