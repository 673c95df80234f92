//! Observable records.
//!
//! An [`Observable`] is a tracking view over a [`Record`]. Reads through it
//! subscribe the active computation to (record identity, field); writes
//! through it notify exactly the dependents of that pair, and only when the
//! stored value actually changes.
//!
//! Tracking is shallow. A field holding another record is returned as the
//! raw record: writes inside it are invisible to readers of the outer field
//! unless the outer field itself is replaced with a different record.

use std::fmt;

use super::graph::{track, trigger};
use crate::types::{OwnerId, Record, Value};

/// A record wrapped for dependency tracking.
///
/// Cloning yields another view of the same record.
#[derive(Clone)]
pub struct Observable {
    record: Record,
}

impl Observable {
    pub fn new(record: Record) -> Self {
        Self { record }
    }

    /// Build an observable over a fresh record.
    pub fn from_fields<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::new(Record::from_fields(fields))
    }

    pub fn id(&self) -> OwnerId {
        self.record.id()
    }

    /// The wrapped record. Access through it is not tracked.
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Tracked read. Missing fields read as [`Value::Null`].
    pub fn get(&self, field: &str) -> Value {
        track(self.record.id(), field);
        self.record.get(field).unwrap_or_default()
    }

    /// Tracked presence check.
    pub fn has(&self, field: &str) -> bool {
        track(self.record.id(), field);
        self.record.contains(field)
    }

    /// Write a field, notifying dependents when the value changed.
    ///
    /// The write lands before dependents run, so they observe the new value.
    /// Returns whether dependents were notified.
    pub fn set(&self, field: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        let changed = match self.record.get(field) {
            Some(old) => old != value,
            None => true,
        };
        if !changed {
            return false;
        }
        self.record.set(field, value);
        trigger(self.record.id(), field);
        true
    }

    /// Read-modify-write of a single field.
    pub fn update(&self, field: &str, f: impl FnOnce(&Value) -> Value) -> bool {
        let current = self.get(field);
        self.set(field, f(&current))
    }
}

impl fmt::Debug for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Observable").field(&self.record).finish()
    }
}

impl From<Record> for Observable {
    fn from(record: Record) -> Self {
        Self::new(record)
    }
}

/// Result of [`make_observable`].
#[derive(Debug, Clone)]
pub enum Observed {
    /// A structured value, now tracked.
    Object(Observable),
    /// A primitive, returned unchanged.
    Plain(Value),
}

impl Observed {
    pub fn as_observable(&self) -> Option<&Observable> {
        match self {
            Observed::Object(o) => Some(o),
            Observed::Plain(_) => None,
        }
    }

    pub fn into_observable(self) -> Option<Observable> {
        match self {
            Observed::Object(o) => Some(o),
            Observed::Plain(_) => None,
        }
    }
}

/// Wrap a structured value for tracking; primitives pass through.
///
/// Only the outer record is wrapped.
pub fn make_observable(value: Value) -> Observed {
    match value {
        Value::Record(record) => Observed::Object(Observable::new(record)),
        other => Observed::Plain(other),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::effect::effect;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn test_primitives_pass_through() {
        match make_observable(Value::from(3)) {
            Observed::Plain(v) => assert_eq!(v, Value::from(3)),
            Observed::Object(_) => panic!("primitive was wrapped"),
        }
        assert!(make_observable(Value::from(Record::new())).as_observable().is_some());
    }

    #[test]
    fn test_write_reruns_reader_once() {
        let state = Observable::from_fields([("n", 0)]);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let state_clone = state.clone();
        let seen_clone = seen.clone();
        let e = effect(move || {
            let n = state_clone.get("n");
            let _again = state_clone.get("n");
            seen_clone.borrow_mut().push(n);
        });

        assert!(state.set("n", 1));
        assert_eq!(e.run_count(), 2);
        assert_eq!(*seen.borrow(), vec![Value::from(0), Value::from(1)]);
    }

    #[test]
    fn test_same_value_does_not_trigger() {
        let state = Observable::from_fields([("n", 5)]);
        let state_clone = state.clone();
        let e = effect(move || {
            state_clone.get("n");
        });

        assert!(!state.set("n", 5));
        assert_eq!(e.run_count(), 1);
    }

    #[test]
    fn test_new_field_triggers_readers_of_missing_field() {
        let state = Observable::new(Record::new());
        let state_clone = state.clone();
        let e = effect(move || {
            state_clone.has("late");
        });

        state.set("late", Value::Null);
        assert_eq!(e.run_count(), 2);
    }

    #[test]
    fn test_nested_record_is_shallow() {
        let inner = Record::from_fields([("x", 1)]);
        let outer = Observable::from_fields([("inner", inner.clone())]);

        let outer_clone = outer.clone();
        let e = effect(move || {
            outer_clone.get("inner");
        });

        // Mutation inside the nested record is not seen.
        inner.set("x", 2);
        assert_eq!(e.run_count(), 1);

        // Replacing the outer field with the same record is not a change.
        outer.set("inner", inner);
        assert_eq!(e.run_count(), 1);

        // A different record is.
        outer.set("inner", Record::new());
        assert_eq!(e.run_count(), 2);
    }

    #[test]
    fn test_views_share_identity() {
        let record = Record::new();
        let a = Observable::new(record.clone());
        let b = Observable::from(record);

        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        let a_clone = a.clone();
        effect(move || {
            a_clone.get("k");
            hits_clone.set(hits_clone.get() + 1);
        });

        b.set("k", "v");
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_update() {
        let state = Observable::from_fields([("n", 1)]);
        state.update("n", |v| Value::from(v.as_int().unwrap_or(0) + 1));
        assert_eq!(state.get("n"), Value::from(2));
    }
}
