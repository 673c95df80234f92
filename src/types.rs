//! Core types - Values, records and identities.
//!
//! Everything the reactive layer observes is a [`Value`]. Primitives compare
//! by value, [`Record`]s compare by identity: two records holding the same
//! fields are still different owners in the dependency graph.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// Identities
// =============================================================================

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            /// Allocate a fresh, process-unique id.
            pub fn next() -> Self {
                Self(next_id())
            }

            /// Raw numeric value.
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Identity of anything that owns trackable fields (records, computeds).
    OwnerId,
    "owner_"
);
define_id!(
    /// Identity of a registered computation.
    EffectId,
    "effect_"
);
define_id!(
    /// Identity of a mounted component instance.
    InstanceId,
    "comp_"
);
define_id!(
    /// Identity of a node in a render target.
    TargetId,
    "node_"
);

// =============================================================================
// Value
// =============================================================================

/// A dynamically typed value stored in records, props and state.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Record(Record),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Whether this value is a structured (record) value.
    pub fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    /// Truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Record(_) => true,
        }
    }
}

/// Strict equality: primitives by value, records by identity.
///
/// `Int` and `Float` are one numeric domain, and `NaN` is never equal to
/// itself.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Record(r) => write!(f, "Record({})", r.id()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => f.write_str(&format_number(*x)),
            Value::Str(s) => f.write_str(s),
            Value::Record(_) => f.write_str("[object]"),
        }
    }
}

/// Shortest decimal rendering of a number (`3.0` renders as `3`).
pub fn format_number(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{x}")
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value.into())
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

// =============================================================================
// Record
// =============================================================================

struct RecordInner {
    id: OwnerId,
    fields: RefCell<BTreeMap<String, Value>>,
}

/// A structured value: named fields plus a stable identity.
///
/// Cloning clones the handle. Reads and writes through a `Record` are raw:
/// they are never tracked. Wrap it in [`Observable`](crate::reactive::Observable)
/// for dependency tracking.
#[derive(Clone)]
pub struct Record {
    inner: Rc<RecordInner>,
}

impl Record {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RecordInner {
                id: OwnerId::next(),
                fields: RefCell::new(BTreeMap::new()),
            }),
        }
    }

    /// Build a record from `(field, value)` pairs.
    pub fn from_fields<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let record = Self::new();
        {
            let mut map = record.inner.fields.borrow_mut();
            for (k, v) in fields {
                map.insert(k.into(), v.into());
            }
        }
        record
    }

    pub fn id(&self) -> OwnerId {
        self.inner.id
    }

    /// Raw field read. Missing fields read as `None`.
    pub fn get(&self, field: &str) -> Option<Value> {
        self.inner.fields.borrow().get(field).cloned()
    }

    /// Raw field write. Returns the previous value.
    pub fn set(&self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner.fields.borrow_mut().insert(field.into(), value.into())
    }

    /// Raw field removal. Returns the removed value.
    pub fn remove(&self, field: &str) -> Option<Value> {
        self.inner.fields.borrow_mut().remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.inner.fields.borrow().contains_key(field)
    }

    /// Field names in sorted order.
    pub fn field_names(&self) -> Vec<String> {
        self.inner.fields.borrow().keys().cloned().collect()
    }

    /// Snapshot of all fields.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.inner
            .fields
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.fields.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Record) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.inner.id)
            .field("fields", &self.inner.fields.borrow())
            .finish()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_fields(iter)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_equality_is_by_value() {
        assert_eq!(Value::from(1), Value::from(1));
        assert_eq!(Value::from(2), Value::Float(2.0));
        assert_eq!(Value::from("a"), Value::from(String::from("a")));
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    }

    #[test]
    fn test_record_equality_is_by_identity() {
        let a = Record::from_fields([("x", 1)]);
        let b = Record::from_fields([("x", 1)]);
        assert_ne!(Value::from(a.clone()), Value::from(b));
        assert_eq!(Value::from(a.clone()), Value::from(a));
    }

    #[test]
    fn test_record_raw_access() {
        let r = Record::new();
        assert!(r.is_empty());
        assert_eq!(r.set("n", 1), None);
        assert_eq!(r.set("n", 2), Some(Value::from(1)));
        assert_eq!(r.get("n"), Some(Value::from(2)));
        assert_eq!(r.field_names(), vec!["n".to_string()]);
        assert_eq!(r.remove("n"), Some(Value::from(2)));
        assert!(!r.contains("n"));
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::Float(f64::NAN).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::from(Record::new()).is_truthy());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(3.0).to_string(), "3");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::from(7).to_string(), "7");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(OwnerId::next(), OwnerId::next());
        assert!(InstanceId::next().to_string().starts_with("comp_"));
    }
}
