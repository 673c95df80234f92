//! Primitive types - Attribute values and event handlers.
//!
//! Attributes on a [`Node`](super::Node) are plain values (strings, numbers,
//! booleans) or event handlers. Plain values are written to the target as
//! attribute strings; handlers are assigned as properties.

use std::fmt;
use std::rc::Rc;

use crate::types::{format_number, Value};

// =============================================================================
// Events
// =============================================================================

/// An event delivered to a handler by the render target.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Event name without the `on` prefix (e.g. "click").
    pub name: String,
    /// Free-form payload.
    pub detail: Value,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: Value::Null,
        }
    }

    pub fn with_detail(name: impl Into<String>, detail: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            detail: detail.into(),
        }
    }
}

/// Event handler callback.
///
/// Using `Rc<dyn Fn>` lets one handler be shared between the tree that
/// describes it and the target node it is assigned to. Two handlers are
/// equal only if they are the same allocation.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&Event)>);

impl Handler {
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }

    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

/// Attribute name for an event: `"click"` → `"onclick"`.
pub fn event_attr_name(event: &str) -> String {
    format!("on{event}")
}

/// Whether an attribute name denotes an event handler (`on` + event name).
pub fn is_event_attr(name: &str) -> bool {
    name.len() > 2 && name.starts_with("on")
}

// =============================================================================
// Attribute Value
// =============================================================================

/// Value of a node attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Handler(Handler),
}

impl AttrValue {
    /// Falsy values (`""`, `0`, `NaN`, `false`) are not rendered.
    pub fn is_truthy(&self) -> bool {
        match self {
            AttrValue::Text(s) => !s.is_empty(),
            AttrValue::Number(n) => *n != 0.0 && !n.is_nan(),
            AttrValue::Bool(b) => *b,
            AttrValue::Handler(_) => true,
        }
    }

    pub fn is_handler(&self) -> bool {
        matches!(self, AttrValue::Handler(_))
    }

    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            AttrValue::Handler(h) => Some(h),
            _ => None,
        }
    }

    /// String form written to the target. `None` for handlers.
    ///
    /// A `true` boolean renders as the empty string, HTML's boolean
    /// attribute form.
    pub fn render(&self) -> Option<String> {
        match self {
            AttrValue::Text(s) => Some(s.clone()),
            AttrValue::Number(n) => Some(format_number(*n)),
            AttrValue::Bool(true) => Some(String::new()),
            AttrValue::Bool(false) => Some("false".to_string()),
            AttrValue::Handler(_) => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Number(value.into())
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Number(value as f64)
    }
}

impl From<usize> for AttrValue {
    fn from(value: usize) -> Self {
        AttrValue::Number(value as f64)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<Handler> for AttrValue {
    fn from(value: Handler) -> Self {
        AttrValue::Handler(value)
    }
}

impl From<&Value> for AttrValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => AttrValue::Bool(false),
            Value::Bool(b) => AttrValue::Bool(*b),
            Value::Int(n) => AttrValue::Number(*n as f64),
            Value::Float(f) => AttrValue::Number(*f),
            other => AttrValue::Text(other.to_string()),
        }
    }
}

impl From<Value> for AttrValue {
    fn from(value: Value) -> Self {
        AttrValue::from(&value)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_truthiness() {
        assert!(!AttrValue::from("").is_truthy());
        assert!(!AttrValue::from(0).is_truthy());
        assert!(!AttrValue::from(false).is_truthy());
        assert!(!AttrValue::Number(f64::NAN).is_truthy());
        assert!(AttrValue::from("x").is_truthy());
        assert!(AttrValue::from(Handler::new(|_| {})).is_truthy());
    }

    #[test]
    fn test_render() {
        assert_eq!(AttrValue::from(3).render().as_deref(), Some("3"));
        assert_eq!(AttrValue::from(1.5).render().as_deref(), Some("1.5"));
        assert_eq!(AttrValue::from(true).render().as_deref(), Some(""));
        assert_eq!(AttrValue::from(Handler::new(|_| {})).render(), None);
    }

    #[test]
    fn test_handler_identity() {
        let a = Handler::new(|_| {});
        let b = Handler::new(|_| {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_handler_call() {
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        let h = Handler::new(move |e| {
            assert_eq!(e.name, "click");
            hits_clone.set(hits_clone.get() + 1);
        });
        h.call(&Event::new("click"));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_event_attr_names() {
        assert_eq!(event_attr_name("click"), "onclick");
        assert!(is_event_attr("onclick"));
        assert!(!is_event_attr("on"));
        assert!(!is_event_attr("class"));
    }
}
