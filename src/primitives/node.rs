//! Tree Model - The node description diffed between renders.
//!
//! A render function returns a [`Node`]. The same type is used for the
//! previous and the next snapshot; the reconciler compares the two.
//!
//! # Example
//!
//! ```
//! use spark_dom::primitives::{h, Element, Node};
//!
//! let list = h("ul", [("class", "todo")], [
//!     Element::new("li").attr("key", "a").child("Milk").build(),
//!     Element::new("li").attr("key", "b").child("Eggs").build(),
//! ]);
//! assert_eq!(list.children().len(), 2);
//! assert_eq!(list.children()[0].key().as_deref(), Some("a"));
//!
//! let text: Node = "hello".into();
//! assert!(text.is_text());
//! ```

use std::collections::BTreeMap;

use super::types::{event_attr_name, AttrValue, Event, Handler};
use crate::types::{format_number, Value};

/// Attribute used to match children across renders.
pub const KEY_ATTR: &str = "key";

// =============================================================================
// Node
// =============================================================================

/// A node in a UI tree: text, or an element with attributes and children.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Text(String),
    Element(Element),
}

/// Composite node.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Element {
    /// Element kind ("div", "span", ...).
    pub kind: String,
    pub attrs: BTreeMap<String, AttrValue>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// Start building an element.
    pub fn element(kind: impl Into<String>) -> Element {
        Element::new(kind)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s),
            Node::Element(_) => None,
        }
    }

    /// Element kind, `None` for text.
    pub fn kind(&self) -> Option<&str> {
        self.as_element().map(|el| el.kind.as_str())
    }

    /// The child-matching key, if this is an element that declares one.
    pub fn key(&self) -> Option<String> {
        self.as_element()?.attrs.get(KEY_ATTR)?.render()
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.as_element()?.attrs.get(name)
    }

    /// Children of an element; text nodes have none.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(el) => &el.children,
            Node::Text(_) => &[],
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(s) => out.push_str(s),
            Node::Element(el) => el.children.iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// Total number of nodes in this tree.
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(Node::size).sum::<usize>()
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Text(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Text(s)
    }
}

impl From<&String> for Node {
    fn from(s: &String) -> Self {
        Node::Text(s.clone())
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Text(n.to_string())
    }
}

impl From<i32> for Node {
    fn from(n: i32) -> Self {
        Node::Text(n.to_string())
    }
}

impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Node::Text(format_number(n))
    }
}

impl From<&Value> for Node {
    fn from(v: &Value) -> Self {
        Node::Text(v.to_string())
    }
}

impl From<Value> for Node {
    fn from(v: Value) -> Self {
        Node::Text(v.to_string())
    }
}

// =============================================================================
// Element builder
// =============================================================================

impl Element {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set the child-matching key.
    pub fn key(self, key: impl Into<AttrValue>) -> Self {
        self.attr(KEY_ATTR, key)
    }

    /// Attach an event handler (`on("click", ..)` sets `onclick`).
    pub fn on(self, event: &str, f: impl Fn(&Event) + 'static) -> Self {
        self.attr(event_attr_name(event), Handler::new(f))
    }

    /// Attach an existing handler.
    pub fn on_handler(self, event: &str, handler: Handler) -> Self {
        self.attr(event_attr_name(event), handler)
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<N: Into<Node>>(mut self, children: impl IntoIterator<Item = N>) -> Self {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Node {
        Node::Element(self)
    }
}

/// Construct an element node.
///
/// Pure: no validation, and empty attribute or child lists are simply empty.
pub fn h<K, V, N>(
    kind: impl Into<String>,
    attrs: impl IntoIterator<Item = (K, V)>,
    children: impl IntoIterator<Item = N>,
) -> Node
where
    K: Into<String>,
    V: Into<AttrValue>,
    N: Into<Node>,
{
    Node::Element(Element {
        kind: kind.into(),
        attrs: attrs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        children: children.into_iter().map(Into::into).collect(),
    })
}

/// Empty attribute list for [`h`].
pub fn no_attrs() -> [(&'static str, AttrValue); 0] {
    []
}

/// Empty child list for [`h`].
pub fn no_children() -> [Node; 0] {
    []
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_h_normalizes_empty() {
        let node = h("div", no_attrs(), no_children());
        let el = node.as_element().unwrap();
        assert_eq!(el.kind, "div");
        assert!(el.attrs.is_empty());
        assert!(el.children.is_empty());
    }

    #[test]
    fn test_builder_matches_h() {
        let a = h("span", [("class", "x")], ["hi"]);
        let b: Node = Element::new("span").attr("class", "x").child("hi").into();
        assert_eq!(a, b);
    }

    #[test]
    fn test_key() {
        let keyed: Node = Element::new("li").key("a").into();
        let numeric: Node = Element::new("li").key(7).into();
        assert_eq!(keyed.key().as_deref(), Some("a"));
        assert_eq!(numeric.key().as_deref(), Some("7"));
        assert_eq!(Node::text("a").key(), None);
    }

    #[test]
    fn test_on_stores_event_attr() {
        let node: Node = Element::new("button").on("click", |_| {}).into();
        assert!(node.attr("onclick").unwrap().is_handler());
    }

    #[test]
    fn test_text_content_and_size() {
        let node = h(
            "p",
            no_attrs(),
            [Node::text("a"), h("b", no_attrs(), ["b"]), Node::from(3)],
        );
        assert_eq!(node.text_content(), "ab3");
        assert_eq!(node.size(), 5);
    }
}
