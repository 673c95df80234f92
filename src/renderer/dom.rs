//! In-memory DOM.
//!
//! [`DomNode`] is a small document tree implementing [`RenderTarget`]. It is
//! what components mount into when there is no browser: tests, server-side
//! HTML production, headless hosts. Every node carries a [`TargetId`], so
//! callers can tell a reused node from a recreated one.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::target::RenderTarget;
use crate::error::{Error, Result};
use crate::primitives::{event_attr_name, Event, Handler};
use crate::types::TargetId;

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

enum DomKind {
    Element(String),
    Text(String),
}

struct DomData {
    id: TargetId,
    kind: DomKind,
    attributes: BTreeMap<String, String>,
    properties: BTreeMap<String, Handler>,
    children: Vec<DomNode>,
}

/// Handle to a node of the in-memory DOM.
#[derive(Clone)]
pub struct DomNode(Rc<RefCell<DomData>>);

impl DomNode {
    fn from_kind(kind: DomKind) -> Self {
        Self(Rc::new(RefCell::new(DomData {
            id: TargetId::next(),
            kind,
            attributes: BTreeMap::new(),
            properties: BTreeMap::new(),
            children: Vec::new(),
        })))
    }

    pub fn element(kind: &str) -> Self {
        Self::from_kind(DomKind::Element(kind.to_string()))
    }

    pub fn text(text: &str) -> Self {
        Self::from_kind(DomKind::Text(text.to_string()))
    }

    /// Element tag, `None` for text nodes.
    pub fn tag(&self) -> Option<String> {
        match &self.0.borrow().kind {
            DomKind::Element(kind) => Some(kind.clone()),
            DomKind::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.borrow().kind, DomKind::Text(_))
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let data = self.0.borrow();
        match &data.kind {
            DomKind::Text(text) => text.clone(),
            DomKind::Element(_) => data.children.iter().map(DomNode::text_content).collect(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    pub fn attributes(&self) -> BTreeMap<String, String> {
        self.0.borrow().attributes.clone()
    }

    pub fn property(&self, name: &str) -> Option<Handler> {
        self.0.borrow().properties.get(name).cloned()
    }

    /// Deliver `event` to this node's `on<name>` handler.
    ///
    /// Returns whether a handler was present. The handler runs after the
    /// node is released, so it may freely re-render this node.
    pub fn dispatch(&self, event: &Event) -> bool {
        let handler = self.property(&event_attr_name(&event.name));
        match handler {
            Some(handler) => {
                handler.call(event);
                true
            }
            None => false,
        }
    }

    /// HTML of the children.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.0.borrow().children {
            child.write_html(&mut out);
        }
        out
    }

    /// HTML of this node including its own tag.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let data = self.0.borrow();
        match &data.kind {
            DomKind::Text(text) => out.push_str(&escape_text(text)),
            DomKind::Element(kind) => {
                out.push('<');
                out.push_str(kind);
                for (name, value) in &data.attributes {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&escape_attr(value));
                        out.push('"');
                    }
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&kind.as_str()) {
                    return;
                }
                for child in &data.children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(kind);
                out.push('>');
            }
        }
    }

    fn check_element(&self) -> Result<()> {
        if self.is_text() {
            return Err(Error::NotAnElement);
        }
        Ok(())
    }

    fn out_of_bounds(&self, index: usize) -> Error {
        Error::ChildIndexOutOfBounds {
            index,
            len: self.child_count(),
        }
    }
}

impl RenderTarget for DomNode {
    fn create_element(kind: &str) -> Self {
        DomNode::element(kind)
    }

    fn create_text(text: &str) -> Self {
        DomNode::text(text)
    }

    fn id(&self) -> TargetId {
        self.0.borrow().id
    }

    fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    fn child(&self, index: usize) -> Option<Self> {
        self.0.borrow().children.get(index).cloned()
    }

    fn append_child(&self, child: Self) -> Result<()> {
        self.check_element()?;
        self.0.borrow_mut().children.push(child);
        Ok(())
    }

    fn insert_child(&self, index: usize, child: Self) -> Result<()> {
        self.check_element()?;
        if index > self.child_count() {
            return Err(self.out_of_bounds(index));
        }
        self.0.borrow_mut().children.insert(index, child);
        Ok(())
    }

    fn remove_child(&self, index: usize) -> Result<Self> {
        self.check_element()?;
        if index >= self.child_count() {
            return Err(self.out_of_bounds(index));
        }
        Ok(self.0.borrow_mut().children.remove(index))
    }

    fn replace_child(&self, index: usize, child: Self) -> Result<Self> {
        self.check_element()?;
        if index >= self.child_count() {
            return Err(self.out_of_bounds(index));
        }
        Ok(std::mem::replace(&mut self.0.borrow_mut().children[index], child))
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.0
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, name: &str) {
        self.0.borrow_mut().attributes.remove(name);
    }

    fn set_property(&self, name: &str, handler: Option<Handler>) {
        let mut data = self.0.borrow_mut();
        match handler {
            Some(handler) => {
                data.properties.insert(name.to_string(), handler);
            }
            None => {
                data.properties.remove(name);
            }
        }
    }
}

impl PartialEq for DomNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for DomNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.outer_html())
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_child_operations() {
        let root = DomNode::element("div");
        root.append_child(DomNode::text("a")).unwrap();
        root.append_child(DomNode::text("c")).unwrap();
        root.insert_child(1, DomNode::text("b")).unwrap();
        assert_eq!(root.text_content(), "abc");

        let removed = root.remove_child(0).unwrap();
        assert_eq!(removed.text_content(), "a");

        root.replace_child(1, DomNode::text("z")).unwrap();
        assert_eq!(root.text_content(), "bz");

        root.clear_children().unwrap();
        assert_eq!(root.child_count(), 0);
    }

    #[test]
    fn test_out_of_bounds() {
        let root = DomNode::element("div");
        assert_eq!(
            root.remove_child(0).unwrap_err(),
            Error::ChildIndexOutOfBounds { index: 0, len: 0 }
        );
        assert!(root.insert_child(1, DomNode::text("x")).is_err());
        assert_eq!(root.child_at(3).unwrap_err(), Error::ChildIndexOutOfBounds { index: 3, len: 0 });
    }

    #[test]
    fn test_text_nodes_reject_children() {
        let text = DomNode::text("x");
        assert_eq!(text.append_child(DomNode::text("y")).unwrap_err(), Error::NotAnElement);
    }

    #[test]
    fn test_html_output() {
        let root = DomNode::element("div");
        root.set_attribute("class", "a \"b\"");
        root.set_attribute("hidden", "");
        root.append_child(DomNode::text("1 < 2 & 3")).unwrap();
        root.append_child(DomNode::element("br")).unwrap();

        assert_eq!(
            root.outer_html(),
            "<div class=\"a &quot;b&quot;\" hidden>1 &lt; 2 &amp; 3<br></div>"
        );
        assert_eq!(root.inner_html(), "1 &lt; 2 &amp; 3<br>");
    }

    #[test]
    fn test_dispatch() {
        let button = DomNode::element("button");
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        button.set_property("onclick", Some(Handler::new(move |_| hits_clone.set(hits_clone.get() + 1))));

        assert!(button.dispatch(&Event::new("click")));
        assert!(!button.dispatch(&Event::new("keydown")));
        assert_eq!(hits.get(), 1);

        button.set_property("onclick", None);
        assert!(!button.dispatch(&Event::new("click")));
    }

    #[test]
    fn test_identity() {
        let a = DomNode::element("div");
        let b = DomNode::element("div");
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());
    }
}
