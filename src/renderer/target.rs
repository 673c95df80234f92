//! Render target - What the reconciler mutates.
//!
//! The reconciler never looks inside a target beyond this trait. Anything
//! that can hold an ordered list of children and named attributes can be
//! driven by it: the in-memory [`DomNode`](super::DomNode), a browser DOM
//! binding, a native widget tree.

use crate::error::{Error, Result};
use crate::primitives::Handler;
use crate::types::TargetId;

/// A live node the reconciler can create and mutate.
///
/// Handles are cheap to clone and clones refer to the same node.
pub trait RenderTarget: Clone + 'static {
    /// Create a detached element node.
    fn create_element(kind: &str) -> Self;

    /// Create a detached text node.
    fn create_text(text: &str) -> Self;

    /// Stable identity of this node.
    fn id(&self) -> TargetId;

    fn child_count(&self) -> usize;

    fn child(&self, index: usize) -> Option<Self>;

    fn append_child(&self, child: Self) -> Result<()>;

    /// Insert so that `child` ends up at `index`. `index == child_count()`
    /// appends.
    fn insert_child(&self, index: usize, child: Self) -> Result<()>;

    /// Remove and return the child at `index`.
    fn remove_child(&self, index: usize) -> Result<Self>;

    /// Put `child` at `index`, returning the node it replaced.
    fn replace_child(&self, index: usize, child: Self) -> Result<Self>;

    fn set_attribute(&self, name: &str, value: &str);

    fn remove_attribute(&self, name: &str);

    /// Assign (or clear, with `None`) a handler property such as `onclick`.
    fn set_property(&self, name: &str, handler: Option<Handler>);

    /// Remove every child.
    fn clear_children(&self) -> Result<()> {
        while self.child_count() > 0 {
            self.remove_child(self.child_count() - 1)?;
        }
        Ok(())
    }

    /// Child at `index`, or an out-of-bounds error.
    fn child_at(&self, index: usize) -> Result<Self> {
        self.child(index).ok_or(Error::ChildIndexOutOfBounds {
            index,
            len: self.child_count(),
        })
    }

    fn children(&self) -> Vec<Self> {
        (0..self.child_count()).filter_map(|i| self.child(i)).collect()
    }
}
