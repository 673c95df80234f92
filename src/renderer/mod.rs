//! Renderer - Applies tree diffs to a render target.
//!
//! - [`RenderTarget`] - The node-level operations a host must provide.
//! - [`DomNode`] - In-memory target used for tests and HTML output.
//! - [`diff`] - The reconciler.

pub mod diff;
mod dom;
mod target;

pub use diff::{changed, create_node, patch, Mutations, PatchStats, Reconciler};
pub use dom::DomNode;
pub use target::RenderTarget;
