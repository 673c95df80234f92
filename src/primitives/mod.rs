//! Primitives - The tree description returned by render functions.
//!
//! - [`Node`] / [`Element`] - Text and composite nodes.
//! - [`h`] - Terse element constructor.
//! - [`AttrValue`] / [`Handler`] - Attribute values and event handlers.
//!
//! Trees are plain data. They never touch a render target; the
//! [`renderer`](crate::renderer) turns pairs of them into target mutations.

mod node;
mod types;

pub use node::*;
pub use types::*;
