//! Error type for render-target and runtime operations.
//!
//! Most failures in this crate are deliberately non-fatal (unknown components
//! render a placeholder, invalid props only warn). What remains here are the
//! cases a caller can actually act on.

use thiserror::Error;

/// Errors returned by the reconciler and the component runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A target operation addressed a child that does not exist.
    ///
    /// Usually means the target was mutated behind the reconciler's back,
    /// so the stored tree no longer describes it.
    #[error("child index {index} out of bounds (target has {len} children)")]
    ChildIndexOutOfBounds { index: usize, len: usize },

    /// A child operation was requested on a text node.
    #[error("text nodes cannot have children")]
    NotAnElement,

    /// `call_method` was asked for a method the component does not define.
    #[error("component has no method named `{name}`")]
    MethodNotFound { name: String },

    /// A runtime operation addressed a target with no mounted component.
    #[error("no component is mounted on target {target}")]
    NotMounted { target: String },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
