//! Component Engine - Definitions, registry, instances and lifecycle.
//!
//! - [`component`] - `ComponentDef`, `Contribution` and the merge rules.
//! - [`registry`] - Thread-local name → definition map.
//! - [`lifecycle`] - Hook phases and setup-time registration.
//! - [`instance`] - Per-mount component state.
//!
//! # Lifecycle
//!
//! ```text
//! registered → Mounting → Mounted ⇄ Updating → Unmounting → Unmounted
//! ```
//!
//! Driving an instance through these states is the job of
//! [`pipeline::mount`](crate::pipeline::mount).

pub mod component;
pub mod instance;
pub mod lifecycle;
mod registry;

pub use component::{
    ComponentContext, ComponentDef, Contribution, Method, PropValidator, Props, RenderFn, SetupFn,
};
pub use instance::{ComponentInstance, ComponentState};
pub use lifecycle::{
    in_setup, on_before_mount, on_before_unmount, on_before_update, on_mount, on_unmount,
    on_update, Hook, LifecycleHooks, LifecyclePhase, SetupScope,
};
pub use registry::*;
