//! # spark-dom
//!
//! Reactive DOM UI Framework for Rust.
//!
//! Fine-grained dependency tracking drives a virtual-DOM reconciler: a
//! component's render function reads observable state, and every write to
//! that state re-renders the component and patches the difference into its
//! render target.
//!
//! ## Architecture
//!
//! ```text
//! Observable state ──► render effect ──► Node tree ──► Reconciler ──► RenderTarget
//!        ▲                                                              │
//!        └──────────────────── event handlers / methods ◄──────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Values, records and identities
//! - [`reactive`] - Dependency graph, effects, observables, computed, watch
//! - [`primitives`] - The tree description (`Node`, `h`, attributes, events)
//! - [`renderer`] - Render targets, the in-memory DOM and the reconciler
//! - [`engine`] - Component definitions, registry, lifecycle, instances
//! - [`pipeline`] - mount / update / unmount and runtime configuration

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod primitives;
pub mod reactive;
pub mod renderer;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{Error, Result};

pub use reactive::{
    batch, computed, deep_watch, effect, effect_with, make_observable, untracked, watch,
    Computed, Effect, EffectOptions, Observable, Observed,
};

pub use primitives::{h, no_attrs, no_children, AttrValue, Element, Event, Handler, Node};

pub use renderer::{changed, patch, DomNode, Mutations, PatchStats, Reconciler, RenderTarget};

pub use engine::{
    component_names, define_component, get_component, is_registered, on_before_mount,
    on_before_unmount, on_before_update, on_mount, on_unmount, on_update, reset_registry,
    ComponentContext, ComponentDef, ComponentInstance, ComponentState, Contribution,
    LifecyclePhase, Props,
};

pub use pipeline::{
    call_method, config, hydrate, instance, mount, render_to_string, reset_config,
    reset_instances, set_config, unmount, update, update_config, Config,
};
