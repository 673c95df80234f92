//! Component Pipeline
//!
//! Connects the component engine to render targets.
//!
//! # Data Flow
//!
//! ```text
//! setup → state + render → render effect → tree → reconciler → target
//!              ▲                                                  │
//!              └────────────── state writes (handlers, methods) ◄─┘
//! ```
//!
//! 1. **mount** - Resolves the definition, renders the first tree inside the
//!    component's render effect and patches it into the target.
//! 2. **render effect** - Subscribed to everything the last render read; its
//!    scheduler re-renders on change (see [`Config::auto_update`]).
//! 3. **update / unmount** - Explicit re-render and teardown.

pub mod config;
pub mod mount;

pub use config::{config, reset_config, set_config, update_config, Config};
pub use mount::{
    call_method, hydrate, instance, is_mounted, mount, mounted_count, render_to_string,
    reset_instances, unmount, update,
};
