//! Reactivity - Dependency tracking for observable state.
//!
//! # Architecture
//!
//! ```text
//! Observable::get ──► track(owner, field) ──► graph: owner → field → [Effect]
//! Observable::set ──► trigger(owner, field) ──► Effect::notify ──► run / scheduler
//! ```
//!
//! - [`graph`] - The (owner, field) → dependents map.
//! - [`effect`] - Computations, the active-computation stack, `batch`.
//! - [`observable`] - Tracked views over records.
//! - [`computed`] - Pull-based cached derivations.
//! - [`watch`] - Change callbacks.
//!
//! Everything here is synchronous and thread-local: a write returns only
//! after every dependent it triggered has finished.

pub mod computed;
pub mod effect;
pub mod graph;
pub mod observable;
pub mod watch;

pub use computed::{computed, Computed};
pub use effect::{
    active_effect, batch, effect, effect_with, is_batching, untracked, Effect, EffectOptions,
    Scheduler,
};
pub use graph::{dependent_count, has_dependents, track, trigger};
pub use observable::{make_observable, Observable, Observed};
pub use watch::{deep_watch, watch, DeepWatchCallback};
