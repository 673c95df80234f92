//! Lazily cached derived values.
//!
//! # Design
//!
//! [`Computed<T>`] is pull-based. A write to any dependency only marks the
//! cached value dirty; the getter runs again on the next [`get`], never at
//! trigger time. A computed that nobody reads costs nothing after its
//! dependencies change.
//!
//! A computed is itself trackable. An effect that reads it is notified when
//! it turns dirty, and pulls the fresh value on its re-run.
//!
//! # Invariants
//!
//! 1. `get()` never returns a value computed before the latest dependency
//!    write.
//! 2. The getter runs at most once per dirty cycle.
//! 3. If the getter panics, the computed stays dirty and the next `get()`
//!    retries.
//!
//! [`get`]: Computed::get

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::effect::{effect_with, Effect, EffectOptions};
use super::graph::{track, trigger};
use crate::types::OwnerId;

/// Field name under which readers of a computed are tracked.
const VALUE_FIELD: &str = "value";

struct ComputedInner<T> {
    owner: OwnerId,
    getter: Box<dyn Fn() -> T>,
    cached: RefCell<Option<T>>,
    dirty: Cell<bool>,
    version: Cell<u64>,
}

/// A lazily evaluated, memoized value derived from observable state.
///
/// Cloning creates a new handle to the same cache.
pub struct Computed<T> {
    inner: Rc<ComputedInner<T>>,
    effect: Effect,
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            effect: self.effect.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Computed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computed")
            .field("cached", &self.inner.cached.borrow())
            .field("dirty", &self.inner.dirty.get())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

/// Create a computed value from `getter`. Nothing runs until the first read.
pub fn computed<T: Clone + 'static>(getter: impl Fn() -> T + 'static) -> Computed<T> {
    let inner = Rc::new(ComputedInner {
        owner: OwnerId::next(),
        getter: Box::new(getter),
        cached: RefCell::new(None),
        dirty: Cell::new(true),
        version: Cell::new(0),
    });

    let weak = Rc::downgrade(&inner);
    let effect = effect_with(
        EffectOptions {
            lazy: true,
            scheduler: Some(Rc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    mark(&inner);
                }
            })),
        },
        || {},
    );

    Computed { inner, effect }
}

fn mark<T>(inner: &ComputedInner<T>) {
    if !inner.dirty.replace(true) {
        trigger(inner.owner, VALUE_FIELD);
    }
}

impl<T: Clone + 'static> Computed<T> {
    /// Current value, recomputing first if a dependency changed.
    pub fn get(&self) -> T {
        track(self.inner.owner, VALUE_FIELD);

        if !self.inner.dirty.get() {
            if let Some(value) = self.inner.cached.borrow().as_ref() {
                return value.clone();
            }
        }

        let value = self.effect.track_in(|| (self.inner.getter)());
        *self.inner.cached.borrow_mut() = Some(value.clone());
        self.inner.dirty.set(false);
        self.inner.version.set(self.inner.version.get() + 1);
        value
    }

    /// Force the next read to recompute, and notify readers.
    pub fn mark_dirty(&self) {
        mark(&self.inner);
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.get()
    }

    /// Number of times the getter has completed.
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Stop following dependencies. The last cached value stays readable.
    pub fn dispose(&self) {
        self.effect.dispose();
    }
}

// =============================================================================
// Tests
// =============================================================================
