//! Effects - Re-runnable computations and the active-computation stack.
//!
//! An effect runs its body once at registration. Every observable field the
//! body reads while it is on top of the stack becomes a dependency; writing
//! one of those fields later re-runs the body inline, before the write
//! returns.
//!
//! # Tracking Context
//!
//! The "currently listening" computation is the top of a per-thread stack,
//! so nested effects (an effect created inside another effect's body) track
//! into themselves and hand tracking back to the outer effect when they
//! return. [`untracked`] pushes an empty frame to read without subscribing.
//!
//! # Batching
//!
//! [`batch`] defers dependents triggered inside its closure and runs each of
//! them once when the outermost batch returns. Nothing is carried across
//! calls: a batch is flushed before `batch` itself returns.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::graph;
use crate::types::{EffectId, OwnerId};

/// Called on trigger instead of re-running the effect body.
pub type Scheduler = Rc<dyn Fn()>;

// =============================================================================
// Effect State
// =============================================================================

thread_local! {
    /// Active computation stack. `None` frames come from `untracked`.
    static EFFECT_STACK: RefCell<Vec<Option<Effect>>> = const { RefCell::new(Vec::new()) };

    /// Nesting depth of `batch` calls.
    static BATCH_DEPTH: Cell<usize> = const { Cell::new(0) };

    /// Effects triggered while batching, in trigger order, without duplicates.
    static PENDING: RefCell<Vec<Effect>> = const { RefCell::new(Vec::new()) };
}

struct EffectInner {
    id: EffectId,
    body: RefCell<Box<dyn FnMut()>>,
    scheduler: Option<Scheduler>,
    /// Every (owner, field) pair this effect joined, for disposal.
    deps: RefCell<Vec<(OwnerId, String)>>,
    disposed: Cell<bool>,
    runs: Cell<u64>,
}

/// Options for [`effect_with`].
#[derive(Clone, Default)]
pub struct EffectOptions {
    /// Skip the initial run at registration.
    pub lazy: bool,
    /// Run this on trigger instead of the effect body.
    pub scheduler: Option<Scheduler>,
}

impl fmt::Debug for EffectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectOptions")
            .field("lazy", &self.lazy)
            .field("scheduler", &self.scheduler.is_some())
            .finish()
    }
}

// =============================================================================
// Effect Handle
// =============================================================================

/// Handle to a registered computation.
///
/// Cloning yields another handle to the same computation. The computation
/// stays registered in every dependency set it joined until [`dispose`]
/// is called, regardless of how many handles exist.
///
/// [`dispose`]: Effect::dispose
#[derive(Clone)]
pub struct Effect {
    inner: Rc<EffectInner>,
}

impl Effect {
    fn new(options: EffectOptions, body: Box<dyn FnMut()>) -> Self {
        Self {
            inner: Rc::new(EffectInner {
                id: EffectId::next(),
                body: RefCell::new(body),
                scheduler: options.scheduler,
                deps: RefCell::new(Vec::new()),
                disposed: Cell::new(false),
                runs: Cell::new(0),
            }),
        }
    }

    pub fn id(&self) -> EffectId {
        self.inner.id
    }

    /// Number of times the body has run.
    pub fn run_count(&self) -> u64 {
        self.inner.runs.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Whether the body is executing right now.
    pub fn is_running(&self) -> bool {
        self.inner.body.try_borrow_mut().is_err()
    }

    /// Re-run the body with this effect as the active computation.
    ///
    /// A body that is already executing is not re-entered: a write it makes
    /// to one of its own dependencies does not recurse into itself.
    pub fn run(&self) {
        if self.is_disposed() {
            return;
        }
        let Ok(mut body) = self.inner.body.try_borrow_mut() else {
            tracing::trace!(effect = %self.id(), "effect already running, skipping re-entry");
            return;
        };
        self.inner.runs.set(self.inner.runs.get() + 1);
        let _frame = StackFrame::push(Some(self.clone()));
        (*body)();
    }

    /// Evaluate `f` with this effect as the active computation.
    ///
    /// Reads inside `f` subscribe this effect exactly as if they happened in
    /// its body. Used by derived values and render effects that own their
    /// evaluation instead of storing it as the body.
    pub fn track_in<R>(&self, f: impl FnOnce() -> R) -> R {
        let _frame = StackFrame::push(Some(self.clone()));
        f()
    }

    /// Remove this computation from every dependency set it joined.
    ///
    /// A disposed effect never runs again.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        let deps = std::mem::take(&mut *self.inner.deps.borrow_mut());
        for (owner, field) in &deps {
            graph::remove_dependent(*owner, field, self.id());
        }
        PENDING.with(|pending| pending.borrow_mut().retain(|e| e.id() != self.id()));
        tracing::trace!(effect = %self.id(), deps = deps.len(), "effect disposed");
    }

    /// Called by the graph when a dependency was written.
    pub(crate) fn notify(&self) {
        if self.is_disposed() {
            return;
        }
        if BATCH_DEPTH.with(Cell::get) > 0 {
            PENDING.with(|pending| {
                let mut pending = pending.borrow_mut();
                if !pending.iter().any(|e| e.id() == self.id()) {
                    pending.push(self.clone());
                }
            });
            return;
        }
        self.fire();
    }

    fn fire(&self) {
        match &self.inner.scheduler {
            Some(scheduler) => scheduler(),
            None => self.run(),
        }
    }

    /// Record that this effect joined the dependency set of (owner, field).
    pub(crate) fn record_dependency(&self, owner: OwnerId, field: &str) {
        self.inner.deps.borrow_mut().push((owner, field.to_string()));
    }

    /// Number of (owner, field) pairs this effect depends on.
    pub fn dependency_count(&self) -> usize {
        self.inner.deps.borrow().len()
    }
}

impl PartialEq for Effect {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Effect {}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.inner.id)
            .field("runs", &self.inner.runs.get())
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}

/// Pops the effect stack on drop, so a panicking body cannot leave a stale
/// computation listening.
struct StackFrame;

impl StackFrame {
    fn push(effect: Option<Effect>) -> Self {
        EFFECT_STACK.with(|stack| stack.borrow_mut().push(effect));
        StackFrame
    }
}

impl Drop for StackFrame {
    fn drop(&mut self) {
        EFFECT_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Register `f` as a computation and run it once immediately.
pub fn effect(f: impl FnMut() + 'static) -> Effect {
    effect_with(EffectOptions::default(), f)
}

/// Register a computation with explicit options.
pub fn effect_with(options: EffectOptions, f: impl FnMut() + 'static) -> Effect {
    let lazy = options.lazy;
    let effect = Effect::new(options, Box::new(f));
    if !lazy {
        effect.run();
    }
    effect
}

/// The computation currently listening for reads, if any.
pub fn active_effect() -> Option<Effect> {
    EFFECT_STACK.with(|stack| stack.borrow().last().cloned().flatten())
}

/// Run `f` with no active computation.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    let _frame = StackFrame::push(None);
    f()
}

/// Run `f`, deferring triggered dependents until it returns.
///
/// Each dependent runs at most once per outermost batch, in the order it was
/// first triggered.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    BATCH_DEPTH.with(|depth| depth.set(depth.get() + 1));
    let guard = BatchGuard;
    let result = f();
    drop(guard);
    if BATCH_DEPTH.with(Cell::get) == 0 {
        flush_pending();
    }
    result
}

/// Whether a batch is open on this thread.
pub fn is_batching() -> bool {
    BATCH_DEPTH.with(Cell::get) > 0
}

struct BatchGuard;

impl Drop for BatchGuard {
    fn drop(&mut self) {
        let depth = BATCH_DEPTH.with(|depth| {
            let next = depth.get().saturating_sub(1);
            depth.set(next);
            next
        });
        if depth == 0 && std::thread::panicking() {
            PENDING.with(|pending| pending.borrow_mut().clear());
        }
    }
}

fn flush_pending() {
    loop {
        let next = PENDING.with(|pending| {
            let mut pending = pending.borrow_mut();
            if pending.is_empty() {
                None
            } else {
                Some(pending.remove(0))
            }
        });
        let Some(effect) = next else { break };
        effect.fire();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::graph::{track, trigger};
    use std::cell::Cell;

    #[test]
    fn test_effect_runs_immediately() {
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        let e = effect(move || count_clone.set(count_clone.get() + 1));

        assert_eq!(count.get(), 1);
        assert_eq!(e.run_count(), 1);
    }

    #[test]
    fn test_lazy_effect_waits_for_run() {
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        let e = effect_with(
            EffectOptions { lazy: true, scheduler: None },
            move || count_clone.set(count_clone.get() + 1),
        );
        assert_eq!(count.get(), 0);

        e.run();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_stack_restored_after_nested_effects() {
        let owner = OwnerId::next();
        let inner_handle = Rc::new(RefCell::new(None));
        let inner_clone = inner_handle.clone();

        let outer = effect(move || {
            let inner = effect(move || track(owner, "inner"));
            *inner_clone.borrow_mut() = Some(inner);
            // Back on the outer effect after the nested one returns.
            track(owner, "outer");
        });

        let inner = inner_handle.borrow().clone().unwrap();
        assert_eq!(outer.dependency_count(), 1);
        assert_eq!(inner.dependency_count(), 1);
        assert!(active_effect().is_none());
    }

    #[test]
    fn test_stack_restored_after_panic() {
        let result = std::panic::catch_unwind(|| {
            effect(|| panic!("boom"));
        });
        assert!(result.is_err());
        assert!(active_effect().is_none());
    }

    #[test]
    fn test_untracked_hides_active_effect() {
        let seen = Rc::new(Cell::new(true));
        let seen_clone = seen.clone();

        effect(move || {
            seen_clone.set(untracked(|| active_effect().is_some()));
        });

        assert!(!seen.get());
    }

    #[test]
    fn test_scheduler_replaces_rerun() {
        let owner = OwnerId::next();
        let scheduled = Rc::new(Cell::new(0));
        let scheduled_clone = scheduled.clone();

        let e = effect_with(
            EffectOptions {
                lazy: false,
                scheduler: Some(Rc::new(move || scheduled_clone.set(scheduled_clone.get() + 1))),
            },
            move || track(owner, "x"),
        );

        trigger(owner, "x");
        assert_eq!(scheduled.get(), 1);
        assert_eq!(e.run_count(), 1);
    }

    #[test]
    fn test_self_write_does_not_recurse() {
        let state = crate::reactive::Observable::from_fields([("x", 0)]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let state_clone = state.clone();

        let e = effect(move || {
            let x = state_clone.get("x").as_int().unwrap_or(0);
            seen_clone.borrow_mut().push(x);
            state_clone.set("x", x + 1);
        });
        assert_eq!(e.run_count(), 1);
        assert_eq!(state.get("x"), crate::types::Value::from(1));

        state.set("x", 10);
        assert_eq!(e.run_count(), 2);
        assert_eq!(state.get("x"), crate::types::Value::from(11));
        assert_eq!(*seen.borrow(), vec![0, 10]);
        assert!(!e.is_running());
    }

    #[test]
    fn test_dispose_stops_reruns() {
        let owner = OwnerId::next();
        let e = effect(move || track(owner, "x"));

        trigger(owner, "x");
        assert_eq!(e.run_count(), 2);

        e.dispose();
        trigger(owner, "x");
        assert_eq!(e.run_count(), 2);
        assert_eq!(graph::dependent_count(owner, "x"), 0);
    }

    #[test]
    fn test_batch_coalesces_triggers() {
        let owner = OwnerId::next();
        let e = effect(move || {
            track(owner, "a");
            track(owner, "b");
        });

        batch(|| {
            trigger(owner, "a");
            trigger(owner, "b");
            trigger(owner, "a");
            assert_eq!(e.run_count(), 1);
        });

        assert_eq!(e.run_count(), 2);
        assert!(!is_batching());
    }

    #[test]
    fn test_nested_batch_flushes_once_at_outermost() {
        let owner = OwnerId::next();
        let e = effect(move || track(owner, "a"));

        batch(|| {
            batch(|| trigger(owner, "a"));
            assert_eq!(e.run_count(), 1);
            trigger(owner, "a");
        });

        assert_eq!(e.run_count(), 2);
    }
}
