//! Lifecycle - The six hook phases and setup-time registration.
//!
//! While a component's setup layers run, its hook lists sit on a
//! thread-local context stack. `on_mount` and friends append to whatever is
//! on top. Nested mounts push their own lists, so hooks always land on the
//! component being set up.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A lifecycle callback.
pub type Hook = Rc<dyn Fn()>;

/// The six points at which hooks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    BeforeMount,
    Mounted,
    BeforeUpdate,
    Updated,
    BeforeUnmount,
    Unmounted,
}

impl LifecyclePhase {
    pub const ALL: [LifecyclePhase; 6] = [
        LifecyclePhase::BeforeMount,
        LifecyclePhase::Mounted,
        LifecyclePhase::BeforeUpdate,
        LifecyclePhase::Updated,
        LifecyclePhase::BeforeUnmount,
        LifecyclePhase::Unmounted,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

/// Ordered hook lists, one per phase.
#[derive(Default)]
pub struct LifecycleHooks {
    lists: [Vec<Hook>; 6],
}

impl LifecycleHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, phase: LifecyclePhase, hook: Hook) {
        self.lists[phase.slot()].push(hook);
    }

    pub fn count(&self, phase: LifecyclePhase) -> usize {
        self.lists[phase.slot()].len()
    }

    /// Snapshot of the hooks for `phase`, in registration order.
    pub fn hooks(&self, phase: LifecyclePhase) -> Vec<Hook> {
        self.lists[phase.slot()].clone()
    }
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for phase in LifecyclePhase::ALL {
            map.entry(&phase, &self.count(phase));
        }
        map.finish()
    }
}

/// Run every hook of `phase` in registration order.
///
/// The list is snapshotted first, so hooks may trigger re-renders or
/// register further hooks without conflicting borrows.
pub fn run_hooks(hooks: &RefCell<LifecycleHooks>, phase: LifecyclePhase) {
    let snapshot = hooks.borrow().hooks(phase);
    if !snapshot.is_empty() {
        tracing::trace!(?phase, count = snapshot.len(), "running lifecycle hooks");
    }
    for hook in snapshot {
        hook();
    }
}

// =============================================================================
// Setup context stack
// =============================================================================

thread_local! {
    /// Hook lists of the components currently running setup.
    static SETUP_STACK: RefCell<Vec<Rc<RefCell<LifecycleHooks>>>> = const { RefCell::new(Vec::new()) };
}

/// Keeps `hooks` current until dropped.
pub struct SetupScope(());

impl SetupScope {
    pub fn enter(hooks: Rc<RefCell<LifecycleHooks>>) -> Self {
        SETUP_STACK.with(|stack| stack.borrow_mut().push(hooks));
        SetupScope(())
    }
}

impl Drop for SetupScope {
    fn drop(&mut self) {
        SETUP_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Whether a component setup is running.
pub fn in_setup() -> bool {
    SETUP_STACK.with(|stack| !stack.borrow().is_empty())
}

fn register(phase: LifecyclePhase, hook: impl Fn() + 'static) {
    let current = SETUP_STACK.with(|stack| stack.borrow().last().cloned());
    match current {
        Some(hooks) => hooks.borrow_mut().register(phase, Rc::new(hook)),
        None => tracing::warn!(?phase, "lifecycle hook registered outside component setup; ignored"),
    }
}

pub fn on_before_mount(hook: impl Fn() + 'static) {
    register(LifecyclePhase::BeforeMount, hook);
}

pub fn on_mount(hook: impl Fn() + 'static) {
    register(LifecyclePhase::Mounted, hook);
}

pub fn on_before_update(hook: impl Fn() + 'static) {
    register(LifecyclePhase::BeforeUpdate, hook);
}

pub fn on_update(hook: impl Fn() + 'static) {
    register(LifecyclePhase::Updated, hook);
}

pub fn on_before_unmount(hook: impl Fn() + 'static) {
    register(LifecyclePhase::BeforeUnmount, hook);
}

pub fn on_unmount(hook: impl Fn() + 'static) {
    register(LifecyclePhase::Unmounted, hook);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_registration_targets_top_of_stack() {
        let outer = Rc::new(RefCell::new(LifecycleHooks::new()));
        let inner = Rc::new(RefCell::new(LifecycleHooks::new()));

        {
            let _outer = SetupScope::enter(outer.clone());
            on_mount(|| {});
            {
                let _inner = SetupScope::enter(inner.clone());
                on_mount(|| {});
                on_unmount(|| {});
            }
            on_before_update(|| {});
        }

        assert!(!in_setup());
        assert_eq!(outer.borrow().count(LifecyclePhase::Mounted), 1);
        assert_eq!(outer.borrow().count(LifecyclePhase::BeforeUpdate), 1);
        assert_eq!(inner.borrow().count(LifecyclePhase::Mounted), 1);
        assert_eq!(inner.borrow().count(LifecyclePhase::Unmounted), 1);
    }

    #[test]
    fn test_outside_setup_is_ignored() {
        on_mount(|| panic!("never stored"));
        assert!(!in_setup());
    }

    #[test]
    fn test_run_in_order() {
        let hooks = Rc::new(RefCell::new(LifecycleHooks::new()));
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let _scope = SetupScope::enter(hooks.clone());
            for i in 0..3 {
                let log = log.clone();
                on_update(move || log.borrow_mut().push(i));
            }
        }

        run_hooks(&hooks, LifecyclePhase::Updated);
        run_hooks(&hooks, LifecyclePhase::Mounted);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_hook_may_register_during_run() {
        let hooks = Rc::new(RefCell::new(LifecycleHooks::new()));
        let calls = Rc::new(Cell::new(0));
        let hooks_clone = hooks.clone();
        let calls_clone = calls.clone();
        hooks.borrow_mut().register(
            LifecyclePhase::Mounted,
            Rc::new(move || {
                calls_clone.set(calls_clone.get() + 1);
                hooks_clone
                    .borrow_mut()
                    .register(LifecyclePhase::Mounted, Rc::new(|| {}));
            }),
        );

        run_hooks(&hooks, LifecyclePhase::Mounted);
        assert_eq!(calls.get(), 1);
        assert_eq!(hooks.borrow().count(LifecyclePhase::Mounted), 2);
    }
}
