//! Component instances.
//!
//! One [`ComponentInstance`] exists per successful mount. It owns everything
//! the runtime needs to re-render and tear down: the target, the context
//! handed to render and methods, the hook lists, the last rendered tree and
//! the render effect.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::component::{ComponentContext, Props, RenderFn};
use super::lifecycle::{run_hooks, LifecycleHooks, LifecyclePhase};
use crate::primitives::Node;
use crate::reactive::{Effect, Observable};
use crate::renderer::RenderTarget;
use crate::types::{InstanceId, Value};

/// Where an instance is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComponentState {
    #[default]
    Unmounted,
    Mounting,
    Mounted,
    Updating,
    Unmounting,
}

/// A mounted (or mounting) component.
pub struct ComponentInstance<T: RenderTarget> {
    name: String,
    target: T,
    context: ComponentContext,
    render: RenderFn,
    hooks: Rc<RefCell<LifecycleHooks>>,
    status: Cell<ComponentState>,
    tree: RefCell<Option<Node>>,
    effect: RefCell<Option<Effect>>,
}

impl<T: RenderTarget> ComponentInstance<T> {
    pub(crate) fn new(
        name: String,
        target: T,
        context: ComponentContext,
        render: RenderFn,
        hooks: Rc<RefCell<LifecycleHooks>>,
    ) -> Self {
        Self {
            name,
            target,
            context,
            render,
            hooks,
            status: Cell::new(ComponentState::Mounting),
            tree: RefCell::new(None),
            effect: RefCell::new(None),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.context.id()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn status(&self) -> ComponentState {
        self.status.get()
    }

    pub fn is_mounted(&self) -> bool {
        matches!(self.status(), ComponentState::Mounted | ComponentState::Updating)
    }

    pub fn context(&self) -> &ComponentContext {
        &self.context
    }

    /// The instance's observable state.
    pub fn state(&self) -> &Observable {
        self.context.state()
    }

    pub fn props(&self) -> &Props {
        self.context.props()
    }

    /// The tree currently reflected in the target.
    pub fn tree(&self) -> Option<Node> {
        self.tree.borrow().clone()
    }

    /// Number of hooks registered for `phase`.
    pub fn hook_count(&self, phase: LifecyclePhase) -> usize {
        self.hooks.borrow().count(phase)
    }

    /// Invoke a merged method.
    pub fn call(&self, name: &str, args: &[Value]) -> crate::error::Result<Value> {
        self.context.call(name, args)
    }

    /// The render effect, while mounted.
    pub fn render_effect(&self) -> Option<Effect> {
        self.effect.borrow().clone()
    }

    pub(crate) fn set_status(&self, status: ComponentState) {
        self.status.set(status);
    }

    pub(crate) fn run_hooks(&self, phase: LifecyclePhase) {
        run_hooks(&self.hooks, phase);
    }

    pub(crate) fn set_effect(&self, effect: Effect) {
        *self.effect.borrow_mut() = Some(effect);
    }

    pub(crate) fn take_effect(&self) -> Option<Effect> {
        self.effect.borrow_mut().take()
    }

    pub(crate) fn replace_tree(&self, tree: Option<Node>) -> Option<Node> {
        std::mem::replace(&mut *self.tree.borrow_mut(), tree)
    }

    /// Call the render function, subscribing the render effect to what it reads.
    pub(crate) fn render(&self) -> Node {
        let effect = self.render_effect();
        match effect {
            Some(effect) => effect.track_in(|| (self.render)(&self.context)),
            None => (self.render)(&self.context),
        }
    }
}

impl<T: RenderTarget> fmt::Debug for ComponentInstance<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("id", &self.id())
            .field("name", &self.name)
            .field("target", &self.target.id())
            .field("status", &self.status())
            .field("hooks", &*self.hooks.borrow())
            .finish()
    }
}
