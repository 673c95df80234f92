//! Mount API - Component lifecycle against a render target.
//!
//! ```text
//! mount(name) → resolve def → setup layers → BeforeMount → render → patch → Mounted
//!                                                            ▲
//! state write ──► render effect ──► scheduler ──► update ────┘ (BeforeUpdate … Updated)
//! unmount     ──► BeforeUnmount → dispose effect → remove tree → Unmounted
//! ```
//!
//! # Example
//!
//! ```
//! use spark_dom::engine::{define_component, ComponentDef, Contribution};
//! use spark_dom::pipeline::{instance, mount, unmount};
//! use spark_dom::primitives::{h, no_attrs};
//! use spark_dom::renderer::DomNode;
//!
//! define_component(ComponentDef::new("Counter").setup(|_| {
//!     Contribution::new()
//!         .state("n", 0)
//!         .render(|ctx| h("span", no_attrs(), [ctx.get("n")]))
//! }));
//!
//! let target = DomNode::element("div");
//! mount("Counter", &target, Default::default()).unwrap();
//! assert_eq!(target.inner_html(), "<span>0</span>");
//!
//! // Writes re-render automatically.
//! instance::<DomNode>(&target).unwrap().state().set("n", 1);
//! assert_eq!(target.inner_html(), "<span>1</span>");
//!
//! unmount(&target).unwrap();
//! assert_eq!(target.inner_html(), "");
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::config::config;
use crate::engine::{
    get_component, ComponentContext, ComponentInstance, ComponentState, Contribution,
    LifecycleHooks, LifecyclePhase, Props, RenderFn, SetupScope,
};
use crate::error::{Error, Result};
use crate::primitives::{Element, Node};
use crate::reactive::{effect_with, untracked, Effect, EffectOptions, Observable, Scheduler};
use crate::renderer::{patch, DomNode, PatchStats, RenderTarget};
use crate::types::{InstanceId, TargetId, Value};

// =============================================================================
// Attached instances
// =============================================================================

thread_local! {
    /// Instance attached to each target, type-erased over the target type.
    static INSTANCES: RefCell<HashMap<TargetId, Rc<dyn Any>>> = RefCell::new(HashMap::new());
}

/// The instance mounted on `target`, if any.
pub fn instance<T: RenderTarget>(target: &T) -> Option<Rc<ComponentInstance<T>>> {
    let attached = INSTANCES.with(|map| map.borrow().get(&target.id()).cloned())?;
    attached.downcast::<ComponentInstance<T>>().ok()
}

pub fn is_mounted<T: RenderTarget>(target: &T) -> bool {
    instance(target).is_some()
}

/// Number of targets with an attached instance.
pub fn mounted_count() -> usize {
    INSTANCES.with(|map| map.borrow().len())
}

fn attach<T: RenderTarget>(instance: &Rc<ComponentInstance<T>>) {
    let erased: Rc<dyn Any> = instance.clone();
    INSTANCES.with(|map| map.borrow_mut().insert(instance.target().id(), erased));
}

fn detach(target: TargetId) {
    INSTANCES.with(|map| map.borrow_mut().remove(&target));
}

// =============================================================================
// Mount
// =============================================================================

/// Mount the component registered as `name` into `target`.
///
/// Any instance already attached to `target` is unmounted first. An unknown
/// name replaces the target's content with a visible placeholder and
/// returns `Ok(None)`.
pub fn mount<T: RenderTarget>(name: &str, target: &T, props: Props) -> Result<Option<InstanceId>> {
    unmount(target)?;

    let Some(def) = get_component(name) else {
        tracing::warn!(component = name, "component not found");
        target.clear_children()?;
        patch(target, None, Some(&not_found(name)), 0)?;
        return Ok(None);
    };

    let hooks = Rc::new(RefCell::new(LifecycleHooks::new()));
    let contribution = {
        let _scope = SetupScope::enter(hooks.clone());
        untracked(|| def.resolve(&props))
    };

    for prop in def.invalid_props(&props) {
        tracing::warn!(component = name, prop = %prop, "invalid prop");
    }

    let Contribution { state, methods, render } = contribution;
    let id = InstanceId::next();
    let context = ComponentContext::new(id, Observable::from_fields(state), props, methods);
    let instance = Rc::new(ComponentInstance::new(
        def.name.clone(),
        target.clone(),
        context,
        render.unwrap_or_else(no_render),
        hooks,
    ));
    instance.set_effect(render_effect(&instance));

    let guard = StatusGuard::new(&instance, ComponentState::Unmounted);
    first_render(&instance)?;
    guard.disarm();

    attach(&instance);
    tracing::debug!(component = name, instance = %id, target = %target.id(), "component mounted");
    instance.run_hooks(LifecyclePhase::Mounted);
    Ok(Some(id))
}

fn first_render<T: RenderTarget>(instance: &ComponentInstance<T>) -> Result<()> {
    instance.run_hooks(LifecyclePhase::BeforeMount);
    instance.target().clear_children()?;

    let tree = instance.render();
    let stats = patch(instance.target(), None, Some(&tree), 0)?;
    log_patch(instance, "mount", stats);

    instance.replace_tree(Some(tree));
    instance.set_status(ComponentState::Mounted);
    Ok(())
}

/// Lazy effect whose trigger re-renders the instance.
///
/// The effect body is never used: renders run through
/// [`Effect::track_in`], so each one re-subscribes the effect.
fn render_effect<T: RenderTarget>(instance: &Rc<ComponentInstance<T>>) -> Effect {
    let weak = Rc::downgrade(instance);
    let scheduler: Scheduler = Rc::new(move || {
        let Some(instance) = weak.upgrade() else {
            return;
        };
        if !config().auto_update {
            tracing::trace!(component = instance.name(), "state changed; auto update disabled");
            return;
        }
        if let Err(err) = rerender(&instance) {
            tracing::error!(component = instance.name(), error = %err, "automatic re-render failed");
        }
    });
    effect_with(
        EffectOptions {
            lazy: true,
            scheduler: Some(scheduler),
        },
        || {},
    )
}

// =============================================================================
// Update
// =============================================================================

/// Re-render the component mounted on `target`.
///
/// No-op when nothing is mounted there.
pub fn update<T: RenderTarget>(target: &T) -> Result<()> {
    match instance(target) {
        Some(instance) => rerender(&instance),
        None => Ok(()),
    }
}

/// Re-render an already server-rendered target in place.
pub fn hydrate<T: RenderTarget>(target: &T) -> Result<()> {
    update(target)
}

fn rerender<T: RenderTarget>(instance: &ComponentInstance<T>) -> Result<()> {
    // A render already in flight will read the latest state itself.
    if instance.status() != ComponentState::Mounted {
        tracing::trace!(component = instance.name(), status = ?instance.status(), "re-render skipped");
        return Ok(());
    }

    instance.set_status(ComponentState::Updating);
    let guard = StatusGuard::new(instance, ComponentState::Mounted);
    instance.run_hooks(LifecyclePhase::BeforeUpdate);

    let tree = instance.render();
    let old = instance.tree();
    let result = patch(instance.target(), old.as_ref(), Some(&tree), 0);
    guard.disarm();
    instance.set_status(ComponentState::Mounted);

    let stats = match result {
        Ok(stats) => stats,
        Err(err) => {
            rebuild(instance, tree);
            return Err(err);
        }
    };

    log_patch(instance, "update", stats);
    instance.replace_tree(Some(tree));
    instance.run_hooks(LifecyclePhase::Updated);
    Ok(())
}

/// Recreate the target's content from `tree` after a failed patch.
///
/// A patch that fails midway leaves the target matching neither tree.
fn rebuild<T: RenderTarget>(instance: &ComponentInstance<T>, tree: Node) {
    tracing::warn!(component = instance.name(), "patch failed; rebuilding target from the new tree");
    let target = instance.target();
    let rebuilt = target
        .clear_children()
        .and_then(|()| patch(target, None, Some(&tree), 0));
    match rebuilt {
        Ok(_) => {
            instance.replace_tree(Some(tree));
        }
        Err(err) => {
            tracing::error!(component = instance.name(), error = %err, "rebuild failed");
            instance.replace_tree(None);
        }
    }
}

/// Restores an instance's status when a render or hook unwinds.
///
/// Falling back to `Unmounted` also stops the render effect.
struct StatusGuard<'a, T: RenderTarget> {
    instance: &'a ComponentInstance<T>,
    fallback: ComponentState,
    armed: bool,
}

impl<'a, T: RenderTarget> StatusGuard<'a, T> {
    fn new(instance: &'a ComponentInstance<T>, fallback: ComponentState) -> Self {
        Self {
            instance,
            fallback,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T: RenderTarget> Drop for StatusGuard<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!(component = self.instance.name(), status = ?self.fallback, "render aborted");
        self.instance.set_status(self.fallback);
        if self.fallback == ComponentState::Unmounted {
            if let Some(effect) = self.instance.take_effect() {
                effect.dispose();
            }
        }
    }
}

// =============================================================================
// Unmount
// =============================================================================

/// Tear down the component mounted on `target`.
///
/// Runs `BeforeUnmount` hooks, stops automatic re-rendering, removes the
/// rendered tree and runs `Unmounted` hooks. No-op when nothing is mounted.
pub fn unmount<T: RenderTarget>(target: &T) -> Result<()> {
    let Some(instance) = instance(target) else {
        return Ok(());
    };
    if instance.status() == ComponentState::Unmounting {
        return Ok(());
    }

    instance.set_status(ComponentState::Unmounting);
    instance.run_hooks(LifecyclePhase::BeforeUnmount);

    if let Some(effect) = instance.take_effect() {
        effect.dispose();
    }
    detach(target.id());

    let result = match instance.replace_tree(None) {
        Some(old) if target.child_count() > 0 => patch(target, Some(&old), None, 0).map(|_| ()),
        _ => Ok(()),
    };

    instance.set_status(ComponentState::Unmounted);
    tracing::debug!(component = instance.name(), instance = %instance.id(), "component unmounted");
    instance.run_hooks(LifecyclePhase::Unmounted);
    result
}

/// Unmount every attached instance (for testing).
///
/// Instances on target types other than [`DomNode`] are detached without
/// running their hooks.
pub fn reset_instances() {
    let targets: Vec<TargetId> = INSTANCES.with(|map| map.borrow().keys().copied().collect());
    for id in targets {
        let attached = INSTANCES.with(|map| map.borrow().get(&id).cloned());
        let Some(attached) = attached else { continue };
        match attached.downcast::<ComponentInstance<DomNode>>() {
            Ok(instance) => {
                if let Err(err) = unmount(instance.target()) {
                    tracing::warn!(error = %err, "unmount during reset failed");
                }
            }
            Err(_) => detach(id),
        }
    }
}

// =============================================================================
// Methods & SSR
// =============================================================================

/// Invoke a method of the component mounted on `target`.
pub fn call_method<T: RenderTarget>(target: &T, name: &str, args: &[Value]) -> Result<Value> {
    let instance = instance(target).ok_or_else(|| Error::NotMounted {
        target: target.id().to_string(),
    })?;
    instance.call(name, args)
}

/// Render a component to an HTML string.
///
/// Mounts into a detached container, captures its markup, then unmounts.
pub fn render_to_string(name: &str, props: Props) -> Result<String> {
    let container = DomNode::element("div");
    mount(name, &container, props)?;
    let html = container.inner_html();
    unmount(&container)?;
    Ok(html)
}

// =============================================================================
// Helpers
// =============================================================================

fn not_found(name: &str) -> Node {
    Element::new("p")
        .attr("style", config().not_found_style)
        .child(format!("Component not found: {name}"))
        .build()
}

fn no_render() -> RenderFn {
    Rc::new(|_| Element::new("div").child("No render").build())
}

fn log_patch<T: RenderTarget>(instance: &ComponentInstance<T>, phase: &str, stats: PatchStats) {
    if config().debug {
        tracing::debug!(
            component = instance.name(),
            phase,
            mutations = stats.count,
            kinds = ?stats.kinds,
            "patched"
        );
    } else {
        tracing::trace!(component = instance.name(), phase, mutations = stats.count, "patched");
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{
        define_component, on_before_mount, on_before_unmount, on_before_update, on_mount,
        on_unmount, on_update, reset_registry, ComponentDef,
    };
    use crate::pipeline::{reset_config, update_config};
    use crate::primitives::{h, no_attrs, Event};
    use crate::reactive::{batch, graph};
    use std::cell::Cell;

    fn setup() {
        reset_instances();
        reset_registry();
        reset_config();
    }

    fn define_counter() {
        define_component(ComponentDef::new("Counter").setup(|_| {
            Contribution::new()
                .state("n", 0)
                .method("inc", |ctx, _| {
                    let next = ctx.get("n").as_int().unwrap_or(0) + 1;
                    ctx.set("n", next);
                    next.into()
                })
                .render(|ctx| {
                    let state = ctx.state().clone();
                    Element::new("span")
                        .on("click", move |_| {
                            let n = state.get("n").as_int().unwrap_or(0);
                            state.set("n", n + 1);
                        })
                        .child(ctx.get("n"))
                        .build()
                })
        }));
    }

    #[test]
    fn test_mount_renders_and_attaches() {
        setup();
        define_counter();
        let target = DomNode::element("div");
        target.append_child(DomNode::text("stale")).unwrap();

        let id = mount("Counter", &target, Props::new()).unwrap();

        assert!(id.is_some());
        assert_eq!(target.inner_html(), "<span>0</span>");
        let inst = instance::<DomNode>(&target).unwrap();
        assert_eq!(Some(inst.id()), id);
        assert_eq!(inst.status(), ComponentState::Mounted);
        assert_eq!(inst.name(), "Counter");
    }

    #[test]
    fn test_missing_component_placeholder() {
        setup();
        let target = DomNode::element("div");

        assert_eq!(mount("Ghost", &target, Props::new()).unwrap(), None);
        assert_eq!(
            target.inner_html(),
            "<p style=\"color:red;\">Component not found: Ghost</p>"
        );
        assert!(!is_mounted(&target));
    }

    #[test]
    fn test_state_write_rerenders_in_place() {
        setup();
        define_counter();
        let target = DomNode::element("div");
        mount("Counter", &target, Props::new()).unwrap();
        let span = target.child(0).unwrap();

        instance::<DomNode>(&target).unwrap().state().set("n", 1);
        update(&target).unwrap();

        assert_eq!(target.child(0).unwrap(), span);
        assert_eq!(span.text_content(), "1");
    }

    #[test]
    fn test_event_dispatch_rerenders() {
        setup();
        define_counter();
        let target = DomNode::element("div");
        mount("Counter", &target, Props::new()).unwrap();

        let span = target.child(0).unwrap();
        assert!(span.dispatch(&Event::new("click")));
        assert!(span.dispatch(&Event::new("click")));
        assert_eq!(target.inner_html(), "<span>2</span>");
    }

    #[test]
    fn test_auto_update_disabled() {
        setup();
        update_config(|c| c.auto_update = false);
        define_counter();
        let target = DomNode::element("div");
        mount("Counter", &target, Props::new()).unwrap();

        instance::<DomNode>(&target).unwrap().state().set("n", 5);
        assert_eq!(target.text_content(), "0");

        update(&target).unwrap();
        assert_eq!(target.text_content(), "5");
    }

    #[test]
    fn test_batch_renders_once() {
        setup();
        let updates = Rc::new(Cell::new(0));
        let updates_clone = updates.clone();
        define_component(ComponentDef::new("Pair").setup(move |_| {
            let updates = updates_clone.clone();
            on_update(move || updates.set(updates.get() + 1));
            Contribution::new()
                .state("a", 0)
                .state("b", 0)
                .render(|ctx| h("p", no_attrs(), [ctx.get("a"), ctx.get("b")]))
        }));
        let target = DomNode::element("div");
        mount("Pair", &target, Props::new()).unwrap();
        let state = instance::<DomNode>(&target).unwrap().state().clone();

        batch(|| {
            state.set("a", 1);
            state.set("b", 2);
        });

        assert_eq!(updates.get(), 1);
        assert_eq!(target.text_content(), "12");
    }

    #[test]
    fn test_lifecycle_order() {
        setup();
        let log = Rc::new(RefCell::new(Vec::<&'static str>::new()));
        let log_clone = log.clone();
        define_component(ComponentDef::new("Logged").setup(move |_| {
            for (phase, label) in [
                (LifecyclePhase::BeforeMount, "before_mount"),
                (LifecyclePhase::Mounted, "mounted"),
                (LifecyclePhase::BeforeUpdate, "before_update"),
                (LifecyclePhase::Updated, "updated"),
                (LifecyclePhase::BeforeUnmount, "before_unmount"),
                (LifecyclePhase::Unmounted, "unmounted"),
            ] {
                let log = log_clone.clone();
                let hook = move || log.borrow_mut().push(label);
                match phase {
                    LifecyclePhase::BeforeMount => on_before_mount(hook),
                    LifecyclePhase::Mounted => on_mount(hook),
                    LifecyclePhase::BeforeUpdate => on_before_update(hook),
                    LifecyclePhase::Updated => on_update(hook),
                    LifecyclePhase::BeforeUnmount => on_before_unmount(hook),
                    LifecyclePhase::Unmounted => on_unmount(hook),
                }
            }
            Contribution::new().render(|_| h("b", no_attrs(), ["x"]))
        }));
        let target = DomNode::element("div");

        mount("Logged", &target, Props::new()).unwrap();
        update(&target).unwrap();
        unmount(&target).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "before_mount",
                "mounted",
                "before_update",
                "updated",
                "before_unmount",
                "unmounted"
            ]
        );
    }

    #[test]
    fn test_unmount_stops_rerendering() {
        setup();
        define_counter();
        let target = DomNode::element("div");
        mount("Counter", &target, Props::new()).unwrap();
        let inst = instance::<DomNode>(&target).unwrap();
        let effect = inst.render_effect().unwrap();

        unmount(&target).unwrap();

        assert_eq!(target.child_count(), 0);
        assert!(!is_mounted(&target));
        assert!(effect.is_disposed());
        assert_eq!(inst.status(), ComponentState::Unmounted);

        inst.state().set("n", 9);
        assert_eq!(target.child_count(), 0);

        // Nothing attached: both are no-ops.
        unmount(&target).unwrap();
        update(&target).unwrap();
    }

    #[test]
    fn test_remount_replaces_instance() {
        setup();
        define_counter();
        let target = DomNode::element("div");
        let first = mount("Counter", &target, Props::new()).unwrap();
        let second = mount("Counter", &target, Props::new()).unwrap();

        assert_ne!(first, second);
        assert_eq!(mounted_count(), 1);
        assert_eq!(target.child_count(), 1);
    }

    #[test]
    fn test_default_render() {
        setup();
        define_component(ComponentDef::new("Blank"));
        assert_eq!(
            render_to_string("Blank", Props::new()).unwrap(),
            "<div>No render</div>"
        );
    }

    #[test]
    fn test_invalid_props_still_mount() {
        setup();
        define_component(
            ComponentDef::new("Greeting")
                .prop("name", |v| v.as_str().is_some())
                .setup(|props| {
                    let name = props.get("name").cloned().unwrap_or_default();
                    Contribution::new().render(move |_| h("h1", no_attrs(), [name.clone()]))
                }),
        );

        let mut props = Props::new();
        props.insert("name".into(), Value::from(42));
        assert_eq!(render_to_string("Greeting", props).unwrap(), "<h1>42</h1>");
    }

    #[test]
    fn test_call_method() {
        setup();
        define_counter();
        let target = DomNode::element("div");

        assert!(matches!(
            call_method(&target, "inc", &[]),
            Err(Error::NotMounted { .. })
        ));

        mount("Counter", &target, Props::new()).unwrap();
        assert_eq!(call_method(&target, "inc", &[]).unwrap(), Value::from(1));
        assert_eq!(target.text_content(), "1");
        assert_eq!(
            call_method(&target, "nope", &[]).unwrap_err(),
            Error::MethodNotFound { name: "nope".into() }
        );
    }

    #[test]
    fn test_render_to_string_cleans_up() {
        setup();
        define_counter();
        let html = render_to_string("Counter", Props::new()).unwrap();
        assert_eq!(html, "<span>0</span>");
        assert_eq!(mounted_count(), 0);
    }

    #[test]
    fn test_hydrate_rerenders() {
        setup();
        define_counter();
        let target = DomNode::element("div");
        update_config(|c| c.auto_update = false);
        mount("Counter", &target, Props::new()).unwrap();
        instance::<DomNode>(&target).unwrap().state().set("n", 3);

        hydrate(&target).unwrap();
        assert_eq!(target.text_content(), "3");
    }

    fn define_fragile(fail: Rc<Cell<bool>>, seen: Rc<RefCell<Option<Observable>>>) {
        define_component(ComponentDef::new("Fragile").setup(move |_| {
            let fail = fail.clone();
            let seen = seen.clone();
            Contribution::new().state("n", 0).render(move |ctx| {
                *seen.borrow_mut() = Some(ctx.state().clone());
                let n = ctx.get("n");
                if fail.get() {
                    panic!("render failed");
                }
                h("span", no_attrs(), [n])
            })
        }));
    }

    #[test]
    fn test_render_panic_during_update_keeps_instance_live() {
        setup();
        update_config(|c| c.auto_update = false);
        let fail = Rc::new(Cell::new(false));
        define_fragile(fail.clone(), Rc::new(RefCell::new(None)));
        let target = DomNode::element("div");
        mount("Fragile", &target, Props::new()).unwrap();
        let inst = instance::<DomNode>(&target).unwrap();

        fail.set(true);
        inst.state().set("n", 1);
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| update(&target)));
        assert!(outcome.is_err());
        assert_eq!(inst.status(), ComponentState::Mounted);
        assert_eq!(target.inner_html(), "<span>0</span>");

        fail.set(false);
        inst.state().set("n", 7);
        update(&target).unwrap();
        assert_eq!(target.inner_html(), "<span>7</span>");
        assert_eq!(inst.status(), ComponentState::Mounted);
    }

    #[test]
    fn test_hook_panic_during_update_keeps_instance_live() {
        setup();
        let fail = Rc::new(Cell::new(false));
        let fail_clone = fail.clone();
        define_component(ComponentDef::new("Hooked").setup(move |_| {
            let fail = fail_clone.clone();
            on_before_update(move || {
                if fail.get() {
                    panic!("hook failed");
                }
            });
            Contribution::new()
                .state("n", 0)
                .render(|ctx| h("b", no_attrs(), [ctx.get("n")]))
        }));
        let target = DomNode::element("div");
        mount("Hooked", &target, Props::new()).unwrap();
        let inst = instance::<DomNode>(&target).unwrap();

        fail.set(true);
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| inst.state().set("n", 1)));
        assert!(outcome.is_err());
        assert_eq!(inst.status(), ComponentState::Mounted);

        fail.set(false);
        inst.state().set("n", 2);
        assert_eq!(target.inner_html(), "<b>2</b>");
    }

    #[test]
    fn test_render_panic_during_mount_stops_render_effect() {
        setup();
        let fail = Rc::new(Cell::new(true));
        let seen = Rc::new(RefCell::new(None));
        define_fragile(fail.clone(), seen.clone());
        let target = DomNode::element("div");

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            mount("Fragile", &target, Props::new())
        }));
        assert!(outcome.is_err());
        assert!(!is_mounted(&target));
        let state = seen.borrow_mut().take().unwrap();
        assert_eq!(graph::dependent_count(state.id(), "n"), 0);

        fail.set(false);
        mount("Fragile", &target, Props::new()).unwrap();
        assert_eq!(target.inner_html(), "<span>0</span>");
        assert_eq!(instance::<DomNode>(&target).unwrap().status(), ComponentState::Mounted);
    }

    #[test]
    fn test_auto_update_read_at_write_time() {
        setup();
        define_counter();
        let target = DomNode::element("div");
        mount("Counter", &target, Props::new()).unwrap();
        let state = instance::<DomNode>(&target).unwrap().state().clone();

        state.set("n", 1);
        assert_eq!(target.text_content(), "1");

        update_config(|c| c.auto_update = false);
        state.set("n", 2);
        assert_eq!(target.text_content(), "1");

        update(&target).unwrap();
        assert_eq!(target.text_content(), "2");
    }

    #[test]
    fn test_failed_patch_rebuilds_target() {
        setup();
        update_config(|c| c.auto_update = false);
        define_counter();
        let target = DomNode::element("div");
        mount("Counter", &target, Props::new()).unwrap();
        let state = instance::<DomNode>(&target).unwrap().state().clone();

        // Someone else emptied the target behind the instance's back.
        target.remove_child(0).unwrap();
        state.set("n", 4);

        assert!(matches!(update(&target), Err(Error::ChildIndexOutOfBounds { .. })));
        assert_eq!(target.inner_html(), "<span>4</span>");

        state.set("n", 5);
        update(&target).unwrap();
        assert_eq!(target.inner_html(), "<span>5</span>");
    }
}
