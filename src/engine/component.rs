//! Component definitions and the contributions they resolve to.
//!
//! A [`ComponentDef`] is a recipe. Mounting resolves it into one
//! [`Contribution`] by layering, lowest precedence first:
//!
//! ```text
//! extends (resolved recursively) → mixins (declared order) → own setup
//! ```
//!
//! State fields and methods merge key by key with later layers winning.
//! A render function replaces any earlier one wholesale.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::primitives::Node;
use crate::reactive::Observable;
use crate::types::{InstanceId, Value};

/// Props supplied to a mount call.
pub type Props = BTreeMap<String, Value>;

/// Prop check. Returning `false` only produces a warning.
pub type PropValidator = Rc<dyn Fn(&Value) -> bool>;

/// Produces the component's tree from its context.
pub type RenderFn = Rc<dyn Fn(&ComponentContext) -> Node>;

/// A named operation callable through the component's context.
pub type Method = Rc<dyn Fn(&ComponentContext, &[Value]) -> Value>;

/// Setup procedure of a component or mixin.
pub type SetupFn = Rc<dyn Fn(&Props) -> Contribution>;

// =============================================================================
// Contribution
// =============================================================================

/// Partial component shape returned by setup procedures.
#[derive(Clone, Default)]
pub struct Contribution {
    pub state: BTreeMap<String, Value>,
    pub methods: BTreeMap<String, Method>,
    pub render: Option<RenderFn>,
}

impl Contribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.state.insert(name.into(), value.into());
        self
    }

    pub fn method(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&ComponentContext, &[Value]) -> Value + 'static,
    ) -> Self {
        self.methods.insert(name.into(), Rc::new(f));
        self
    }

    pub fn render(mut self, f: impl Fn(&ComponentContext) -> Node + 'static) -> Self {
        self.render = Some(Rc::new(f));
        self
    }

    /// Layer `later` on top of `self`.
    pub fn merge(&mut self, later: Contribution) {
        self.state.extend(later.state);
        self.methods.extend(later.methods);
        if later.render.is_some() {
            self.render = later.render;
        }
    }
}

impl fmt::Debug for Contribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contribution")
            .field("state", &self.state.keys().collect::<Vec<_>>())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("render", &self.render.is_some())
            .finish()
    }
}

// =============================================================================
// Definition
// =============================================================================

/// A registrable component.
#[derive(Clone)]
pub struct ComponentDef {
    pub name: String,
    pub props: BTreeMap<String, PropValidator>,
    pub setup: Option<SetupFn>,
    pub mixins: Vec<SetupFn>,
    pub extends: Option<Rc<ComponentDef>>,
}

impl ComponentDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            props: BTreeMap::new(),
            setup: None,
            mixins: Vec::new(),
            extends: None,
        }
    }

    pub fn prop(mut self, name: impl Into<String>, validator: impl Fn(&Value) -> bool + 'static) -> Self {
        self.props.insert(name.into(), Rc::new(validator));
        self
    }

    pub fn setup(mut self, f: impl Fn(&Props) -> Contribution + 'static) -> Self {
        self.setup = Some(Rc::new(f));
        self
    }

    pub fn mixin(mut self, f: impl Fn(&Props) -> Contribution + 'static) -> Self {
        self.mixins.push(Rc::new(f));
        self
    }

    pub fn extends(mut self, base: impl Into<Rc<ComponentDef>>) -> Self {
        self.extends = Some(base.into());
        self
    }

    /// Run every layer's setup against `props` and merge the results.
    pub fn resolve(&self, props: &Props) -> Contribution {
        let mut merged = match &self.extends {
            Some(base) => base.resolve(props),
            None => Contribution::new(),
        };
        for mixin in &self.mixins {
            merged.merge(mixin(props));
        }
        if let Some(setup) = &self.setup {
            merged.merge(setup(props));
        }
        merged
    }

    /// Run the prop validators, returning the names that failed.
    ///
    /// Validators declared on an `extends` base apply too. A missing prop is
    /// validated as [`Value::Null`].
    pub fn invalid_props(&self, props: &Props) -> Vec<String> {
        let mut failed = match &self.extends {
            Some(base) => base.invalid_props(props),
            None => Vec::new(),
        };
        for (name, validator) in &self.props {
            let value = props.get(name).cloned().unwrap_or_default();
            if !validator(&value) && !failed.contains(name) {
                failed.push(name.clone());
            }
        }
        failed
    }
}

impl fmt::Debug for ComponentDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDef")
            .field("name", &self.name)
            .field("props", &self.props.keys().collect::<Vec<_>>())
            .field("setup", &self.setup.is_some())
            .field("mixins", &self.mixins.len())
            .field("extends", &self.extends.as_ref().map(|base| base.name.as_str()))
            .finish()
    }
}

// =============================================================================
// Context
// =============================================================================

/// What render functions and methods see of their instance.
///
/// Cheap to clone; event handlers typically capture a clone.
#[derive(Clone)]
pub struct ComponentContext {
    id: InstanceId,
    state: Observable,
    props: Rc<Props>,
    methods: Rc<BTreeMap<String, Method>>,
}

impl ComponentContext {
    pub fn new(
        id: InstanceId,
        state: Observable,
        props: Props,
        methods: BTreeMap<String, Method>,
    ) -> Self {
        Self {
            id,
            state,
            props: Rc::new(props),
            methods: Rc::new(methods),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// The instance's observable state.
    pub fn state(&self) -> &Observable {
        &self.state
    }

    /// Tracked read of a state field.
    pub fn get(&self, field: &str) -> Value {
        self.state.get(field)
    }

    /// Write a state field. Returns whether the value changed.
    pub fn set(&self, field: &str, value: impl Into<Value>) -> bool {
        self.state.set(field, value)
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    /// A supplied prop, [`Value::Null`] when absent.
    pub fn prop(&self, name: &str) -> Value {
        self.props.get(name).cloned().unwrap_or_default()
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn method_names(&self) -> Vec<String> {
        self.methods.keys().cloned().collect()
    }

    /// Invoke a merged method.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let method = self
            .methods
            .get(name)
            .cloned()
            .ok_or_else(|| Error::MethodNotFound { name: name.to_string() })?;
        Ok(method(self, args))
    }
}

impl fmt::Debug for ComponentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentContext")
            .field("id", &self.id)
            .field("state", &self.state.record().field_names())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
