//! Component Registry - Name to definition mapping.
//!
//! Mount looks components up here by name. Registering a definition under
//! an existing name replaces it; instances already mounted keep the
//! definition they were created from.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::component::ComponentDef;

// =============================================================================
// Registry State
// =============================================================================

thread_local! {
    /// Registered definitions by name.
    static COMPONENTS: RefCell<HashMap<String, Rc<ComponentDef>>> = RefCell::new(HashMap::new());
}

// =============================================================================
// Registration
// =============================================================================

/// Register `def` under its name, replacing any previous definition.
///
/// Returns the name.
pub fn define_component(def: ComponentDef) -> String {
    let name = def.name.clone();
    let replaced = COMPONENTS.with(|map| map.borrow_mut().insert(name.clone(), Rc::new(def)));
    if replaced.is_some() {
        tracing::debug!(component = %name, "component redefined");
    } else {
        tracing::trace!(component = %name, "component defined");
    }
    name
}

/// Remove a definition. Returns whether one existed.
pub fn remove_component(name: &str) -> bool {
    COMPONENTS.with(|map| map.borrow_mut().remove(name).is_some())
}

// =============================================================================
// Lookups
// =============================================================================

pub fn get_component(name: &str) -> Option<Rc<ComponentDef>> {
    COMPONENTS.with(|map| map.borrow().get(name).cloned())
}

pub fn is_registered(name: &str) -> bool {
    COMPONENTS.with(|map| map.borrow().contains_key(name))
}

/// Registered names, sorted.
pub fn component_names() -> Vec<String> {
    let mut names: Vec<String> = COMPONENTS.with(|map| map.borrow().keys().cloned().collect());
    names.sort();
    names
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Drop every registered definition (for testing).
pub fn reset_registry() {
    COMPONENTS.with(|map| map.borrow_mut().clear());
}
