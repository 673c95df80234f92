//! Dependency Graph - Which computations read which observable fields.
//!
//! ```text
//! OwnerId ──► field name ──► [Effect, Effect, ...]   (registration order)
//! ```
//!
//! Entries are created lazily on the first tracked read. They are pruned only
//! when a computation is disposed; an owner that is dropped while effects
//! still depend on it keeps its (now unreachable) entries until those
//! effects are disposed.

use std::cell::RefCell;
use std::collections::HashMap;

use super::effect::{active_effect, Effect};
use crate::types::{EffectId, OwnerId};

// =============================================================================
// Graph State
// =============================================================================

thread_local! {
    /// owner → field → dependents.
    static TARGET_MAP: RefCell<HashMap<OwnerId, HashMap<String, Vec<Effect>>>> =
        RefCell::new(HashMap::new());
}

// =============================================================================
// Track / Trigger
// =============================================================================

/// Register the active computation as a dependent of (owner, field).
///
/// No-op when nothing is listening. A computation joins each set at most
/// once, so repeated reads in one run still produce a single re-run.
pub fn track(owner: OwnerId, field: &str) {
    let Some(effect) = active_effect() else {
        return;
    };

    let inserted = TARGET_MAP.with(|map| {
        let mut map = map.borrow_mut();
        let dep = map
            .entry(owner)
            .or_default()
            .entry(field.to_string())
            .or_default();
        if dep.iter().any(|e| e.id() == effect.id()) {
            false
        } else {
            dep.push(effect.clone());
            true
        }
    });

    if inserted {
        effect.record_dependency(owner, field);
        tracing::trace!(%owner, field, effect = %effect.id(), "tracked");
    }
}

/// Notify every dependent of (owner, field), in registration order.
///
/// The dependent list is snapshotted first, so dependents may read, write
/// and register freely while being notified.
pub fn trigger(owner: OwnerId, field: &str) {
    let dependents: Vec<Effect> = TARGET_MAP.with(|map| {
        map.borrow()
            .get(&owner)
            .and_then(|fields| fields.get(field))
            .cloned()
            .unwrap_or_default()
    });

    if dependents.is_empty() {
        return;
    }

    tracing::trace!(%owner, field, dependents = dependents.len(), "trigger");
    for effect in dependents {
        effect.notify();
    }
}

// =============================================================================
// Pruning / Inspection
// =============================================================================

/// Remove one computation from the dependency set of (owner, field).
pub(crate) fn remove_dependent(owner: OwnerId, field: &str, effect: EffectId) {
    TARGET_MAP.with(|map| {
        let mut map = map.borrow_mut();
        let Some(fields) = map.get_mut(&owner) else {
            return;
        };
        if let Some(dep) = fields.get_mut(field) {
            dep.retain(|e| e.id() != effect);
            if dep.is_empty() {
                fields.remove(field);
            }
        }
        if fields.is_empty() {
            map.remove(&owner);
        }
    });
}

/// Number of computations depending on (owner, field).
pub fn dependent_count(owner: OwnerId, field: &str) -> usize {
    TARGET_MAP.with(|map| {
        map.borrow()
            .get(&owner)
            .and_then(|fields| fields.get(field))
            .map_or(0, Vec::len)
    })
}

/// Whether any computation depends on any field of `owner`.
pub fn has_dependents(owner: OwnerId) -> bool {
    TARGET_MAP.with(|map| map.borrow().contains_key(&owner))
}

// =============================================================================
// Tests
// =============================================================================
