//! Reconciler - Turns (old tree, new tree) into target mutations.
//!
//! # Algorithm
//!
//! 1. No old node: materialize the new one and append it.
//! 2. No new node: remove the child at `index`.
//! 3. [`changed`] (text vs element, different text, different kind):
//!    materialize the new node and replace the child at `index` wholesale.
//! 4. Same-kind elements: diff attributes in place, then reconcile children.
//!
//! # Children
//!
//! Old and new children are paired first, then the target is rearranged:
//!
//! - a keyed new child pairs with the old child holding the same key;
//! - an unkeyed new child pairs with the next unkeyed, unpaired old child;
//! - anything left unpaired on the new side is an insertion, and on the old
//!   side a removal.
//!
//! Unpaired old children are removed first (highest index first), so the
//! target then holds exactly the paired old nodes in their old order. New
//! children are then walked in order against a mirror of that list: a paired
//! node that is not yet at position `j` is moved there and patched in place,
//! a fresh node is inserted at `j`. The target's children end up in the new
//! tree's order, and paired nodes keep their identity.

use std::collections::HashMap;

use super::target::RenderTarget;
use crate::error::Result;
use crate::primitives::{is_event_attr, AttrValue, Element, Node, KEY_ATTR};

// =============================================================================
// Mutation accounting
// =============================================================================

bitflags::bitflags! {
    /// Kinds of target mutation performed by a patch.
    ///
    /// Combine with bitwise OR: `Mutations::INSERT | Mutations::REMOVE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Mutations: u16 {
        const APPEND = 1 << 0;
        const INSERT = 1 << 1;
        const REMOVE = 1 << 2;
        const REPLACE = 1 << 3;
        const MOVE = 1 << 4;
        const SET_ATTRIBUTE = 1 << 5;
        const REMOVE_ATTRIBUTE = 1 << 6;
        const SET_PROPERTY = 1 << 7;
    }
}

/// What a patch did to the live target.
///
/// Materializing a detached node is not counted; attaching it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatchStats {
    /// Number of mutations applied to attached nodes.
    pub count: usize,
    /// Which kinds of mutation occurred.
    pub kinds: Mutations,
}

impl PatchStats {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn record(&mut self, kind: Mutations) {
        self.count += 1;
        self.kinds |= kind;
    }
}

// =============================================================================
// Reconciler
// =============================================================================

/// Applies tree diffs to a target and accumulates [`PatchStats`].
#[derive(Debug, Default)]
pub struct Reconciler {
    stats: PatchStats,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> PatchStats {
        self.stats
    }

    /// Reconcile child `index` of `target` from `old` to `new`.
    pub fn patch<T: RenderTarget>(
        &mut self,
        target: &T,
        old: Option<&Node>,
        new: Option<&Node>,
        index: usize,
    ) -> Result<()> {
        match (old, new) {
            (None, None) => Ok(()),
            (None, Some(new)) => {
                target.append_child(create_node(new)?)?;
                self.stats.record(Mutations::APPEND);
                Ok(())
            }
            (Some(_), None) => {
                target.remove_child(index)?;
                self.stats.record(Mutations::REMOVE);
                Ok(())
            }
            (Some(old), Some(new)) if changed(old, new) => {
                target.replace_child(index, create_node(new)?)?;
                self.stats.record(Mutations::REPLACE);
                Ok(())
            }
            (Some(Node::Element(old)), Some(Node::Element(new))) => {
                let node = target.child_at(index)?;
                self.patch_attributes(&node, old, new);
                self.patch_children(&node, &old.children, &new.children)
            }
            // Equal text.
            (Some(_), Some(_)) => Ok(()),
        }
    }

    fn patch_attributes<T: RenderTarget>(&mut self, node: &T, old: &Element, new: &Element) {
        for (name, old_value) in &old.attrs {
            if name == KEY_ATTR || !old_value.is_truthy() {
                continue;
            }
            let keep = new.attrs.get(name).is_some_and(AttrValue::is_truthy);
            if keep {
                continue;
            }
            if is_event_attr(name) {
                node.set_property(name, None);
                self.stats.record(Mutations::SET_PROPERTY);
            } else {
                node.remove_attribute(name);
                self.stats.record(Mutations::REMOVE_ATTRIBUTE);
            }
        }

        for (name, value) in &new.attrs {
            if name == KEY_ATTR || !value.is_truthy() {
                continue;
            }
            if old.attrs.get(name) == Some(value) {
                continue;
            }
            if let Some(kind) = apply_attribute(node, name, value) {
                self.stats.record(kind);
            }
        }
    }

    fn patch_children<T: RenderTarget>(&mut self, node: &T, old: &[Node], new: &[Node]) -> Result<()> {
        let partners = pair_children(old, new);

        let mut used = vec![false; old.len()];
        for i in partners.iter().flatten() {
            used[*i] = true;
        }

        for i in (0..old.len()).rev() {
            if !used[i] {
                node.remove_child(i)?;
                self.stats.record(Mutations::REMOVE);
            }
        }

        // Mirror of the target's children: Some(old index) or None (fresh).
        let mut live: Vec<Option<usize>> = (0..old.len()).filter(|&i| used[i]).map(Some).collect();

        for (j, (child, partner)) in new.iter().zip(&partners).enumerate() {
            match *partner {
                Some(i) => {
                    if let Some(pos) = live.iter().position(|slot| *slot == Some(i)) {
                        if pos != j {
                            let moved = node.remove_child(pos)?;
                            node.insert_child(j, moved)?;
                            live.remove(pos);
                            live.insert(j, Some(i));
                            self.stats.record(Mutations::MOVE);
                        }
                    }
                    self.patch(node, Some(&old[i]), Some(child), j)?;
                }
                None => {
                    let fresh = create_node(child)?;
                    if j == node.child_count() {
                        node.append_child(fresh)?;
                        self.stats.record(Mutations::APPEND);
                    } else {
                        node.insert_child(j, fresh)?;
                        self.stats.record(Mutations::INSERT);
                    }
                    live.insert(j, None);
                }
            }
        }

        Ok(())
    }
}

/// Pair each new child with the index of the old child it updates.
fn pair_children(old: &[Node], new: &[Node]) -> Vec<Option<usize>> {
    let mut keyed: HashMap<String, usize> = HashMap::new();
    for (i, child) in old.iter().enumerate() {
        if let Some(key) = child.key() {
            if keyed.contains_key(&key) {
                tracing::warn!(key = %key, "duplicate key among siblings; later occurrence is not reused");
            } else {
                keyed.insert(key, i);
            }
        }
    }

    let mut taken = vec![false; old.len()];
    let mut cursor = 0;
    new.iter()
        .map(|child| {
            let partner = match child.key() {
                Some(key) => keyed.remove(&key),
                None => {
                    while cursor < old.len() && (taken[cursor] || old[cursor].key().is_some()) {
                        cursor += 1;
                    }
                    (cursor < old.len()).then_some(cursor)
                }
            };
            if let Some(i) = partner {
                taken[i] = true;
            }
            partner
        })
        .collect()
}

/// Write one attribute. `on*` names are handler properties, everything else
/// a plain attribute; a value of the wrong sort for its name is dropped.
fn apply_attribute<T: RenderTarget>(node: &T, name: &str, value: &AttrValue) -> Option<Mutations> {
    match (is_event_attr(name), value) {
        (true, AttrValue::Handler(handler)) => {
            node.set_property(name, Some(handler.clone()));
            Some(Mutations::SET_PROPERTY)
        }
        (true, _) => {
            tracing::warn!(attr = name, "event attribute without a handler; ignored");
            None
        }
        (false, AttrValue::Handler(_)) => {
            tracing::warn!(attr = name, "handler under a non-event attribute; ignored");
            None
        }
        (false, plain) => {
            node.set_attribute(name, &plain.render().unwrap_or_default());
            Some(Mutations::SET_ATTRIBUTE)
        }
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Whether two nodes need a wholesale replacement rather than an update.
///
/// True for text vs element, text with different content, or elements of a
/// different kind. Attributes and children never count. Symmetric.
pub fn changed(a: &Node, b: &Node) -> bool {
    match (a, b) {
        (Node::Text(a), Node::Text(b)) => a != b,
        (Node::Element(a), Node::Element(b)) => a.kind != b.kind,
        _ => true,
    }
}

/// Materialize a detached target node for `node`.
///
/// Falsy attributes and the key are skipped; handlers become properties.
pub fn create_node<T: RenderTarget>(node: &Node) -> Result<T> {
    match node {
        Node::Text(text) => Ok(T::create_text(text)),
        Node::Element(el) => {
            let target = T::create_element(&el.kind);
            for (name, value) in &el.attrs {
                if name == KEY_ATTR || !value.is_truthy() {
                    continue;
                }
                apply_attribute(&target, name, value);
            }
            for child in &el.children {
                target.append_child(create_node(child)?)?;
            }
            Ok(target)
        }
    }
}

/// Reconcile child `index` of `target` from `old` to `new`.
pub fn patch<T: RenderTarget>(
    target: &T,
    old: Option<&Node>,
    new: Option<&Node>,
    index: usize,
) -> Result<PatchStats> {
    let mut reconciler = Reconciler::new();
    reconciler.patch(target, old, new, index)?;
    Ok(reconciler.stats())
}

// =============================================================================
// Tests
// =============================================================================
