// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The depth-first work loop.
//!
//! A build walks the work-in-progress tree in strict
//! pre-order-then-post-order: [`begin_work`](Reconciler::begin_work) runs
//! on the way down and returns the node's first child to descend into;
//! once a node has no undescended children,
//! [`complete_work`](Reconciler::complete_work) runs on the way up, then
//! the loop advances to the next sibling or keeps completing ancestors
//! until one has an unvisited sibling or the root is reached.
//!
//! `begin_work` materializes the node's state from its update queue, then
//! derives the desired children by kind (root: from state; host and
//! stateful nodes: from pending props; function components: by invoking
//! the component). Each node's children are either *mounted* (created
//! fresh from descriptions, flagged for placement) or *cloned* (the
//! previous generation's child list carried over via alternates). Cloning
//! does not re-diff against a new description list — no keyed reordering,
//! insertion, or removal mid-tree. Only the root's description is
//! re-evaluated structurally; this is a deliberate limitation, not an
//! oversight.
//!
//! `complete_work` creates host instances for first-time host and text
//! nodes, records committed props, and splices the node's collected effect
//! chain onto its parent's, appending the node itself last when its own
//! mask is non-empty. By the time the root completes, the chain lists
//! exactly the flagged nodes in pre-order position.

use crate::effect::{DELETION, PLACEMENT, UPDATE};
use crate::element::{event_name, ChildValue, ElementType, PropValue};
use crate::engine::{PairId, Reconciler};
use crate::error::ReconcileError;
use crate::host::HostTree;
use crate::node::{Instance, NodeId, NodeKind, INVALID};

impl<H: HostTree> Reconciler<H> {
    /// Builds a full work-in-progress generation for `pair`.
    ///
    /// Returns the finished in-progress root. On error the caller discards
    /// the generation.
    pub(crate) fn run_build(&mut self, pair: PairId) -> Result<NodeId, ReconcileError> {
        let current = self.pairs[pair.0 as usize].current;
        let props = self.arena.pending_props(current).clone();
        let wip_root = self.arena.create_alternate(current, props);
        self.arena.get_mut(wip_root).parent = INVALID;
        self.pairs[pair.0 as usize].work_in_progress = wip_root;

        let mut next = wip_root;
        while next != INVALID {
            next = self.perform_unit(next)?;
        }
        Ok(wip_root)
    }

    /// Visits one node: begins it, and if it yields no child to descend
    /// into, completes it (and any finished ancestors) before returning
    /// the next node to visit.
    fn perform_unit(&mut self, unit: NodeId) -> Result<NodeId, ReconcileError> {
        let child = self.begin_work(unit)?;
        if child != INVALID {
            return Ok(child);
        }

        let mut node = unit;
        loop {
            self.complete_work(node)?;
            let sibling = self.arena.next_sibling(node);
            if sibling != INVALID {
                return Ok(sibling);
            }
            node = self.arena.parent(node);
            if node == INVALID {
                return Ok(INVALID);
            }
        }
    }

    /// The way-down visit: materializes state, derives desired children,
    /// and reconciles them. Returns the first child, or [`INVALID`] for a
    /// leaf.
    fn begin_work(&mut self, wip: NodeId) -> Result<NodeId, ReconcileError> {
        let callbacks = self.arena.process_updates(wip);
        self.pending_callbacks.extend(callbacks);

        let kind = self.arena.kind(wip);
        tracing::trace!(node = ?wip, kind = ?kind, "begin work");

        let desired: Vec<ChildValue> = match kind {
            NodeKind::Root => match self.arena.memoized_state(wip) {
                crate::update::StateValue::Element(el) => vec![ChildValue::Element(el.clone())],
                _ => Vec::new(),
            },
            NodeKind::Host | NodeKind::StatefulComponent => {
                self.arena.pending_props(wip).children.clone()
            }
            NodeKind::FunctionComponent => {
                let ty = self.arena.get(wip).ty.clone();
                let Some(ElementType::Function(body)) = ty else {
                    return Err(ReconcileError::UnknownNodeKind(
                        "function component without a callable type",
                    ));
                };
                let props = self.arena.pending_props(wip).clone();
                match body(&props) {
                    Some(el) => vec![ChildValue::Element(el)],
                    None => Vec::new(),
                }
            }
            NodeKind::Text => return Ok(INVALID),
        };

        self.reconcile_children(wip, &desired)?;
        Ok(self.arena.first_child(wip))
    }

    /// Chooses mount, clone, or wholesale deletion for a node's children.
    fn reconcile_children(
        &mut self,
        wip: NodeId,
        desired: &[ChildValue],
    ) -> Result<(), ReconcileError> {
        let current = self.arena.alternate(wip);
        let has_previous = current != INVALID && self.arena.first_child(current) != INVALID;

        if !has_previous {
            self.mount_children(wip, desired)
        } else if desired.is_empty() {
            self.delete_children(wip, current);
            Ok(())
        } else {
            self.clone_children(current, wip)
        }
    }

    /// First-time creation of a node's children from descriptions.
    ///
    /// Null and `false` entries are skipped; bare text and numbers become
    /// text nodes. Every created child is flagged for placement.
    fn mount_children(&mut self, wip: NodeId, desired: &[ChildValue]) -> Result<(), ReconcileError> {
        let mut previous = INVALID;
        let mut index = 0u32;

        for entry in desired {
            let child = match entry {
                ChildValue::Null | ChildValue::Bool(false) => continue,
                ChildValue::Bool(true) => {
                    return Err(ReconcileError::UnrecognizedNodeKind(
                        "bare `true` in a children list",
                    ))
                }
                ChildValue::Text(text) => self.arena.create_text(text.clone()),
                ChildValue::Num(value) => self.arena.create_text(format_number(*value)),
                ChildValue::Element(el) => self.arena.create_from_description(el),
            };

            {
                let node = self.arena.get_mut(child);
                node.parent = wip;
                node.child_index = index;
                node.effects.insert(PLACEMENT);
            }
            if previous == INVALID {
                self.arena.get_mut(wip).first_child = child;
            } else {
                self.arena.get_mut(previous).next_sibling = child;
            }
            previous = child;
            index += 1;
        }

        if previous == INVALID {
            self.arena.get_mut(wip).first_child = INVALID;
        }
        Ok(())
    }

    /// Carries the previous generation's child list into the in-progress
    /// generation via alternates.
    ///
    /// Each child's pending props are reused from the child itself; the
    /// desired description list is not re-diffed (see module docs).
    fn clone_children(&mut self, current: NodeId, wip: NodeId) -> Result<(), ReconcileError> {
        if self.arena.first_child(wip) != self.arena.first_child(current) {
            // A diverged child pointer means a partially-built generation,
            // which this synchronous loop never legitimately produces.
            return Err(ReconcileError::ResumeNotSupported);
        }

        let mut old_child = self.arena.first_child(current);
        let mut previous = INVALID;
        while old_child != INVALID {
            let props = self.arena.pending_props(old_child).clone();
            let new_child = self.arena.create_alternate(old_child, props);
            {
                let node = self.arena.get_mut(new_child);
                node.parent = wip;
                node.next_sibling = INVALID;
            }
            if previous == INVALID {
                self.arena.get_mut(wip).first_child = new_child;
            } else {
                self.arena.get_mut(previous).next_sibling = new_child;
            }
            previous = new_child;
            old_child = self.arena.next_sibling(old_child);
        }
        Ok(())
    }

    /// Flags every previous top-level child for deletion and leaves the
    /// in-progress node childless.
    ///
    /// The flagged nodes belong to the previous generation; they join the
    /// in-progress parent's effect chain so commit can detach them.
    fn delete_children(&mut self, wip: NodeId, current: NodeId) {
        let mut child = self.arena.first_child(current);
        while child != INVALID {
            self.arena.get_mut(child).effects.insert(DELETION);
            self.append_effect(wip, child);
            child = self.arena.next_sibling(child);
        }
        self.arena.get_mut(wip).subtree_effects.insert(DELETION);
        self.arena.get_mut(wip).first_child = INVALID;
    }

    /// The way-up visit: kind-specific finalization, then effect
    /// aggregation onto the parent.
    fn complete_work(&mut self, wip: NodeId) -> Result<(), ReconcileError> {
        let kind = self.arena.kind(wip);
        tracing::trace!(node = ?wip, kind = ?kind, "complete work");

        match kind {
            NodeKind::Host => {
                if matches!(self.arena.instance(wip), Instance::None) {
                    self.create_host_instance(wip)?;
                } else {
                    self.arena.get_mut(wip).effects.insert(UPDATE);
                }
            }
            NodeKind::Text => {
                if matches!(self.arena.instance(wip), Instance::None) {
                    let content = self.arena.text(wip).unwrap_or_default().to_owned();
                    let handle = self.host.create_text_node(&content);
                    self.arena.get_mut(wip).instance = Instance::Host(handle);
                } else {
                    self.arena.get_mut(wip).effects.insert(UPDATE);
                }
            }
            NodeKind::Root | NodeKind::FunctionComponent | NodeKind::StatefulComponent => {}
        }

        let committed = self.arena.get(wip).pending_props.clone();
        self.arena.get_mut(wip).committed_props = committed;

        self.aggregate_effects(wip);
        Ok(())
    }

    /// Creates the target-tree node for a first-time host node and applies
    /// its attributes and listeners.
    fn create_host_instance(&mut self, wip: NodeId) -> Result<(), ReconcileError> {
        let Some(ElementType::Tag(tag)) = self.arena.get(wip).ty.clone() else {
            return Err(ReconcileError::UnknownNodeKind(
                "host node without a tag type",
            ));
        };
        let handle = self.host.create_element_node(&tag);

        let props = self.arena.pending_props(wip).clone();
        for (name, value) in &props.attrs {
            match (event_name(name), value) {
                (Some(event), PropValue::Handler(handler)) => {
                    self.host.register_listener(handle, &event, handler.clone());
                }
                _ => self.host.set_attribute(handle, name, value),
            }
        }

        self.arena.get_mut(wip).instance = Instance::Host(handle);
        Ok(())
    }

    /// Splices `wip`'s collected chain onto its parent's, then appends
    /// `wip` itself if its own mask is non-empty.
    fn aggregate_effects(&mut self, wip: NodeId) {
        let parent = self.arena.parent(wip);
        if parent == INVALID {
            return;
        }

        let (wip_first, wip_last, own_mask, subtree_mask) = {
            let node = self.arena.get(wip);
            (
                node.first_effect,
                node.last_effect,
                node.effects,
                node.subtree_effects,
            )
        };

        if wip_first != INVALID {
            let parent_last = self.arena.get(parent).last_effect;
            if parent_last == INVALID {
                self.arena.get_mut(parent).first_effect = wip_first;
            } else {
                self.arena.get_mut(parent_last).next_effect = wip_first;
            }
            self.arena.get_mut(parent).last_effect = wip_last;
        }

        self.arena.get_mut(parent).subtree_effects |= subtree_mask | own_mask;

        if !own_mask.is_empty() {
            self.append_effect(parent, wip);
        }
    }

    /// Appends `node` to the tail of `owner`'s effect chain.
    fn append_effect(&mut self, owner: NodeId, node: NodeId) {
        self.arena.get_mut(node).next_effect = INVALID;
        let last = self.arena.get(owner).last_effect;
        if last == INVALID {
            self.arena.get_mut(owner).first_effect = node;
        } else {
            self.arena.get_mut(last).next_effect = node;
        }
        self.arena.get_mut(owner).last_effect = node;
    }
}

/// Renders a bare number child the way a text node shows it: integral
/// values without a trailing fraction.
///
/// The integer fast path only covers values that fit `i64`; the cast
/// would saturate beyond that.
fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 2f64.powi(63) {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::format_number;

    #[test]
    fn integral_numbers_render_without_fraction() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(-2.0), "-2");
    }

    #[test]
    fn fractional_numbers_keep_their_digits() {
        assert_eq!(format_number(1.5), "1.5");
    }

    #[test]
    fn out_of_range_integral_values_keep_float_rendering() {
        // Beyond i64 the cast would saturate; the float rendering is kept.
        assert_eq!(format_number(1e30), 1e30_f64.to_string());
        assert_ne!(format_number(1e30), i64::MAX.to_string());
        assert_ne!(format_number(-1e30), i64::MIN.to_string());
    }
}
