// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The commit phase.
//!
//! Commit consumes the effect chain a finished build collected at its root
//! and applies each flagged node to the host tree in chain order:
//! placements append host instances to their nearest host container,
//! updates re-apply changed plain attributes, and deletions detach the
//! host instances of removed subtrees. Host mutations happen only here;
//! the build phase merely creates detached instances. Each node's mask is
//! cleared as its effects are applied, so nodes carried into later
//! generations never replay spent flags.
//!
//! The phase ends by swapping the pair's generation pointers: the finished
//! root becomes `current` and the in-progress slot is cleared. A build
//! that failed never reaches commit, so the previously committed tree is
//! observable unchanged on every error path.

use crate::effect::{DELETION, PLACEMENT, UPDATE};
use crate::element::{event_name, PropValue};
use crate::engine::{PairId, Reconciler};
use crate::error::ReconcileError;
use crate::host::{HostHandle, HostTree};
use crate::node::{Instance, NodeId, NodeKind, INVALID};

impl<H: HostTree> Reconciler<H> {
    /// Applies the finished generation's effect chain to the host tree,
    /// then makes it the committed generation.
    pub(crate) fn commit(&mut self, pair: PairId, finished: NodeId) -> Result<(), ReconcileError> {
        let mut effect = self.arena.first_effect(finished);
        while effect != INVALID {
            // Capture the link before the node's chain state is cleared
            // at the end of this step.
            let next = self.arena.next_effect(effect);
            let mask = self.arena.effects(effect);
            tracing::trace!(node = ?effect, mask = ?mask, "commit effect");

            if mask.contains(PLACEMENT) {
                self.commit_placement(effect)?;
            }
            if mask.contains(UPDATE) {
                self.commit_update(effect);
            }
            if mask.contains(DELETION) {
                self.commit_deletion(effect)?;
            }

            // Masks are one-shot: a node flagged again in a later
            // generation must start from a clean slate.
            let spent = self.arena.get_mut(effect);
            spent.effects.clear();
            spent.next_effect = INVALID;

            effect = next;
        }

        let slot = &mut self.pairs[pair.0 as usize];
        slot.current = finished;
        slot.work_in_progress = INVALID;
        tracing::debug!(pair = ?pair, root = ?finished, "generation committed");
        Ok(())
    }

    /// Appends a placed node's host instance to its nearest host
    /// container.
    ///
    /// Placed component nodes carry no instance themselves; their host
    /// descendants were mounted alongside them and carry their own
    /// placement flags.
    fn commit_placement(&mut self, node: NodeId) -> Result<(), ReconcileError> {
        let Instance::Host(handle) = *self.arena.instance(node) else {
            return Ok(());
        };
        let container = self.host_container_for(node)?;
        self.host.append_child(container, handle);
        Ok(())
    }

    /// Re-applies plain attributes that changed since the previous commit.
    ///
    /// The previous values live on the node's alternate, which completed
    /// the prior generation. Listener attributes are skipped: listeners
    /// are registered once at instance creation. The host capability has
    /// no attribute removal, so attributes dropped from the description
    /// keep their last committed value.
    fn commit_update(&mut self, node: NodeId) {
        let Instance::Host(handle) = *self.arena.instance(node) else {
            return;
        };

        let previous = self.arena.alternate(node);
        let new_props = self.arena.pending_props(node).clone();
        for (name, value) in &new_props.attrs {
            if event_name(name).is_some() || matches!(value, PropValue::Handler(_)) {
                continue;
            }
            let unchanged = previous != INVALID
                && self.arena.committed_props(previous).attrs.get(name) == Some(value);
            if !unchanged {
                self.host.set_attribute(handle, name, value);
            }
        }
    }

    /// Detaches a deleted subtree from the host tree.
    ///
    /// The deleted node belongs to the previous generation. Its nearest
    /// host container is resolved through that generation's parent links;
    /// every topmost host instance under the node is removed from it.
    fn commit_deletion(&mut self, node: NodeId) -> Result<(), ReconcileError> {
        let container = self.host_container_for(node)?;
        self.detach_host_descendants(container, node);
        Ok(())
    }

    /// Removes the topmost host instances at or below `node` from
    /// `container`. Descendants of a removed instance leave with it.
    fn detach_host_descendants(&mut self, container: HostHandle, node: NodeId) {
        if let Instance::Host(handle) = *self.arena.instance(node) {
            if self.host.contains_child(container, handle) {
                self.host.remove_child(container, handle);
            }
            return;
        }
        let mut child = self.arena.first_child(node);
        while child != INVALID {
            self.detach_host_descendants(container, child);
            child = self.arena.next_sibling(child);
        }
    }

    /// Resolves the host handle that children of `node`'s parent land in:
    /// the instance of the nearest host ancestor, or the pair's container
    /// when the walk reaches a root.
    fn host_container_for(&self, node: NodeId) -> Result<HostHandle, ReconcileError> {
        let mut ancestor = self.arena.parent(node);
        while ancestor != INVALID {
            match self.arena.kind(ancestor) {
                NodeKind::Host => {
                    return match *self.arena.instance(ancestor) {
                        Instance::Host(handle) => Ok(handle),
                        _ => Err(ReconcileError::UnknownNodeKind(
                            "host ancestor without a host instance",
                        )),
                    };
                }
                NodeKind::Root => {
                    return match *self.arena.instance(ancestor) {
                        Instance::Pair(pair) => Ok(self.pairs[pair.0 as usize].container),
                        _ => Err(ReconcileError::UnknownNodeKind(
                            "root node without pair back-reference",
                        )),
                    };
                }
                _ => ancestor = self.arena.parent(ancestor),
            }
        }
        Err(ReconcileError::UnknownNodeKind(
            "node has no host container ancestor",
        ))
    }
}
