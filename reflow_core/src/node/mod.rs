// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node tree data model.
//!
//! A *node* is one position in the reconciled tree. Each node has:
//!
//! - A [`NodeKind`] tag and a type descriptor (string tag or component
//!   callable) inherited from the description that produced it.
//! - Topology — `parent`, `first_child`, and `next_sibling` links forming
//!   an ordered tree, plus a `child_index` contiguous under each parent.
//! - **Pending vs. committed payload** — `pending_props` from the latest
//!   description, `committed_props` recorded when the node last completed,
//!   a derived `memoized_state`, and an optional [`UpdateQueue`].
//! - **Effect state** — a per-node [`EffectMask`], a subtree mask, and the
//!   `first_effect`/`last_effect`/`next_effect` links that thread the
//!   bottom-up effect chain.
//! - An `alternate` back-reference to the node's counterpart in the other
//!   tree generation. The pairing is symmetric and mutually assigned; it is
//!   never traversed structurally, only used for generation lookup.
//!
//! Nodes are stored in a [`NodeArena`] (`Vec` slots addressed by
//! [`NodeId`]). Generations are recycled, not freed: an alternate that
//! already exists from two generations ago is reset in place rather than
//! reallocated, so a steady-state rebuild allocates nothing.

mod arena;
mod id;
mod traverse;

pub use arena::NodeArena;
pub use id::{NodeId, INVALID};
pub use traverse::Children;

use crate::effect::EffectMask;
use crate::element::{ElementType, Props};
use crate::engine::PairId;
use crate::host::HostHandle;
use crate::update::{StateValue, UpdateQueue};

/// The kind tag of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The top of a tree pair. Its instance slot back-references the pair.
    Root,
    /// A primitive element backed by a created target-tree node.
    Host,
    /// A text leaf backed by a created target-tree text node.
    Text,
    /// A component function; invoked with props to derive children.
    FunctionComponent,
    /// A stateful component. Child derivation is structural (from props),
    /// the instantiation lifecycle lives outside this core.
    StatefulComponent,
}

/// The externally-owned instance slot of a node.
#[derive(Clone, Debug, Default)]
pub enum Instance {
    /// Nothing created yet. Every node starts here; host and text nodes
    /// leave it when `complete_work` creates their target-tree node.
    #[default]
    None,
    /// The created target-tree node.
    Host(HostHandle),
    /// Back-reference from a root node to its tree pair.
    Pair(PairId),
    /// A persisted component-state object, stored on behalf of the
    /// external stateful-component mechanism.
    State(StateValue),
}

/// One position in the reconciled tree.
#[derive(Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) key: Option<String>,
    pub(crate) ty: Option<ElementType>,
    pub(crate) instance: Instance,
    /// Text content, for `Text` nodes only.
    pub(crate) text: Option<String>,

    // -- Topology --
    pub(crate) parent: NodeId,
    pub(crate) first_child: NodeId,
    pub(crate) next_sibling: NodeId,
    pub(crate) child_index: u32,

    // -- Payload --
    pub(crate) pending_props: Props,
    pub(crate) committed_props: Props,
    pub(crate) memoized_state: StateValue,
    pub(crate) queue: Option<Box<UpdateQueue>>,

    // -- Effects --
    pub(crate) effects: EffectMask,
    pub(crate) subtree_effects: EffectMask,
    pub(crate) first_effect: NodeId,
    pub(crate) last_effect: NodeId,
    pub(crate) next_effect: NodeId,

    // -- Pairing --
    pub(crate) alternate: NodeId,
}

impl Node {
    /// Creates a detached node of the given kind with empty payload.
    pub(crate) fn detached(kind: NodeKind) -> Self {
        Self {
            kind,
            key: None,
            ty: None,
            instance: Instance::None,
            text: None,
            parent: INVALID,
            first_child: INVALID,
            next_sibling: INVALID,
            child_index: 0,
            pending_props: Props::new(),
            committed_props: Props::new(),
            memoized_state: StateValue::Null,
            queue: None,
            effects: EffectMask::NONE,
            subtree_effects: EffectMask::NONE,
            first_effect: INVALID,
            last_effect: INVALID,
            next_effect: INVALID,
            alternate: INVALID,
        }
    }
}
