// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena storage and node lifecycle operations.
//!
//! All nodes of all generations live in one [`NodeArena`], addressed by
//! [`NodeId`]. Two lifecycle operations matter to the work loop:
//!
//! - [`create_from_description`](NodeArena::create_from_description) builds
//!   a fresh node from an external description, inferring its kind from the
//!   description's type.
//! - [`create_alternate`](NodeArena::create_alternate) produces the
//!   work-in-progress counterpart of a committed node: a new node on the
//!   first rebuild, a recycled one (reset in place) on every rebuild after
//!   that, keeping steady-state builds allocation-free.

use crate::effect::EffectMask;
use crate::element::{Element, ElementType, Props};
use crate::engine::PairId;
use crate::update::{StateValue, UpdateEntry, UpdateQueue};

use super::id::{NodeId, INVALID};
use super::traverse::Children;
use super::{Instance, Node, NodeKind};

/// Arena storage for all nodes.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of allocated node slots (all generations).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the arena has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        debug_assert!(self.nodes.len() < u32::MAX as usize, "node arena full");
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    // -- Lifecycle operations --

    /// Allocates the root node of a tree pair.
    pub(crate) fn create_root(&mut self, pair: PairId) -> NodeId {
        let mut node = Node::detached(NodeKind::Root);
        node.instance = Instance::Pair(pair);
        self.alloc(node)
    }

    /// Builds a fresh node from a description.
    ///
    /// The kind is inferred from the description's type: a string tag gives
    /// a host node, a plain callable a function component, and a callable
    /// carrying the stateful marker a stateful component. Pending props are
    /// taken from the description; structural links start unset.
    pub fn create_from_description(&mut self, description: &Element) -> NodeId {
        let kind = match description.ty {
            ElementType::Tag(_) => NodeKind::Host,
            ElementType::Function(_) => NodeKind::FunctionComponent,
            ElementType::Stateful(_) => NodeKind::StatefulComponent,
        };
        let mut node = Node::detached(kind);
        node.key = description.key.clone();
        node.ty = Some(description.ty.clone());
        node.pending_props = description.props.clone();
        self.alloc(node)
    }

    /// Builds a fresh text node with the given content.
    pub(crate) fn create_text(&mut self, content: String) -> NodeId {
        let mut node = Node::detached(NodeKind::Text);
        node.text = Some(content);
        self.alloc(node)
    }

    /// Returns the node to use as `node`'s work-in-progress counterpart.
    ///
    /// With no existing alternate, allocates a new node sharing `node`'s
    /// identity fields (kind, key, type, instance) with a cleared effect
    /// mask and links the pair bidirectionally. An alternate left over from
    /// two generations ago is recycled in place: its effect state is reset
    /// and its pending props replaced, with no new allocation.
    ///
    /// In both cases structural links and the child index are copied
    /// forward from `node` as a starting point for the traversal to
    /// overwrite.
    pub fn create_alternate(&mut self, node: NodeId, pending_props: Props) -> NodeId {
        let alt = self.get(node).alternate;
        let alt = if alt == INVALID {
            let src = self.get(node);
            let mut fresh = Node::detached(src.kind);
            fresh.key = src.key.clone();
            fresh.ty = src.ty.clone();
            fresh.instance = src.instance.clone();
            fresh.text = src.text.clone();
            fresh.memoized_state = src.memoized_state.clone();
            fresh.committed_props = src.committed_props.clone();
            fresh.pending_props = pending_props;
            fresh.alternate = node;
            let id = self.alloc(fresh);
            self.get_mut(node).alternate = id;
            id
        } else {
            let src = self.get(node);
            let key = src.key.clone();
            let instance = src.instance.clone();
            let text = src.text.clone();
            let memoized_state = src.memoized_state.clone();
            let committed_props = src.committed_props.clone();

            let recycled = self.get_mut(alt);
            recycled.key = key;
            recycled.instance = instance;
            recycled.text = text;
            recycled.memoized_state = memoized_state;
            recycled.committed_props = committed_props;
            recycled.pending_props = pending_props;
            recycled.effects.clear();
            recycled.subtree_effects.clear();
            recycled.first_effect = INVALID;
            recycled.last_effect = INVALID;
            recycled.next_effect = INVALID;
            alt
        };

        let (first_child, next_sibling, child_index) = {
            let src = self.get(node);
            (src.first_child, src.next_sibling, src.child_index)
        };
        let wip = self.get_mut(alt);
        wip.first_child = first_child;
        wip.next_sibling = next_sibling;
        wip.child_index = child_index;
        alt
    }

    /// Appends a pending update entry to `node`'s queue in O(1).
    ///
    /// A node without a queue gets one whose base is the node's current
    /// derived state.
    pub fn enqueue_update(&mut self, node: NodeId, entry: UpdateEntry) {
        let target = self.get_mut(node);
        if target.queue.is_none() {
            let base = target.memoized_state.clone();
            target.queue = Some(Box::new(UpdateQueue::new(base)));
        }
        if let Some(queue) = target.queue.as_mut() {
            queue.enqueue(entry);
        }
    }

    // -- Read accessors --

    /// Returns the kind of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.get(id).kind
    }

    /// Returns the identity key of a node, if any.
    #[must_use]
    pub fn key(&self, id: NodeId) -> Option<&str> {
        self.get(id).key.as_deref()
    }

    /// Returns the parent of a node, or [`INVALID`].
    #[must_use]
    pub fn parent(&self, id: NodeId) -> NodeId {
        self.get(id).parent
    }

    /// Returns the first child of a node, or [`INVALID`].
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> NodeId {
        self.get(id).first_child
    }

    /// Returns the next sibling of a node, or [`INVALID`].
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> NodeId {
        self.get(id).next_sibling
    }

    /// Returns the position of a node under its parent.
    #[must_use]
    pub fn child_index(&self, id: NodeId) -> u32 {
        self.get(id).child_index
    }

    /// Returns the node's counterpart in the other generation, or
    /// [`INVALID`].
    #[must_use]
    pub fn alternate(&self, id: NodeId) -> NodeId {
        self.get(id).alternate
    }

    /// Returns the node's own pending effect mask.
    #[must_use]
    pub fn effects(&self, id: NodeId) -> EffectMask {
        self.get(id).effects
    }

    /// Returns the union of the effect masks in the node's subtree.
    #[must_use]
    pub fn subtree_effects(&self, id: NodeId) -> EffectMask {
        self.get(id).subtree_effects
    }

    /// Returns the head of the node's collected effect chain, or
    /// [`INVALID`].
    #[must_use]
    pub fn first_effect(&self, id: NodeId) -> NodeId {
        self.get(id).first_effect
    }

    /// Returns the next node in the effect chain after `id`, or
    /// [`INVALID`].
    #[must_use]
    pub fn next_effect(&self, id: NodeId) -> NodeId {
        self.get(id).next_effect
    }

    /// Returns the node's instance slot.
    #[must_use]
    pub fn instance(&self, id: NodeId) -> &Instance {
        &self.get(id).instance
    }

    /// Returns the text content of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).text.as_deref()
    }

    /// Returns the node's derived state.
    #[must_use]
    pub fn memoized_state(&self, id: NodeId) -> &StateValue {
        &self.get(id).memoized_state
    }

    /// Returns the node's pending props.
    #[must_use]
    pub fn pending_props(&self, id: NodeId) -> &Props {
        &self.get(id).pending_props
    }

    /// Returns the props recorded when the node last completed.
    #[must_use]
    pub fn committed_props(&self, id: NodeId) -> &Props {
        &self.get(id).committed_props
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children::new(self, self.get(id).first_child)
    }

    /// Renders the subtree under `root` as an indented diagnostic listing.
    #[must_use]
    pub fn debug_tree(&self, root: NodeId) -> String {
        let mut out = String::new();
        self.debug_tree_into(root, 0, &mut out);
        out
    }

    fn debug_tree_into(&self, id: NodeId, depth: usize, out: &mut String) {
        use core::fmt::Write as _;

        let node = self.get(id);
        let label = match node.kind {
            NodeKind::Root => "root".to_owned(),
            NodeKind::Host => match &node.ty {
                Some(ElementType::Tag(tag)) => format!("<{tag}>"),
                _ => "<?>".to_owned(),
            },
            NodeKind::Text => format!("{:?}", node.text.as_deref().unwrap_or("")),
            NodeKind::FunctionComponent => "fn()".to_owned(),
            NodeKind::StatefulComponent => "stateful()".to_owned(),
        };
        let _ = writeln!(
            out,
            "{:indent$}{label} {:?} {:?}",
            "",
            id,
            node.effects,
            indent = depth * 2
        );
        let mut child = node.first_child;
        while child != INVALID {
            self.debug_tree_into(child, depth + 1, out);
            child = self.get(child).next_sibling;
        }
    }
}
