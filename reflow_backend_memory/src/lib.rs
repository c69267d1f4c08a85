// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory [`HostTree`] backend.
//!
//! [`MemoryHost`] keeps the target tree as plain vectors: every created
//! node is a slot holding its tag or text, attributes, listeners, and an
//! ordered child list. Handles are slot indices. Besides implementing the
//! mutation capability, the host records every mutation in an ordered
//! [`Op`] log, so tests can assert not just the final tree shape but the
//! exact order the engine touched it in.
//!
//! Nothing here is platform-specific; the same backend serves unit tests
//! and headless embedding.

use std::collections::BTreeMap;

use reflow_core::{EventHandler, HostHandle, HostTree, PropValue};

/// One recorded host mutation, in the order the engine issued it.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    /// An element node was created with the given tag.
    CreateElement(HostHandle, String),
    /// A text node was created with the given content.
    CreateText(HostHandle, String),
    /// An attribute was set on a node.
    SetAttribute(HostHandle, String),
    /// A listener was registered on a node.
    RegisterListener(HostHandle, String),
    /// A node was appended to a container.
    AppendChild(HostHandle, HostHandle),
    /// A node was removed from a container.
    RemoveChild(HostHandle, HostHandle),
}

#[derive(Debug, Default)]
struct MemoryNode {
    tag: Option<String>,
    text: Option<String>,
    attrs: BTreeMap<String, PropValue>,
    listeners: Vec<(String, EventHandler)>,
    children: Vec<HostHandle>,
}

/// A vector-backed host tree with an ordered mutation log.
///
/// Slot 0 is the root container, available from
/// [`container`](MemoryHost::container) before any engine work happens.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<MemoryNode>,
    ops: Vec<Op>,
}

impl MemoryHost {
    /// Creates a host with a single empty container node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![MemoryNode::default()],
            ops: Vec::new(),
        }
    }

    /// Returns the root container handle.
    #[must_use]
    pub fn container(&self) -> HostHandle {
        HostHandle(0)
    }

    /// Returns the number of created nodes, container included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the recorded mutations in issue order.
    #[must_use]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Clears the mutation log without touching the tree.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Returns the ordered children of a node.
    #[must_use]
    pub fn children_of(&self, node: HostHandle) -> &[HostHandle] {
        &self.node(node).children
    }

    /// Returns the tag of an element node, or `None` for text nodes and
    /// the container.
    #[must_use]
    pub fn tag_of(&self, node: HostHandle) -> Option<&str> {
        self.node(node).tag.as_deref()
    }

    /// Returns the content of a text node.
    #[must_use]
    pub fn text_of(&self, node: HostHandle) -> Option<&str> {
        self.node(node).text.as_deref()
    }

    /// Returns an attribute value set on a node.
    #[must_use]
    pub fn attr_of(&self, node: HostHandle, name: &str) -> Option<&PropValue> {
        self.node(node).attrs.get(name)
    }

    /// Returns the event names with listeners registered on a node.
    #[must_use]
    pub fn listener_events(&self, node: HostHandle) -> Vec<&str> {
        self.node(node)
            .listeners
            .iter()
            .map(|(event, _)| event.as_str())
            .collect()
    }

    /// Invokes every listener registered on `node` for `event`.
    pub fn dispatch(&self, node: HostHandle, event: &str) {
        for (name, handler) in &self.node(node).listeners {
            if name == event {
                handler.call();
            }
        }
    }

    fn node(&self, handle: HostHandle) -> &MemoryNode {
        &self.nodes[handle.0 as usize]
    }

    fn node_mut(&mut self, handle: HostHandle) -> &mut MemoryNode {
        &mut self.nodes[handle.0 as usize]
    }

    fn mint(&mut self, node: MemoryNode) -> HostHandle {
        let handle = HostHandle(self.nodes.len() as u64);
        self.nodes.push(node);
        handle
    }
}

impl HostTree for MemoryHost {
    fn create_element_node(&mut self, tag: &str) -> HostHandle {
        let handle = self.mint(MemoryNode {
            tag: Some(tag.to_owned()),
            ..MemoryNode::default()
        });
        tracing::trace!(node = ?handle, tag, "create element");
        self.ops.push(Op::CreateElement(handle, tag.to_owned()));
        handle
    }

    fn create_text_node(&mut self, content: &str) -> HostHandle {
        let handle = self.mint(MemoryNode {
            text: Some(content.to_owned()),
            ..MemoryNode::default()
        });
        tracing::trace!(node = ?handle, content, "create text");
        self.ops.push(Op::CreateText(handle, content.to_owned()));
        handle
    }

    fn set_attribute(&mut self, node: HostHandle, name: &str, value: &PropValue) {
        self.node_mut(node).attrs.insert(name.to_owned(), value.clone());
        self.ops.push(Op::SetAttribute(node, name.to_owned()));
    }

    fn register_listener(&mut self, node: HostHandle, event: &str, handler: EventHandler) {
        self.node_mut(node).listeners.push((event.to_owned(), handler));
        self.ops.push(Op::RegisterListener(node, event.to_owned()));
    }

    fn append_child(&mut self, container: HostHandle, child: HostHandle) {
        tracing::trace!(container = ?container, child = ?child, "append child");
        self.node_mut(container).children.push(child);
        self.ops.push(Op::AppendChild(container, child));
    }

    fn remove_child(&mut self, container: HostHandle, child: HostHandle) {
        tracing::trace!(container = ?container, child = ?child, "remove child");
        self.node_mut(container).children.retain(|c| *c != child);
        self.ops.push(Op::RemoveChild(container, child));
    }

    fn contains_child(&self, container: HostHandle, child: HostHandle) -> bool {
        self.node(container).children.contains(&child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_exists_before_any_ops() {
        let host = MemoryHost::new();
        assert_eq!(host.node_count(), 1);
        assert!(host.children_of(host.container()).is_empty());
        assert!(host.ops().is_empty());
    }

    #[test]
    fn handles_are_minted_sequentially() {
        let mut host = MemoryHost::new();
        let a = host.create_element_node("div");
        let b = host.create_text_node("Hi");
        assert_ne!(a, b);
        assert_eq!(host.tag_of(a), Some("div"));
        assert_eq!(host.text_of(b), Some("Hi"));
    }

    #[test]
    fn append_and_remove_maintain_child_order() {
        let mut host = MemoryHost::new();
        let container = host.container();
        let a = host.create_element_node("a");
        let b = host.create_element_node("b");
        host.append_child(container, a);
        host.append_child(container, b);
        assert_eq!(host.children_of(container), &[a, b]);
        assert!(host.contains_child(container, a));

        host.remove_child(container, a);
        assert_eq!(host.children_of(container), &[b]);
        assert!(!host.contains_child(container, a));
    }

    #[test]
    fn dispatch_invokes_matching_listeners_only() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut host = MemoryHost::new();
        let node = host.create_element_node("button");
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        host.register_listener(node, "click", EventHandler::new(move || h.set(h.get() + 1)));
        host.dispatch(node, "click");
        host.dispatch(node, "keydown");
        assert_eq!(hits.get(), 1);
        assert_eq!(host.listener_events(node), vec!["click"]);
    }

    #[test]
    fn ops_record_issue_order() {
        let mut host = MemoryHost::new();
        let container = host.container();
        let div = host.create_element_node("div");
        host.set_attribute(div, "id", &PropValue::Str("x".into()));
        host.append_child(container, div);

        assert_eq!(
            host.ops(),
            &[
                Op::CreateElement(div, "div".into()),
                Op::SetAttribute(div, "id".into()),
                Op::AppendChild(container, div),
            ]
        );
    }
}
