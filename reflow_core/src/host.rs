// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for target-tree integrations.
//!
//! Reflow splits target-specific work into *backend* crates. The engine
//! never touches a real output tree directly; it drives an injected
//! [`HostTree`] capability during `complete_work` (node creation,
//! attributes, listeners) and during commit (structural attachment and
//! removal).
//!
//! # Crate boundaries
//!
//! `reflow_core` owns the node data model, the work loop, and this
//! contract module. Backend crates depend on `reflow_core` and map
//! [`HostHandle`]s to platform objects (DOM elements, native views, or an
//! in-memory tree for tests). Application code wires a backend and the
//! [`Reconciler`](crate::engine::Reconciler) together.
//!
//! # Handle lifecycle
//!
//! Handles are opaque to the engine. The backend mints one per created
//! node and must keep it valid until the node is removed from its
//! container; the engine never forges or arithmetic-derives handles.

use core::fmt;

use crate::element::{EventHandler, PropValue};

/// An opaque reference to a node in the external target tree.
///
/// Minted by the backend from [`HostTree::create_element_node`] or
/// [`HostTree::create_text_node`]; also used for the root attachment
/// container passed to
/// [`create_tree_pair`](crate::engine::Reconciler::create_tree_pair).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostHandle(pub u64);

impl fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostHandle({})", self.0)
    }
}

/// Mutation capability for the external target tree.
///
/// All methods are infallible from the engine's perspective: the engine
/// applies effects only after a full traversal has succeeded, and backend
/// failures (if any) are the backend's own concern to surface.
pub trait HostTree {
    /// Creates an element node for the given type tag and returns its handle.
    fn create_element_node(&mut self, tag: &str) -> HostHandle;

    /// Creates a text node with the given content and returns its handle.
    fn create_text_node(&mut self, content: &str) -> HostHandle;

    /// Sets a plain attribute on a node.
    fn set_attribute(&mut self, node: HostHandle, name: &str, value: &PropValue);

    /// Registers an event listener on a node.
    fn register_listener(&mut self, node: HostHandle, event: &str, handler: EventHandler);

    /// Appends `child` as the last child of `container`.
    fn append_child(&mut self, container: HostHandle, child: HostHandle);

    /// Removes `child` from `container`.
    fn remove_child(&mut self, container: HostHandle, child: HostHandle);

    /// Returns whether `child` is currently a direct child of `container`.
    fn contains_child(&self, container: HostHandle, child: HostHandle) -> bool;
}
