// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::arena::NodeArena;
use super::id::{NodeId, INVALID};

/// An iterator over the direct children of a node.
///
/// Created by [`NodeArena::children`].
#[derive(Debug)]
pub struct Children<'a> {
    arena: &'a NodeArena,
    current: NodeId,
}

impl<'a> Children<'a> {
    pub(crate) fn new(arena: &'a NodeArena, first: NodeId) -> Self {
        Self {
            arena,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let id = self.current;
        self.current = self.arena.get(id).next_sibling;
        Some(id)
    }
}
