// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node identity.

use core::fmt;

/// Sentinel value indicating "no node" in link fields.
pub const INVALID: NodeId = NodeId(u32::MAX);

/// A handle to a node in a [`NodeArena`](super::NodeArena).
///
/// Plain slot index. Node slots are recycled across generations via the
/// alternate pairing rather than freed, so there is no generation counter;
/// a handle stays meaningful for the lifetime of its arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == INVALID {
            write!(f, "NodeId(invalid)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}
