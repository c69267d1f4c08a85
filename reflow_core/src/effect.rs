// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Effect mask flags.
//!
//! Each node carries an [`EffectMask`] describing the side effects the
//! commit phase must apply for it, plus a *subtree* mask that unions the
//! masks of its descendants. The subtree mask is maintained so a future
//! traversal could skip clean subtrees; the current work loop always visits
//! every node and only the per-node mask drives commit behavior.
//!
//! Flags are independent: a node may require both [`PLACEMENT`] and
//! [`UPDATE`] in the same commit, and each is applied separately.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// The node must be attached to its nearest host container at commit.
pub const PLACEMENT: EffectMask = EffectMask(1 << 0);

/// The node's committed attributes must be re-synchronized at commit.
pub const UPDATE: EffectMask = EffectMask(1 << 1);

/// The node must be detached from its host container at commit.
pub const DELETION: EffectMask = EffectMask(1 << 2);

/// A bit set of pending side effects for one node.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EffectMask(u8);

impl EffectMask {
    /// The empty mask.
    pub const NONE: Self = Self(0);

    /// Returns whether no flags are set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns whether every flag in `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the flags in `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears all flags.
    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

impl BitOr for EffectMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for EffectMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for EffectMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "EffectMask(none)");
        }
        let mut parts = Vec::new();
        if self.contains(PLACEMENT) {
            parts.push("placement");
        }
        if self.contains(UPDATE) {
            parts.push("update");
        }
        if self.contains(DELETION) {
            parts.push("deletion");
        }
        write!(f, "EffectMask({})", parts.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mask_contains_nothing() {
        let mask = EffectMask::NONE;
        assert!(mask.is_empty());
        assert!(!mask.contains(PLACEMENT));
        assert!(!mask.contains(UPDATE));
        assert!(!mask.contains(DELETION));
    }

    #[test]
    fn insert_and_contains() {
        let mut mask = EffectMask::NONE;
        mask.insert(PLACEMENT);
        assert!(mask.contains(PLACEMENT));
        assert!(!mask.contains(UPDATE));

        mask |= UPDATE;
        assert!(mask.contains(PLACEMENT | UPDATE));
        assert!(!mask.is_empty());
    }

    #[test]
    fn clear_resets_all_flags() {
        let mut mask = PLACEMENT | DELETION;
        mask.clear();
        assert!(mask.is_empty());
    }

    #[test]
    fn debug_names_set_flags() {
        let mask = PLACEMENT | DELETION;
        assert_eq!(format!("{mask:?}"), "EffectMask(placement|deletion)");
    }
}
