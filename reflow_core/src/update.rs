// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node pending update queues.
//!
//! Each change request becomes an [`UpdateEntry`] appended to the target
//! node's [`UpdateQueue`]. Pending entries form a circular singly-linked
//! ring: the queue stores only the tail index, and the tail's `next` link
//! always points at the head, so appending is O(1). Processing *cuts* the
//! ring — breaking the tail's link turns it into a proper list starting at
//! the head — and folds every entry, in enqueue (FIFO) order, onto the
//! queue's base state.
//!
//! Payloads are a closed tagged variant ([`UpdatePayload`]): wholesale
//! replacement, shallow map merge, or a pure function of the previous
//! state and the node's pending props. Entries are consumed by the fold
//! and never retained; a cut ring starts empty for subsequent enqueues.

use std::collections::BTreeMap;
use std::fmt;

use crate::element::{Element, PropValue, Props};
use crate::node::{NodeArena, NodeId, INVALID};

/// Sentinel for "no entry" in ring links.
const NONE: u32 = u32::MAX;

/// A node's derived state value.
#[derive(Clone, Debug, Default)]
pub enum StateValue {
    /// No state. The root's state before the first update, and the result
    /// of replacing the root description with nothing.
    #[default]
    Null,
    /// A desired node description. The root's state is the description of
    /// its single child tree.
    Element(Element),
    /// A keyed bag of values, the shape produced by partial merges.
    Map(BTreeMap<String, PropValue>),
}

/// Called after the commit that folded the entry's payload.
pub type UpdateCallback = Box<dyn FnOnce()>;

/// The change carried by one update entry.
pub enum UpdatePayload {
    /// Replace the state wholesale.
    Replace(StateValue),
    /// Shallow-merge the given keys onto the state. Merging onto a
    /// non-map state replaces it with just the given keys.
    Merge(BTreeMap<String, PropValue>),
    /// Compute the next state from the previous state and the node's
    /// pending props.
    Apply(Box<dyn Fn(&StateValue, &Props) -> StateValue>),
}

impl fmt::Debug for UpdatePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace(v) => f.debug_tuple("Replace").field(v).finish(),
            Self::Merge(m) => f.debug_tuple("Merge").field(m).finish(),
            Self::Apply(_) => write!(f, "Apply(..)"),
        }
    }
}

/// One pending change request.
pub struct UpdateEntry {
    /// What to do to the state.
    pub payload: UpdatePayload,
    /// Optional completion callback, fired after the folding commit.
    pub callback: Option<UpdateCallback>,
    /// Ring link to the next entry.
    next: u32,
}

impl UpdateEntry {
    /// Creates an entry with no callback.
    #[must_use]
    pub fn new(payload: UpdatePayload) -> Self {
        Self {
            payload,
            callback: None,
            next: NONE,
        }
    }

    /// Creates an entry with a completion callback.
    #[must_use]
    pub fn with_callback(payload: UpdatePayload, callback: UpdateCallback) -> Self {
        Self {
            payload,
            callback: Some(callback),
            next: NONE,
        }
    }
}

impl fmt::Debug for UpdateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateEntry")
            .field("payload", &self.payload)
            .field("has_callback", &self.callback.is_some())
            .field("next", &self.next)
            .finish()
    }
}

/// Pending update ring plus the base state it folds onto.
pub struct UpdateQueue {
    base_state: StateValue,
    entries: Vec<Option<UpdateEntry>>,
    tail: u32,
}

impl fmt::Debug for UpdateQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateQueue")
            .field("base_state", &self.base_state)
            .field("pending", &self.len())
            .finish()
    }
}

impl UpdateQueue {
    /// Creates a queue with an empty pending ring and the given base.
    #[must_use]
    pub fn new(base_state: StateValue) -> Self {
        Self {
            base_state,
            entries: Vec::new(),
            tail: NONE,
        }
    }

    /// Returns the current base state.
    #[must_use]
    pub fn base_state(&self) -> &StateValue {
        &self.base_state
    }

    /// Returns whether the pending ring is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tail == NONE
    }

    /// Returns the number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|slot| slot.is_some()).count()
    }

    /// Appends an entry to the pending ring in O(1).
    ///
    /// An empty ring becomes a self-loop; otherwise the entry is spliced
    /// in after the current tail and becomes the new tail, preserving the
    /// invariant that the tail's `next` points at the head.
    pub fn enqueue(&mut self, mut entry: UpdateEntry) {
        let idx = u32::try_from(self.entries.len()).unwrap_or(NONE - 1);
        if self.tail == NONE {
            entry.next = idx;
        } else {
            let tail = self
                .entries
                .get_mut(self.tail as usize)
                .and_then(Option::as_mut);
            if let Some(tail) = tail {
                entry.next = tail.next;
                tail.next = idx;
            } else {
                entry.next = idx;
            }
        }
        self.entries.push(Some(entry));
        self.tail = idx;
    }

    /// Cuts the ring into FIFO order and returns the entries.
    ///
    /// The ring is left empty; enqueues after a cut start a fresh ring.
    fn cut(&mut self) -> Vec<UpdateEntry> {
        if self.tail == NONE {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(self.entries.len());
        // Break the circle: the entry after the tail is the head.
        let head = self.entries[self.tail as usize]
            .as_ref()
            .map_or(NONE, |tail| tail.next);
        let tail = self.tail;
        let mut cursor = head;
        loop {
            let Some(mut entry) = self.entries[cursor as usize].take() else {
                break;
            };
            let at_tail = cursor == tail;
            cursor = entry.next;
            entry.next = NONE;
            out.push(entry);
            if at_tail {
                break;
            }
        }
        self.entries.clear();
        self.tail = NONE;
        out
    }

    /// Folds all pending entries onto the base state, in enqueue order.
    ///
    /// Returns the new state and the completion callbacks of the folded
    /// entries. With an empty ring this returns the base state unchanged —
    /// processing is idempotent within a build.
    pub fn process(&mut self, ctx: &Props) -> (StateValue, Vec<UpdateCallback>) {
        let mut state = self.base_state.clone();
        let mut callbacks = Vec::new();
        for entry in self.cut() {
            state = fold(state, entry.payload, ctx);
            if let Some(cb) = entry.callback {
                callbacks.push(cb);
            }
        }
        self.base_state = state.clone();
        (state, callbacks)
    }
}

/// Applies one payload to a state value.
fn fold(state: StateValue, payload: UpdatePayload, ctx: &Props) -> StateValue {
    match payload {
        UpdatePayload::Replace(value) => value,
        UpdatePayload::Merge(map) => match state {
            StateValue::Map(mut base) => {
                base.extend(map);
                StateValue::Map(base)
            }
            _ => StateValue::Map(map),
        },
        UpdatePayload::Apply(f) => f(&state, ctx),
    }
}

impl NodeArena {
    /// Materializes a work-in-progress node's derived state from its
    /// pending updates.
    ///
    /// The pending ring lives on the current-generation node; a
    /// work-in-progress node without a queue of its own reads through its
    /// alternate. Entries enqueued after this call land in a fresh ring
    /// and are folded by the next build.
    pub(crate) fn process_updates(&mut self, wip: NodeId) -> Vec<UpdateCallback> {
        // Both generation members may hold a queue; after one cycle the
        // work-in-progress node keeps its drained ring from two builds ago.
        // Only a non-empty ring selects the owner.
        let has_pending =
            |node: &Self, id: NodeId| node.get(id).queue.as_ref().is_some_and(|q| !q.is_empty());
        let alternate = self.get(wip).alternate;
        let owner = if has_pending(self, wip) {
            wip
        } else if alternate != INVALID && has_pending(self, alternate) {
            alternate
        } else {
            return Vec::new();
        };

        let Some(mut queue) = self.get_mut(owner).queue.take() else {
            return Vec::new();
        };

        let ctx = self.get(wip).pending_props.clone();
        let (state, callbacks) = queue.process(&ctx);
        self.get_mut(owner).queue = Some(queue);
        self.get_mut(wip).memoized_state = state;
        callbacks
    }
}
