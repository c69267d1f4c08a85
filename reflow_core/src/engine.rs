// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The reconciliation session object.
//!
//! A [`Reconciler`] owns everything one engine instance needs: the injected
//! [`HostTree`] capability, the node arena, the tree pairs attached to host
//! containers, and the build state machine. Holding all of it on one object
//! (rather than process-wide state) allows multiple independent engines per
//! process and deterministic tests.
//!
//! # State machine
//!
//! The engine is `Idle` between cycles. An update request that reaches a
//! root moves it to `Building` (the depth-first rebuild), then `Committing`
//! (applying the effect chain), then back to `Idle` — all synchronously
//! inside the call that issued the request. Requests arriving while a
//! build is in flight are *coalesced*: their entries stay queued on the
//! target node, but no nested build starts. Entries on nodes the in-flight
//! build has not visited yet are picked up by that build; entries on
//! already-visited nodes wait for the next one.

use crate::element::Element;
use crate::error::ReconcileError;
use crate::host::{HostHandle, HostTree};
use crate::node::{Instance, NodeArena, NodeId, NodeKind, INVALID};
use crate::update::{StateValue, UpdateCallback, UpdateEntry, UpdatePayload};

use core::fmt;

/// A handle to a tree pair owned by a [`Reconciler`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairId(pub(crate) u32);

impl fmt::Debug for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PairId({})", self.0)
    }
}

/// The engine's build state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No build in flight; requests may start one.
    Idle,
    /// A depth-first rebuild is running.
    Building,
    /// The finished effect chain is being applied to the host tree.
    Committing,
}

/// One attachment of the engine to a host container.
///
/// Owns the committed generation's root (`current`, always valid after
/// creation) and, transiently during a cycle, the in-progress root.
#[derive(Debug)]
pub(crate) struct TreePair {
    pub(crate) current: NodeId,
    pub(crate) work_in_progress: NodeId,
    pub(crate) container: HostHandle,
}

/// The reconciliation engine.
///
/// See the [module docs](self) for the state machine and coalescing rules.
pub struct Reconciler<H: HostTree> {
    pub(crate) host: H,
    pub(crate) arena: NodeArena,
    pub(crate) pairs: Vec<TreePair>,
    pub(crate) phase: Phase,
    /// Completion callbacks collected from folded updates, fired after the
    /// commit that folded them.
    pub(crate) pending_callbacks: Vec<UpdateCallback>,
}

impl<H: HostTree> fmt::Debug for Reconciler<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("phase", &self.phase)
            .field("pairs", &self.pairs.len())
            .field("nodes", &self.arena.len())
            .finish()
    }
}

impl<H: HostTree> Reconciler<H> {
    /// Creates an engine driving the given host capability.
    pub fn new(host: H) -> Self {
        Self {
            host,
            arena: NodeArena::new(),
            pairs: Vec::new(),
            phase: Phase::Idle,
            pending_callbacks: Vec::new(),
        }
    }

    /// Returns the host capability.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Returns the host capability mutably (e.g. to dispatch events).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Returns the node arena, for inspection.
    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Returns the current build phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Attaches the engine to a host container, creating a tree pair with
    /// an empty committed root.
    pub fn create_tree_pair(&mut self, container: HostHandle) -> PairId {
        debug_assert!(self.pairs.len() < u32::MAX as usize, "pair table full");
        let pair = PairId(self.pairs.len() as u32);
        let root = self.arena.create_root(pair);
        self.pairs.push(TreePair {
            current: root,
            work_in_progress: INVALID,
            container,
        });
        pair
    }

    /// Returns the root node of the committed generation.
    #[must_use]
    pub fn current_root(&self, pair: PairId) -> NodeId {
        self.pairs[pair.0 as usize].current
    }

    /// Returns the pair's host attachment point.
    #[must_use]
    pub fn container(&self, pair: PairId) -> HostHandle {
        self.pairs[pair.0 as usize].container
    }

    /// Requests that the pair's tree be rebuilt to match `description`.
    ///
    /// `None` describes an empty tree; committing it deletes all
    /// previously placed top-level nodes. The request is queued as a
    /// replace-root-description update and scheduled; when the engine is
    /// idle the whole build-then-commit cycle runs before this returns.
    ///
    /// # Errors
    ///
    /// Propagates fatal build errors (see [`ReconcileError`]). On error the
    /// previously committed tree is untouched and the engine is idle again.
    pub fn request_update(
        &mut self,
        pair: PairId,
        description: Option<Element>,
    ) -> Result<(), ReconcileError> {
        self.request_update_with(pair, description, None)
    }

    /// Like [`request_update`](Self::request_update), with a completion
    /// callback fired after the commit that folds this request.
    pub fn request_update_with(
        &mut self,
        pair: PairId,
        description: Option<Element>,
        callback: Option<UpdateCallback>,
    ) -> Result<(), ReconcileError> {
        let state = match description {
            Some(el) => StateValue::Element(el),
            None => StateValue::Null,
        };
        let payload = UpdatePayload::Replace(state);
        let entry = match callback {
            Some(cb) => UpdateEntry::with_callback(payload, cb),
            None => UpdateEntry::new(payload),
        };
        let root = self.pairs[pair.0 as usize].current;
        self.enqueue_update(root, entry)
    }

    /// Appends an update entry to `node`'s queue and schedules its tree.
    ///
    /// This is the general-purpose path usable against any node; the
    /// `request_update` family is the root-description convenience built
    /// on top of it.
    pub fn enqueue_update(
        &mut self,
        node: NodeId,
        entry: UpdateEntry,
    ) -> Result<(), ReconcileError> {
        self.arena.enqueue_update(node, entry);
        self.schedule_update(node)
    }

    /// Schedules work for the tree containing `node`.
    ///
    /// Walks parent links to the top of the tree. A top that is not a root
    /// node cannot be scheduled; the request is dropped (the queued entry
    /// remains and will fold whenever that tree is next built).
    pub fn schedule_update(&mut self, node: NodeId) -> Result<(), ReconcileError> {
        let mut top = node;
        while self.arena.parent(top) != INVALID {
            top = self.arena.parent(top);
        }
        if self.arena.kind(top) != NodeKind::Root {
            tracing::warn!(node = ?node, top = ?top, "scheduled node is not attached to a root; ignoring");
            return Ok(());
        }
        let pair = match self.arena.instance(top) {
            Instance::Pair(pair) => *pair,
            _ => {
                return Err(ReconcileError::UnknownNodeKind(
                    "root node without pair back-reference",
                ))
            }
        };
        self.ensure_scheduled(pair)
    }

    /// Starts a build-then-commit cycle for `pair` unless one is already
    /// in flight.
    pub(crate) fn ensure_scheduled(&mut self, pair: PairId) -> Result<(), ReconcileError> {
        if self.phase != Phase::Idle {
            tracing::debug!(pair = ?pair, phase = ?self.phase, "request coalesced into in-flight build");
            return Ok(());
        }

        self.phase = Phase::Building;
        tracing::debug!(pair = ?pair, "build started");
        match self.run_build(pair) {
            Ok(finished) => {
                self.phase = Phase::Committing;
                let committed = self.commit(pair, finished);
                self.phase = Phase::Idle;
                match committed {
                    Ok(()) => {
                        for callback in self.pending_callbacks.drain(..) {
                            callback();
                        }
                        Ok(())
                    }
                    Err(err) => {
                        self.pending_callbacks.clear();
                        Err(err)
                    }
                }
            }
            Err(err) => {
                // Discard the in-progress generation; the committed tree
                // was never touched.
                self.pairs[pair.0 as usize].work_in_progress = INVALID;
                self.pending_callbacks.clear();
                self.phase = Phase::Idle;
                tracing::debug!(pair = ?pair, error = %err, "build aborted");
                Err(err)
            }
        }
    }
}
