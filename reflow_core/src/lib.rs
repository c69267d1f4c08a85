// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental tree reconciliation with double-buffered generations.
//!
//! `reflow_core` turns declarative node descriptions into minimal mutations
//! of an external target tree. It keeps two generations of an internal node
//! tree at once: the *current* (committed) generation and a transient
//! *work-in-progress* generation built from it. A synchronous depth-first
//! work loop rebuilds the work-in-progress tree, collecting a linear chain
//! of nodes that need side effects, and a commit pass applies that chain to
//! the external target before swapping generations.
//!
//! # Architecture
//!
//! The crate is organized around the build-then-commit cycle that turns an
//! update request into target-tree mutations:
//!
//! ```text
//!   Reconciler::request_update()
//!       │
//!       ▼
//!   UpdateQueue (pending ring) ──► work loop: begin_work / complete_work
//!                                       │
//!                 ┌─────────────────────┘
//!                 ▼
//!   effect chain ──► commit: Placement / Update / Deletion ──► HostTree
//!                                       │
//!                 ┌─────────────────────┘
//!                 ▼
//!   generation swap (work-in-progress becomes current)
//! ```
//!
//! **[`node`]** — Arena-backed node tree with index handles. Each node holds
//! its kind, structural links, pending and committed payloads, effect state,
//! and a back-reference to its counterpart in the other generation.
//!
//! **[`element`]** — The declarative node-description model consumed at the
//! interface boundary: element type, key, props, and child descriptions.
//!
//! **[`update`]** — Per-node pending update ring and the fold that
//! materializes a node's derived state from queued entries.
//!
//! **[`effect`]** — Effect mask constants (placement, update, deletion) and
//! mask operations.
//!
//! **[`engine`]** — The [`Reconciler`](engine::Reconciler) session object:
//! tree pairs, the `Idle`/`Building`/`Committing` state machine, and the
//! root-level scheduling entry.
//!
//! **[`host`]** — The [`HostTree`](host::HostTree) capability trait that
//! backends implement to create and mutate real target-tree nodes.
//!
//! **[`error`]** — Fatal error kinds. A failed build never partially
//! commits; the previous generation stays current.
//!
//! The engine is single-threaded and runs each build-then-commit cycle
//! synchronously to completion. There is no suspension, yielding, or
//! cancellation; see [`engine`] for the coalescing rule applied to requests
//! that arrive mid-build.

pub mod effect;
pub mod element;
pub mod engine;
pub mod error;
pub mod host;
pub mod node;
pub mod update;

mod commit;
mod work;

pub use effect::EffectMask;
pub use element::{ChildValue, ComponentFn, Element, ElementType, EventHandler, PropValue, Props};
pub use engine::{PairId, Phase, Reconciler};
pub use error::ReconcileError;
pub use host::{HostHandle, HostTree};
pub use node::{Instance, Node, NodeArena, NodeId, NodeKind, INVALID};
pub use update::{StateValue, UpdateCallback, UpdateEntry, UpdatePayload, UpdateQueue};
