// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fatal reconciliation errors.
//!
//! Every variant aborts the in-flight build: the work-in-progress
//! generation is discarded without being committed, the previously
//! committed tree stays current, and the error propagates to the caller of
//! [`request_update`](crate::engine::Reconciler::request_update). The
//! engine does not retry; callers decide whether to reissue the whole
//! request.

use thiserror::Error;

/// Errors emitted by the reconciliation engine.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A child description is neither a tag element, a component, nor a
    /// text-like value, so no node kind can be inferred for it.
    #[error("node description cannot be classified: {0}")]
    UnrecognizedNodeKind(&'static str),

    /// Internal dispatch met a node whose kind or instance slot is
    /// inconsistent with the data model. Indicates a core invariant
    /// violation; unreachable through the public API.
    #[error("internal node state is inconsistent: {0}")]
    UnknownNodeKind(&'static str),

    /// A clone pass found a work-in-progress child pointer that diverged
    /// from the previous generation, which only happens for interrupted
    /// builds. Interrupted builds cannot be resumed.
    #[error("resuming an interrupted build is not supported")]
    ResumeNotSupported,
}
