// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error taxonomy the core raises to its caller.
//!
//! Only the kinds that are rejected before any side effect take this shape —
//! `ValidationFailed`, `AuthorizationDenied`, `RecursionDetected`,
//! `RecursionDepthExceeded` and `ScriptTimeout` are "operation completed with
//! a result" and are represented inside an `ExecutionRecord` instead (see
//! `rb_core::model`), not as an `Err` variant here.

use thiserror::Error;

/// Errors the Service returns instead of an execution record: these never
/// produce a history entry.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("runbook not found: {0}")]
    NotFound(String),

    #[error("invalid filename: {0}")]
    BadFilename(String),

    #[error("invalid environment variable name: {0}")]
    InvalidEnvVarName(String),

    #[error("internal error: {0}")]
    Internal(String),
}
