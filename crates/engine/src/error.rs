// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine's workspace and executor.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("failed to create workspace: {0}")]
    Create(#[source] std::io::Error),

    #[error("input path escapes the runbook directory: {0}")]
    PathEscape(String),

    #[error("input path does not exist: {0}")]
    InputMissing(String),

    #[error("input basename collides with another declared input: {0}")]
    NameCollision(String),

    #[error("failed to copy input {path}: {source}")]
    Copy {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write script: {0}")]
    WriteScript(#[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("invalid environment variable name: {0}")]
    InvalidEnvVarName(String),

    #[error("failed to spawn shell: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to read child output: {0}")]
    Io(#[source] std::io::Error),
}
