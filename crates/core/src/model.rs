// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The request/response data model: claim sets, token context, breadcrumbs,
//! and the execution record every operation produces.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from claim name to the ordered list of allowed values. `roles` is
/// conventional but not privileged — any claim name may be required.
pub type ClaimSet = BTreeMap<String, Vec<String>>;

/// The evaluated request principal. Opaque, read-only input to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenContext {
    pub subject: String,
    /// Claim name -> held values. A transport that carries a single string
    /// for a claim must normalize it to a one-element list before handing
    /// this to the core; the Authorizer only ever sees this shape.
    pub claims: ClaimSet,
    pub correlation_id: String,
    pub remote_addr: String,
    pub bearer: String,
}

/// Per-request metadata carried alongside the token. Constructed at request
/// entry, extended by the Service before delegating to the Executor, never
/// mutated by the Executor itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub received_at: chrono::DateTime<chrono::Utc>,
    pub user_id: String,
    pub source_addr: String,
    pub correlation_id: String,
    /// Runbook filenames currently executing upstream of this request,
    /// innermost (most recently entered) last.
    pub recursion_stack: Vec<String>,
}

impl Breadcrumb {
    /// Returns a copy of this breadcrumb with `filename` appended to the
    /// recursion stack, as done when the Service delegates to the Executor.
    pub fn with_extended_stack(&self, filename: &str) -> Self {
        let mut stack = self.recursion_stack.clone();
        stack.push(filename.to_string());
        Self {
            recursion_stack: stack,
            ..self.clone()
        }
    }
}

/// The operation kind recorded on an execution record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Validate,
    Execute,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Validate => write!(f, "validate"),
            Operation::Execute => write!(f, "execute"),
        }
    }
}

/// A single `{name, value, source}` triple captured at execution time.
/// Values of items marked secret are masked before the record is ever
/// persisted or logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigItem {
    pub name: String,
    pub value: String,
    pub source: String,
    #[serde(default)]
    pub secret: bool,
}

impl ConfigItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            source: source.into(),
            secret: false,
        }
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self.value = "***".to_string();
        self
    }
}

/// The canonical audit object produced by every operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub start: chrono::DateTime<chrono::Utc>,
    pub finish: chrono::DateTime<chrono::Utc>,
    pub return_code: i32,
    pub operation: Operation,
    pub breadcrumb: Breadcrumb,
    pub config_items: Vec<ConfigItem>,
    pub stdout: String,
    pub stderr: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ExecutionRecord {
    pub fn success(&self) -> bool {
        self.return_code == 0 && self.errors.is_empty()
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
