// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durably records each operation: an append-only block in the runbook's
//! History section, and a structured log event. The log stream is the
//! system of record; the file append is a convenience for human review and
//! is never allowed to change the operation's outcome.

use rb_core::ExecutionRecord;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to serialize execution record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to append to runbook file: {0}")]
    Io(#[from] std::io::Error),
}

/// Appends a formatted entry to `runbook_path`'s History section and emits
/// the canonical record to the log stream. File-append failures never
/// propagate: they are logged and returned as a single warning string for
/// the caller to fold into the execution record.
pub fn record(runbook_path: &Path, record: &ExecutionRecord) -> Option<String> {
    emit_log(record);
    match append_to_file(runbook_path, record) {
        Ok(()) => None,
        Err(e) => {
            tracing::error!(error = %e, path = %runbook_path.display(), "history file append failed");
            Some(format!("failed to append history entry: {e}"))
        }
    }
}

fn emit_log(record: &ExecutionRecord) {
    let serialized = serde_json::to_string(record).unwrap_or_else(|e| {
        format!("{{\"serialize_error\":\"{e}\"}}")
    });
    tracing::info!(
        correlation_id = %record.breadcrumb.correlation_id,
        operation = %record.operation,
        return_code = record.return_code,
        record = %serialized,
        "execution record"
    );
}

/// Formats a minified-JSON-per-entry block under a readable heading and
/// appends it beneath the runbook's History section. Self-delimiting and
/// parseable in reverse: scanning backward from EOF for the next
/// `### Execution` marker recovers the latest entry without reading the
/// whole file.
fn append_to_file(runbook_path: &Path, record: &ExecutionRecord) -> Result<(), HistoryError> {
    let line = serde_json::to_string(record)?;
    let heading = format!(
        "\n### Execution {}\n{}\n",
        record
            .start
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        line
    );
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(runbook_path)?;
    file.write_all(heading.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

/// Scans `text` (the full runbook contents) for the most recently appended
/// history entry, returning its heading line and JSON body. Used by tests
/// and by tooling that inspects history without re-parsing the whole file.
pub fn latest_entry(text: &str) -> Option<(&str, &str)> {
    let marker_pos = text.rfind("### Execution ")?;
    let mut lines = text[marker_pos..].lines();
    let heading = lines.next()?;
    let body = lines.next()?;
    Some((heading, body))
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
