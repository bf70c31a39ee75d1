// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Non-fail-fast validator: every check below always runs, even after an
//! earlier one has already failed, so a single call surfaces every problem
//! with a runbook instead of just the first.

use crate::parser::parse;
use crate::types::ParsedRunbook;
use std::collections::BTreeMap;
use std::path::Path;

const REQUIRED_SECTIONS: [&str; 5] = [
    "Name",
    "Environment Requirements",
    "File System Requirements",
    "Script",
    "History",
];

/// `(ok, errors, warnings)` as specified: `errors` cause failure, `warnings`
/// never do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub ok: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn finish(mut self) -> Self {
        self.ok = self.errors.is_empty();
        self
    }
}

/// Runs every check in §4.2 order and returns the combined report. Never
/// executes the script, never modifies `text`.
///
/// `resolved_env` is the environment the declared variables are checked
/// against — the composed child environment for an `execute` call, or the
/// host process environment for a standalone `validate` call (the spec's
/// request shape for `validate` carries no `env_vars`).
pub fn validate_runbook(
    text: &str,
    runbook_dir: &Path,
    resolved_env: &BTreeMap<String, String>,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    let parsed = parse(text);

    check_required_sections(&parsed, &mut report);
    check_environment_requirements(&parsed, resolved_env, &mut report);
    check_file_system_requirements(&parsed, runbook_dir, &mut report);
    check_script_present(&parsed, &mut report);

    report.finish()
}

/// Reads `path` and validates it, surfacing an unreadable file as the
/// dedicated first check from §4.2.
pub fn validate_runbook_file(
    path: &Path,
    resolved_env: &BTreeMap<String, String>,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            report.error(format!("runbook file is not readable: {e}"));
            return report.finish();
        }
    };
    let runbook_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut inner = validate_runbook(&text, runbook_dir, resolved_env);
    report.errors.append(&mut inner.errors);
    report.warnings.append(&mut inner.warnings);
    report.finish()
}

fn check_required_sections(parsed: &ParsedRunbook, report: &mut ValidationReport) {
    for heading in REQUIRED_SECTIONS {
        match parsed.sections.get(heading) {
            None => report.error(format!("missing required section: {heading}")),
            Some(body) if heading != "History" && body.trim().is_empty() => {
                report.error(format!("required section is empty: {heading}"));
            }
            Some(_) => {}
        }
    }
    if parsed.sections.last_heading() != Some("History") && parsed.sections.contains("History") {
        report.error("\"History\" must be the last top-level section");
    }
}

fn check_environment_requirements(
    parsed: &ParsedRunbook,
    resolved_env: &BTreeMap<String, String>,
    report: &mut ValidationReport,
) {
    if let Some(err) = &parsed.environment_requirements_error {
        report.error(format!("Environment Requirements does not parse: {err}"));
        return;
    }
    let Some(vars) = &parsed.environment_requirements else {
        return;
    };
    for (name, _description) in vars {
        if !resolved_env.contains_key(name) {
            report.error(format!("missing environment variable: {name}"));
        }
    }
}

fn check_file_system_requirements(
    parsed: &ParsedRunbook,
    runbook_dir: &Path,
    report: &mut ValidationReport,
) {
    if let Some(err) = &parsed.file_requirements_error {
        report.error(format!("File System Requirements does not parse: {err}"));
        return;
    }
    let Some(reqs) = &parsed.file_requirements else {
        return;
    };
    for input in &reqs.input {
        match resolve_within(runbook_dir, input) {
            Ok(resolved) if resolved.exists() => {}
            Ok(_) => report.error(format!("missing input path: {input}")),
            Err(_) => report.error(format!("input path escapes runbook directory: {input}")),
        }
    }
}

fn resolve_within(runbook_dir: &Path, relative: &str) -> Result<std::path::PathBuf, ()> {
    let joined = runbook_dir.join(relative);
    // Path resolution may be on a nonexistent file (a missing input); fall
    // back to lexical joining when canonicalize fails so a bad-but-existing
    // parent still yields a path to check against the allow-listed root.
    let base = runbook_dir.canonicalize().map_err(|_| ())?;
    let candidate = match joined.canonicalize() {
        Ok(c) => c,
        Err(_) => joined,
    };
    if candidate.starts_with(&base) || candidate == base {
        Ok(candidate)
    } else {
        Err(())
    }
}

fn check_script_present(parsed: &ParsedRunbook, report: &mut ValidationReport) {
    if parsed.script.is_none() {
        let has_script_section = parsed.sections.contains("Script");
        if !has_script_section {
            // already reported by check_required_sections
            return;
        }
        report.error("Script section has no non-empty sh/zsh/bash fenced block");
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
