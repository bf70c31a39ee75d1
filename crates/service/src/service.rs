// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The contract the transport layer calls. Binds together the parser,
//! validator, authorizer, workspace, executor, recursion guard and history
//! recorder from the other workspace crates; holds no request-scoped state
//! of its own.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rb_core::exit_codes::{AUTHORIZATION_DENIED, RECURSION_DETECTED};
use rb_core::{
    authorize, Breadcrumb, Config, ConfigItem, ExecutionRecord, Operation, ServiceError,
    SystemWallClock, TokenContext, WallClock,
};
use rb_engine::{compose_env, check_recursion, ExecuteError, Executor, RecursionOutcome, SystemVars, Workspace};
use serde::{Deserialize, Serialize};

/// A single declared environment variable, as read from a runbook's
/// Environment Requirements section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvRequirement {
    pub name: String,
    pub description: String,
}

/// The orchestrator. Constructed once per runbooks directory and
/// configuration, `Send + Sync`, cheap to share behind an `Arc` across
/// concurrent callers. Generic over the wall clock so tests can control
/// the timestamps an `ExecutionRecord` carries.
pub struct Service<W: WallClock = SystemWallClock> {
    config: Config,
    runbooks_dir: PathBuf,
    clock: W,
}

impl Service<SystemWallClock> {
    pub fn new(config: Config, runbooks_dir: PathBuf) -> Self {
        Self::with_clock(config, runbooks_dir, SystemWallClock)
    }
}

impl<W: WallClock> Service<W> {
    pub fn with_clock(config: Config, runbooks_dir: PathBuf, clock: W) -> Self {
        Self {
            config,
            runbooks_dir,
            clock,
        }
    }

    /// Runbook basenames in the runbooks directory ending in `.md` that are
    /// regular files. Authorization for this listing is transport-level
    /// only; the core does not filter by claim here.
    pub async fn list(&self) -> Result<Vec<String>, ServiceError> {
        let entries = std::fs::read_dir(&self.runbooks_dir)
            .map_err(|e| ServiceError::Internal(format!("failed to read runbooks directory: {e}")))?;
        let mut names = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// The raw text of a resolved runbook.
    pub async fn get(&self, filename: &str) -> Result<String, ServiceError> {
        let path = self.resolve_filename(filename)?;
        std::fs::read_to_string(&path)
            .map_err(|e| ServiceError::Internal(format!("failed to read runbook: {e}")))
    }

    /// The declared variables from a runbook's Environment Requirements
    /// section.
    pub async fn required_env(&self, filename: &str) -> Result<Vec<EnvRequirement>, ServiceError> {
        let path = self.resolve_filename(filename)?;
        let text = std::fs::read_to_string(&path)
            .map_err(|e| ServiceError::Internal(format!("failed to read runbook: {e}")))?;
        let pairs = rb_runbook::environment_requirements_of(&text)
            .map_err(|e| ServiceError::Internal(format!("Environment Requirements does not parse: {e}")))?
            .unwrap_or_default();
        Ok(pairs
            .into_iter()
            .map(|(name, description)| EnvRequirement { name, description })
            .collect())
    }

    /// Resolves, authorizes, and validates `filename`, recording the result.
    /// Never executes the script.
    pub async fn validate(
        &self,
        filename: &str,
        token: &TokenContext,
        breadcrumb: &Breadcrumb,
    ) -> Result<ExecutionRecord, ServiceError> {
        tracing::info!(%filename, correlation_id = %breadcrumb.correlation_id, "validate requested");
        let path = self.resolve_filename(filename)?;
        let start = self.clock.now_utc();
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                return Err(self.internal_failure(
                    path.as_path(),
                    Operation::Validate,
                    breadcrumb,
                    start,
                    format!("failed to read runbook: {e}"),
                ));
            }
        };
        let parsed = rb_runbook::parse(&text);

        let required_claims = parsed.required_claims.clone().unwrap_or_default();
        if let Err(e) = authorize(&required_claims, &token.claims) {
            let stderr = format!(
                "authorization denied for operation=validate subject={} claim={}\n",
                token.subject, e.claim
            );
            return Ok(self.finalize(
                path.as_path(),
                Operation::Validate,
                breadcrumb,
                start,
                AUTHORIZATION_DENIED,
                vec![],
                String::new(),
                stderr,
                vec![e.to_string()],
                vec![],
            ));
        }

        // No env_vars accompany a standalone validate call; the declared
        // variables are checked against the host process environment.
        let resolved_env: BTreeMap<String, String> = std::env::vars().collect();
        let runbook_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let report = rb_runbook::validate_runbook(&text, runbook_dir, &resolved_env);
        let return_code = i32::from(!report.ok);

        Ok(self.finalize(
            path.as_path(),
            Operation::Validate,
            breadcrumb,
            start,
            return_code,
            vec![],
            String::new(),
            String::new(),
            report.errors,
            report.warnings,
        ))
    }

    /// Resolves, authorizes, validates, and runs `filename`'s script under
    /// resource discipline, recording the result on every exit path.
    pub async fn execute(
        &self,
        filename: &str,
        token: &TokenContext,
        breadcrumb: &Breadcrumb,
        env_vars: BTreeMap<String, String>,
    ) -> Result<ExecutionRecord, ServiceError> {
        tracing::info!(%filename, correlation_id = %breadcrumb.correlation_id, "execute requested");
        let path = self.resolve_filename(filename)?;
        let start = self.clock.now_utc();
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                return Err(self.internal_failure(
                    path.as_path(),
                    Operation::Execute,
                    breadcrumb,
                    start,
                    format!("failed to read runbook: {e}"),
                ));
            }
        };
        let parsed = rb_runbook::parse(&text);
        let runbook_dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();

        let required_claims = parsed.required_claims.clone().unwrap_or_default();
        if let Err(e) = authorize(&required_claims, &token.claims) {
            tracing::warn!(%filename, subject = %token.subject, claim = %e.claim, "authorization denied");
            let stderr = format!(
                "authorization denied for operation=execute subject={} claim={}\n",
                token.subject, e.claim
            );
            return Ok(self.finalize(
                path.as_path(),
                Operation::Execute,
                breadcrumb,
                start,
                AUTHORIZATION_DENIED,
                vec![],
                String::new(),
                stderr,
                vec![e.to_string()],
                vec![],
            ));
        }

        let extended_stack = match check_recursion(
            &breadcrumb.recursion_stack,
            filename,
            self.config.max_recursion_depth,
        ) {
            RecursionOutcome::Allowed { extended_stack } => extended_stack,
            RecursionOutcome::CycleDetected { filename, stack } => {
                let stderr = format!("recursion detected: {filename} already in stack {stack:?}\n");
                return Ok(self.finalize(
                    path.as_path(),
                    Operation::Execute,
                    breadcrumb,
                    start,
                    RECURSION_DETECTED,
                    vec![],
                    String::new(),
                    stderr,
                    vec![format!("recursion detected: {filename}")],
                    vec![],
                ));
            }
            RecursionOutcome::DepthExceeded { depth, limit } => {
                let stderr = format!("recursion depth exceeded: depth={depth} limit={limit}\n");
                return Ok(self.finalize(
                    path.as_path(),
                    Operation::Execute,
                    breadcrumb,
                    start,
                    RECURSION_DETECTED,
                    vec![],
                    String::new(),
                    stderr,
                    vec![format!("recursion depth exceeded: {depth} >= {limit}")],
                    vec![],
                ));
            }
        };
        let extended_breadcrumb = breadcrumb.with_extended_stack(filename);

        let system_vars = SystemVars {
            runbook_api_token: token.bearer.clone(),
            runbook_correlation_id: breadcrumb.correlation_id.clone(),
            runbook_url: self.config.api_base_url(),
            runbook_recursion_stack: extended_stack,
        };
        let (composed_env, compose_warnings) = match compose_env(&env_vars, system_vars) {
            Ok(pair) => pair,
            Err(ExecuteError::InvalidEnvVarName(name)) => {
                return Err(ServiceError::InvalidEnvVarName(name))
            }
            Err(e) => {
                return Err(self.internal_failure(
                    path.as_path(),
                    Operation::Execute,
                    &extended_breadcrumb,
                    start,
                    e.to_string(),
                ));
            }
        };

        let report = rb_runbook::validate_runbook(&text, &runbook_dir, &composed_env);
        if !report.ok {
            return Ok(self.finalize(
                path.as_path(),
                Operation::Execute,
                &extended_breadcrumb,
                start,
                1,
                vec![],
                String::new(),
                String::new(),
                report.errors,
                report.warnings,
            ));
        }

        let workspace = Workspace::create().map_err(|e| {
            self.internal_failure(
                path.as_path(),
                Operation::Execute,
                &extended_breadcrumb,
                start,
                format!("failed to create workspace: {e}"),
            )
        })?;

        let input_paths = parsed
            .file_requirements
            .as_ref()
            .map(|r| r.input.clone())
            .unwrap_or_default();
        let populate_errors = workspace.populate(&runbook_dir, &input_paths);
        if !populate_errors.is_empty() {
            let errors = populate_errors.iter().map(ToString::to_string).collect();
            workspace.dispose();
            return Ok(self.finalize(
                path.as_path(),
                Operation::Execute,
                &extended_breadcrumb,
                start,
                1,
                vec![],
                String::new(),
                String::new(),
                errors,
                report.warnings,
            ));
        }

        let script = parsed.script.clone().unwrap_or_default();
        let script_path = match workspace.write_script(&script) {
            Ok(path) => path,
            Err(e) => {
                let service_err = self.internal_failure(
                    path.as_path(),
                    Operation::Execute,
                    &extended_breadcrumb,
                    start,
                    format!("failed to write script: {e}"),
                );
                workspace.dispose();
                return Err(service_err);
            }
        };

        let executor = Executor::new(
            self.config.shell_path.clone(),
            Duration::from_secs(self.config.script_timeout_seconds),
            self.config.max_output_bytes,
        );
        let outcome = executor
            .run(workspace.path(), &script_path, composed_env.clone())
            .await;
        workspace.dispose();

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                return Err(self.internal_failure(
                    path.as_path(),
                    Operation::Execute,
                    &extended_breadcrumb,
                    start,
                    format!("failed to run script: {e}"),
                ));
            }
        };

        let config_items = composed_env
            .into_iter()
            .map(|(name, value)| {
                if name == "RUNBOOK_API_TOKEN" {
                    ConfigItem::new(name, value, "system").secret()
                } else if name.starts_with("RUNBOOK_") {
                    ConfigItem::new(name, value, "system")
                } else {
                    ConfigItem::new(name, value, "env_vars")
                }
            })
            .collect();

        let mut warnings = report.warnings;
        warnings.extend(compose_warnings);
        warnings.extend(outcome.warnings);

        Ok(self.finalize(
            path.as_path(),
            Operation::Execute,
            &extended_breadcrumb,
            start,
            outcome.return_code,
            config_items,
            outcome.stdout,
            outcome.stderr,
            vec![],
            warnings,
        ))
    }

    /// Builds the final execution record and records it via §4.7, folding
    /// any file-append warning into the record handed back to the caller.
    #[allow(clippy::too_many_arguments)]
    fn finalize(
        &self,
        path: &Path,
        operation: Operation,
        breadcrumb: &Breadcrumb,
        start: DateTime<Utc>,
        return_code: i32,
        config_items: Vec<ConfigItem>,
        stdout: String,
        stderr: String,
        errors: Vec<String>,
        warnings: Vec<String>,
    ) -> ExecutionRecord {
        let mut record = ExecutionRecord {
            start,
            finish: self.clock.now_utc(),
            return_code,
            operation,
            breadcrumb: breadcrumb.clone(),
            config_items,
            stdout,
            stderr,
            errors,
            warnings,
        };
        if let Some(warning) = rb_storage::record(path, &record) {
            record.warnings.push(warning);
        }
        record
    }

    /// Records a best-effort internal-failure entry and returns the
    /// `ServiceError` the caller sees. Per the error taxonomy, `Internal`
    /// failures are both recorded and surfaced as an `Err`.
    fn internal_failure(
        &self,
        path: &Path,
        operation: Operation,
        breadcrumb: &Breadcrumb,
        start: DateTime<Utc>,
        message: String,
    ) -> ServiceError {
        let record = ExecutionRecord {
            start,
            finish: self.clock.now_utc(),
            return_code: 1,
            operation,
            breadcrumb: breadcrumb.clone(),
            config_items: vec![],
            stdout: String::new(),
            stderr: format!("internal error: {message}\n"),
            errors: vec![message.clone()],
            warnings: vec![],
        };
        rb_storage::record(path, &record);
        ServiceError::Internal(message)
    }

    /// Resolves `filename` against the runbooks directory. The inbound name
    /// must equal its own basename with no path separators or leading
    /// dot-segments, and must canonicalize to a regular file directly under
    /// the runbooks directory.
    fn resolve_filename(&self, filename: &str) -> Result<PathBuf, ServiceError> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(std::path::Component::Normal(name)), None)
                if name == std::ffi::OsStr::new(filename) => {}
            _ => return Err(ServiceError::BadFilename(filename.to_string())),
        }

        let canonical_dir = self.runbooks_dir.canonicalize().map_err(|e| {
            ServiceError::Internal(format!("runbooks directory not accessible: {e}"))
        })?;
        let candidate = canonical_dir.join(filename);
        let resolved = candidate
            .canonicalize()
            .map_err(|_| ServiceError::NotFound(filename.to_string()))?;
        if resolved.parent() != Some(canonical_dir.as_path()) || !resolved.is_file() {
            return Err(ServiceError::NotFound(filename.to_string()));
        }
        Ok(resolved)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
