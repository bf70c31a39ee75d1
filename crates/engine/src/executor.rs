// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composes the environment, spawns the extracted script, and enforces
//! timeout and output-cap discipline.

use crate::error::ExecuteError;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use rb_core::exit_codes::SCRIPT_TIMEOUT;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

const CHUNK_SIZE: usize = 8192;

/// How long to wait for a SIGTERM'd child to exit on its own before
/// escalating to SIGKILL.
const TERMINATION_GRACE: Duration = Duration::from_secs(2);

/// The four system-managed variables that always win over caller-declared
/// values.
#[derive(Debug, Clone)]
pub struct SystemVars {
    pub runbook_api_token: String,
    pub runbook_correlation_id: String,
    pub runbook_url: String,
    pub runbook_recursion_stack: Vec<String>,
}

impl SystemVars {
    fn into_map(self) -> Result<BTreeMap<String, String>, serde_json::Error> {
        let stack_json = serde_json::to_string(&self.runbook_recursion_stack)?;
        let mut map = BTreeMap::new();
        map.insert("RUNBOOK_API_TOKEN".to_string(), self.runbook_api_token);
        map.insert(
            "RUNBOOK_CORRELATION_ID".to_string(),
            self.runbook_correlation_id,
        );
        map.insert("RUNBOOK_URL".to_string(), self.runbook_url.clone());
        map.insert("RUNBOOK_API_BASE_URL".to_string(), self.runbook_url);
        map.insert("RUNBOOK_RECURSION_STACK".to_string(), stack_json);
        Ok(map)
    }
}

/// Composes the child environment: caller-declared variables, sanitized,
/// then overlaid by the system-managed ones which always win. Returns
/// warnings for any caller attempt to set a system-managed name.
pub fn compose_env(
    caller_vars: &BTreeMap<String, String>,
    system: SystemVars,
) -> Result<(BTreeMap<String, String>, Vec<String>), ExecuteError> {
    let name_re_ok = |name: &str| -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };

    let mut composed = BTreeMap::new();
    for (name, value) in caller_vars {
        if !name_re_ok(name) {
            return Err(ExecuteError::InvalidEnvVarName(name.clone()));
        }
        let scrubbed: String = value
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
            .collect();
        composed.insert(name.clone(), scrubbed);
    }

    let system_map = system
        .into_map()
        .map_err(|e| ExecuteError::Io(std::io::Error::other(e.to_string())))?;
    let mut warnings = Vec::new();
    for (name, value) in system_map {
        if composed.contains_key(&name) {
            warnings.push(format!(
                "caller attempted to set system-managed variable {name}; ignored"
            ));
        }
        composed.insert(name, value);
    }

    Ok((composed, warnings))
}

/// `(return_code, stdout, stderr)` plus engine-observed warnings (e.g.
/// output truncation).
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub warnings: Vec<String>,
    pub timed_out: bool,
}

/// Runs the prepared script under resource discipline.
pub struct Executor {
    shell_path: String,
    timeout: Duration,
    max_output_bytes: usize,
}

impl Executor {
    pub fn new(shell_path: impl Into<String>, timeout: Duration, max_output_bytes: usize) -> Self {
        Self {
            shell_path: shell_path.into(),
            timeout,
            max_output_bytes,
        }
    }

    pub async fn run(
        &self,
        workspace_dir: &Path,
        script_path: &Path,
        env: BTreeMap<String, String>,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        let span = tracing::info_span!("executor.run", shell = %self.shell_path);
        let _guard = span.enter();

        let mut child = Command::new(&self.shell_path)
            .arg(script_path)
            .current_dir(workspace_dir)
            .env_clear()
            .envs(&env)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(ExecuteError::Spawn)?;

        let stdout = child.stdout.take().ok_or_else(|| {
            ExecuteError::Io(std::io::Error::other("child stdout pipe missing"))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            ExecuteError::Io(std::io::Error::other("child stderr pipe missing"))
        })?;

        let cap = self.max_output_bytes;
        let stdout_task = tokio::spawn(read_capped(stdout, cap));
        let stderr_task = tokio::spawn(read_capped(stderr, cap));

        let wait_result = tokio::time::timeout(self.timeout, child.wait()).await;
        let (timed_out, status) = match wait_result {
            Ok(status) => (false, Some(status.map_err(ExecuteError::Io)?)),
            Err(_elapsed) => {
                terminate_gracefully(&mut child).await;
                (true, None)
            }
        };

        let (stdout_bytes, stdout_truncated) = stdout_task
            .await
            .map_err(|e| ExecuteError::Io(std::io::Error::other(e.to_string())))?;
        let (stderr_bytes, stderr_truncated) = stderr_task
            .await
            .map_err(|e| ExecuteError::Io(std::io::Error::other(e.to_string())))?;

        let mut stdout = String::from_utf8_lossy(&stdout_bytes).into_owned();
        let mut stderr = String::from_utf8_lossy(&stderr_bytes).into_owned();
        let mut warnings = Vec::new();

        if stdout_truncated {
            stdout.push_str(&format!("\n...output truncated at {cap} bytes...\n"));
            warnings.push("stdout truncated at max_output_bytes".to_string());
        }
        if stderr_truncated {
            stderr.push_str(&format!("\n...output truncated at {cap} bytes...\n"));
            warnings.push("stderr truncated at max_output_bytes".to_string());
        }

        let return_code = if timed_out {
            let seconds = self.timeout.as_secs();
            stderr.push_str(&format!("script timed out after {seconds} seconds\n"));
            SCRIPT_TIMEOUT
        } else {
            status.and_then(|s| s.code()).unwrap_or(-1)
        };

        Ok(ExecutionOutcome {
            return_code,
            stdout,
            stderr,
            warnings,
            timed_out,
        })
    }
}

/// Sends SIGTERM and gives the child `TERMINATION_GRACE` to exit on its own
/// before escalating to SIGKILL via `start_kill`.
async fn terminate_gracefully(child: &mut Child) {
    if let Some(pid) = child.id() {
        let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
    }
    if tokio::time::timeout(TERMINATION_GRACE, child.wait())
        .await
        .is_err()
    {
        let _ = child.start_kill();
        let _ = child.wait().await;
    }
}

async fn read_capped<R: AsyncRead + Unpin>(mut reader: R, cap: usize) -> (Vec<u8>, bool) {
    let mut buf = Vec::new();
    let mut truncated = false;
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                if buf.len() < cap {
                    let remaining = cap - buf.len();
                    let take = remaining.min(n);
                    buf.extend_from_slice(&chunk[..take]);
                    if take < n {
                        truncated = true;
                    }
                } else {
                    truncated = true;
                }
            }
            Err(_) => break,
        }
    }
    (buf, truncated)
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
