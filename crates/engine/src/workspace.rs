// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Creates and populates a short-lived, owner-only temporary directory for
//! one script execution, and disposes of it on every exit path.

use crate::error::WorkspaceError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

const SCRIPT_FILE_NAME: &str = "temp.zsh";

/// A freshly created, owner-only temporary directory hosting one execution.
/// Disposed unconditionally via [`Workspace::dispose`], and as a safety net
/// on `Drop` if a caller forgets.
pub struct Workspace {
    dir: Option<tempfile::TempDir>,
}

impl Workspace {
    /// Creates a directory with a high-entropy suffix under the OS temp
    /// root, permissions owner-only.
    pub fn create() -> Result<Self, WorkspaceError> {
        let dir = tempfile::Builder::new()
            .prefix("runbook-")
            .tempdir()
            .map_err(WorkspaceError::Create)?;
        set_owner_only(dir.path()).map_err(WorkspaceError::Create)?;
        Ok(Self { dir: Some(dir) })
    }

    pub fn path(&self) -> &Path {
        self.dir
            .as_ref()
            .map(tempfile::TempDir::path)
            .unwrap_or_else(|| Path::new(""))
    }

    /// Copies each declared input path into the workspace. Every input is
    /// attempted even after an earlier one fails, so the caller sees every
    /// problem in one pass.
    pub fn populate(&self, runbook_dir: &Path, input_paths: &[String]) -> Vec<WorkspaceError> {
        let mut errors = Vec::new();
        let mut seen_basenames: HashSet<String> = HashSet::new();
        let Ok(canonical_root) = runbook_dir.canonicalize() else {
            return input_paths
                .iter()
                .map(|p| WorkspaceError::PathEscape(p.clone()))
                .collect();
        };

        for input in input_paths {
            let joined = runbook_dir.join(input);
            let resolved = match joined.canonicalize() {
                Ok(r) => r,
                Err(_) => {
                    errors.push(WorkspaceError::InputMissing(input.clone()));
                    continue;
                }
            };
            if resolved != canonical_root && !resolved.starts_with(&canonical_root) {
                errors.push(WorkspaceError::PathEscape(input.clone()));
                continue;
            }
            let basename = match resolved.file_name() {
                Some(name) => name.to_string_lossy().to_string(),
                None => {
                    errors.push(WorkspaceError::InputMissing(input.clone()));
                    continue;
                }
            };
            if !seen_basenames.insert(basename.clone()) {
                errors.push(WorkspaceError::NameCollision(basename));
                continue;
            }
            let dest = self.path().join(&basename);
            if let Err(e) = copy_clamped(&resolved, &dest) {
                errors.push(WorkspaceError::Copy {
                    path: input.clone(),
                    source: e,
                });
            }
        }
        errors
    }

    /// Writes the extracted shell script as `temp.zsh`, owner-only
    /// read/write/execute.
    pub fn write_script(&self, script_text: &str) -> Result<PathBuf, WorkspaceError> {
        let path = self.path().join(SCRIPT_FILE_NAME);
        std::fs::write(&path, script_text).map_err(WorkspaceError::WriteScript)?;
        set_executable_owner_only(&path).map_err(WorkspaceError::WriteScript)?;
        Ok(path)
    }

    /// Recursively removes the workspace directory. Failures are logged,
    /// never raised to the caller.
    pub fn dispose(mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                tracing::error!(error = %e, "failed to dispose workspace");
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.dir.is_some() {
            tracing::warn!("workspace dropped without explicit dispose()");
        }
    }
}

fn set_owner_only(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(())
    }
}

fn set_executable_owner_only(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(())
    }
}

fn copy_clamped(src: &Path, dest: &Path) -> std::io::Result<()> {
    if src.is_dir() {
        copy_dir_recursive(src, dest)
    } else {
        std::fs::copy(src, dest)?;
        clamp_mode_from_source(src, dest)
    }
}

/// Copies a directory tree, clamping each entry's mode only after its
/// children are in place — a directory's own mode may drop the owner-write
/// bit it needs while still being populated.
fn copy_dir_recursive(src: &Path, dest: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dest)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let dest_path = dest.join(entry.file_name());
        if file_type.is_dir() {
            copy_dir_recursive(&entry.path(), &dest_path)?;
        } else {
            std::fs::copy(entry.path(), &dest_path)?;
            clamp_mode_from_source(&entry.path(), &dest_path)?;
        }
    }
    clamp_mode_from_source(src, dest)
}

/// Applies `src`'s mode bits to `dest`, masked to owner-only — a copied
/// input keeps its original read/write/execute shape but never grants
/// group/other access, even if the source file did.
fn clamp_mode_from_source(src: &Path, dest: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mode = std::fs::metadata(src)?.permissions().mode() & 0o700;
        std::fs::set_permissions(dest, std::fs::Permissions::from_mode(mode))
    }
    #[cfg(not(unix))]
    {
        let _ = (src, dest);
        Ok(())
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
