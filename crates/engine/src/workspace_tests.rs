// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[cfg(unix)]
fn mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).unwrap().permissions().mode() & 0o777
}

#[test]
fn create_yields_an_owner_only_directory() {
    let ws = Workspace::create().unwrap();
    assert!(ws.path().is_dir());
    #[cfg(unix)]
    assert_eq!(mode(ws.path()), 0o700);
    ws.dispose();
}

#[test]
fn write_script_is_owner_only_executable() {
    let ws = Workspace::create().unwrap();
    let script_path = ws.write_script("echo hi\n").unwrap();
    assert_eq!(std::fs::read_to_string(&script_path).unwrap(), "echo hi\n");
    #[cfg(unix)]
    assert_eq!(mode(&script_path), 0o700);
    ws.dispose();
}

#[test]
fn populate_copies_file_input_preserving_basename() {
    let runbook_dir = tempfile::tempdir().unwrap();
    std::fs::write(runbook_dir.path().join("config.txt"), "hello").unwrap();
    let ws = Workspace::create().unwrap();

    let errors = ws.populate(runbook_dir.path(), &["config.txt".to_string()]);
    assert!(errors.is_empty(), "errors: {errors:?}");
    assert_eq!(
        std::fs::read_to_string(ws.path().join("config.txt")).unwrap(),
        "hello"
    );
    ws.dispose();
}

#[test]
fn populate_copies_directory_input_recursively() {
    let runbook_dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(runbook_dir.path().join("data/nested")).unwrap();
    std::fs::write(runbook_dir.path().join("data/nested/file.txt"), "x").unwrap();
    let ws = Workspace::create().unwrap();

    let errors = ws.populate(runbook_dir.path(), &["data".to_string()]);
    assert!(errors.is_empty(), "errors: {errors:?}");
    assert_eq!(
        std::fs::read_to_string(ws.path().join("data/nested/file.txt")).unwrap(),
        "x"
    );
    ws.dispose();
}

#[test]
#[cfg(unix)]
fn populate_preserves_source_mode_masked_to_owner_only() {
    let runbook_dir = tempfile::tempdir().unwrap();
    let src = runbook_dir.path().join("readonly.txt");
    std::fs::write(&src, "hello").unwrap();
    std::fs::set_permissions(&src, std::fs::Permissions::from_mode(0o444)).unwrap();
    let ws = Workspace::create().unwrap();

    let errors = ws.populate(runbook_dir.path(), &["readonly.txt".to_string()]);
    assert!(errors.is_empty(), "errors: {errors:?}");
    assert_eq!(mode(&ws.path().join("readonly.txt")), 0o400);
    ws.dispose();
}

#[test]
fn populate_rejects_missing_input() {
    let runbook_dir = tempfile::tempdir().unwrap();
    let ws = Workspace::create().unwrap();
    let errors = ws.populate(runbook_dir.path(), &["nope.txt".to_string()]);
    assert!(matches!(errors.as_slice(), [WorkspaceError::InputMissing(p)] if p == "nope.txt"));
    ws.dispose();
}

#[test]
fn populate_rejects_path_that_escapes_runbook_directory() {
    let runbook_dir = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();
    std::fs::write(outside.path().join("secret.txt"), "shh").unwrap();
    let escape = format!(
        "../{}/secret.txt",
        outside.path().file_name().unwrap().to_string_lossy()
    );
    let ws = Workspace::create().unwrap();
    let errors = ws.populate(runbook_dir.path(), &[escape]);
    assert!(matches!(errors.as_slice(), [WorkspaceError::PathEscape(_)]));
    ws.dispose();
}

#[test]
fn populate_rejects_basename_collisions() {
    let runbook_dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(runbook_dir.path().join("sub")).unwrap();
    std::fs::write(runbook_dir.path().join("config.txt"), "a").unwrap();
    std::fs::write(runbook_dir.path().join("sub/config.txt"), "b").unwrap();
    let ws = Workspace::create().unwrap();
    let errors = ws.populate(
        runbook_dir.path(),
        &["config.txt".to_string(), "sub/config.txt".to_string()],
    );
    assert!(errors
        .iter()
        .any(|e| matches!(e, WorkspaceError::NameCollision(name) if name == "config.txt")));
    ws.dispose();
}

#[test]
fn populate_continues_past_errors_to_report_every_input() {
    let runbook_dir = tempfile::tempdir().unwrap();
    std::fs::write(runbook_dir.path().join("ok.txt"), "ok").unwrap();
    let ws = Workspace::create().unwrap();
    let errors = ws.populate(
        runbook_dir.path(),
        &[
            "ok.txt".to_string(),
            "missing-a.txt".to_string(),
            "missing-b.txt".to_string(),
        ],
    );
    assert_eq!(errors.len(), 2);
    ws.dispose();
}

#[test]
fn dispose_removes_the_directory() {
    let ws = Workspace::create().unwrap();
    let path = ws.path().to_path_buf();
    ws.dispose();
    assert!(!path.exists());
}
