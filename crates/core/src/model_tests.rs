// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sample_breadcrumb() -> Breadcrumb {
    Breadcrumb {
        received_at: chrono::Utc::now(),
        user_id: "alice".to_string(),
        source_addr: "10.0.0.1".to_string(),
        correlation_id: "corr-1".to_string(),
        recursion_stack: vec!["A.md".to_string()],
    }
}

#[test]
fn breadcrumb_extend_stack_appends_without_mutating_original() {
    let original = sample_breadcrumb();
    let extended = original.with_extended_stack("B.md");
    assert_eq!(original.recursion_stack, vec!["A.md".to_string()]);
    assert_eq!(
        extended.recursion_stack,
        vec!["A.md".to_string(), "B.md".to_string()]
    );
}

#[test]
fn config_item_secret_masks_value() {
    let item = ConfigItem::new("API_KEY", "sk-real-value", "env_vars").secret();
    assert_eq!(item.value, "***");
    assert!(item.secret);
}

#[test]
fn config_item_plain_keeps_value() {
    let item = ConfigItem::new("PATH", "/usr/bin", "env_vars");
    assert_eq!(item.value, "/usr/bin");
    assert!(!item.secret);
}

#[test]
fn execution_record_success_requires_zero_code_and_no_errors() {
    let record = ExecutionRecord {
        start: chrono::Utc::now(),
        finish: chrono::Utc::now(),
        return_code: 0,
        operation: Operation::Execute,
        breadcrumb: sample_breadcrumb(),
        config_items: vec![],
        stdout: "ok\n".to_string(),
        stderr: String::new(),
        errors: vec![],
        warnings: vec![],
    };
    assert!(record.success());

    let mut failed = record.clone();
    failed.return_code = 1;
    assert!(!failed.success());
}

#[test]
fn operation_display_matches_wire_names() {
    assert_eq!(Operation::Validate.to_string(), "validate");
    assert_eq!(Operation::Execute.to_string(), "execute");
}

#[test]
fn operation_serializes_as_snake_case() {
    let json = serde_json::to_string(&Operation::Validate).unwrap();
    assert_eq!(json, "\"validate\"");
}
