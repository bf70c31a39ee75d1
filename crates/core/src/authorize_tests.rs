// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::BTreeMap;
use yare::parameterized;

fn claims(pairs: &[(&str, &[&str])]) -> ClaimSet {
    pairs
        .iter()
        .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
        .collect::<BTreeMap<_, _>>()
}

#[test]
fn absent_required_claims_section_passes_unconditionally() {
    let required = ClaimSet::new();
    let held = claims(&[("roles", &["viewer"])]);
    assert!(authorize(&required, &held).is_ok());
}

#[test]
fn empty_required_claims_section_passes_unconditionally() {
    let required = claims(&[]);
    let held = ClaimSet::new();
    assert!(authorize(&required, &held).is_ok());
}

#[parameterized(
    developer_held = { &["developer"] },
    admin_held = { &["admin"] },
    both_held = { &["developer", "admin"] },
)]
fn intersecting_values_pass(held_roles: &[&str]) {
    let required = claims(&[("roles", &["developer", "admin"])]);
    let held = claims(&[("roles", held_roles)]);
    assert!(authorize(&required, &held).is_ok());
}

#[test]
fn disjoint_values_fail() {
    let required = claims(&[("roles", &["developer", "admin"])]);
    let held = claims(&[("roles", &["viewer"])]);
    let err = authorize(&required, &held).unwrap_err();
    assert_eq!(err.claim, "roles");
}

#[test]
fn absent_claim_on_token_fails_when_required() {
    let required = claims(&[("roles", &["developer"])]);
    let held = ClaimSet::new();
    let err = authorize(&required, &held).unwrap_err();
    assert_eq!(err.claim, "roles");
}

#[test]
fn multiple_required_claims_all_must_be_satisfied() {
    let required = claims(&[("roles", &["developer"]), ("team", &["infra"])]);
    let held = claims(&[("roles", &["developer"]), ("team", &["payments"])]);
    let err = authorize(&required, &held).unwrap_err();
    assert_eq!(err.claim, "team");
}
