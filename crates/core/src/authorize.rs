// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authorizer: decides whether a token context satisfies a required-claim
//! set. Pure function, no I/O — the runbook file has already been parsed by
//! the time this runs.

use crate::model::ClaimSet;
use thiserror::Error;

/// Authorization passes iff, for every required claim name `C` with
/// required values `R(C)`, the token's held values `H(C)` intersect `R(C)`.
/// An absent required-claim section passes unconditionally; an absent claim
/// on the token when the claim is required fails.
pub fn authorize(required: &ClaimSet, held: &ClaimSet) -> Result<(), AuthorizationError> {
    for (claim, allowed_values) in required {
        let held_values = match held.get(claim) {
            Some(values) => values,
            None => {
                return Err(AuthorizationError {
                    claim: claim.clone(),
                });
            }
        };
        let satisfied = held_values.iter().any(|v| allowed_values.contains(v));
        if !satisfied {
            return Err(AuthorizationError {
                claim: claim.clone(),
            });
        }
    }
    Ok(())
}

/// The first required claim that the token failed to satisfy.
#[derive(Debug, Error)]
#[error("required claim not satisfied: {claim}")]
pub struct AuthorizationError {
    pub claim: String,
}

#[cfg(test)]
#[path = "authorize_tests.rs"]
mod tests;
