// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reserved non-zero return codes for outcomes that never reach the child shell.
//!
//! The source material left the authorization-denial code ambiguous between
//! `1` and `403`; this workspace picks `77` (BSD `sysexits.h`'s
//! `EX_NOPERM`-adjacent range) so it can never collide with a script's own
//! exit status or the shell-reserved 126-165 range.

/// Required claims were not satisfied by the caller's token.
pub const AUTHORIZATION_DENIED: i32 = 77;

/// The inbound recursion stack already contained the target runbook, or the
/// stack exceeded the configured depth limit.
pub const RECURSION_DETECTED: i32 = 78;

/// The spawned script was terminated for exceeding `script_timeout_seconds`.
pub const SCRIPT_TIMEOUT: i32 = 124;
