// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rb-service: the orchestrator that binds the parser, validator, authorizer,
//! workspace, executor, recursion guard and history recorder into the
//! `list`, `get`, `required_env`, `validate`, `execute` operations a
//! transport layer calls.

pub mod service;

pub use service::{EnvRequirement, Service};
