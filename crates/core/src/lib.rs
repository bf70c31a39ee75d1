// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rb-core: shared types for the runbook execution engine.
//!
//! Holds the request/response data model, the claim authorizer, the typed
//! configuration surface, the error taxonomy, and the testable wall-clock
//! abstraction the rest of the workspace builds on.

pub mod authorize;
pub mod clock;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod model;

pub use authorize::{authorize, AuthorizationError};
pub use clock::{FakeWallClock, SystemWallClock, WallClock};
pub use config::Config;
pub use error::ServiceError;
pub use model::{Breadcrumb, ClaimSet, ConfigItem, ExecutionRecord, Operation, TokenContext};
