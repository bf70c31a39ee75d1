// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rb-runbook: the markdown runbook dialect's parser and validator.
//!
//! Pipeline: [`parser`] lossily-free extraction of sections, fenced blocks
//! and the restricted YAML subset, followed by [`validator`], which composes
//! those parser outputs into a pass/fail report without ever executing the
//! script or mutating the runbook.

pub mod parser;
pub mod types;
pub mod validator;

pub use parser::{
    environment_requirements_of, fenced_block, parse, required_claims_of, script_of, sections,
    yaml_mapping, YamlError, YamlValue,
};
pub use types::{FileRequirements, ParsedRunbook, Sections};
pub use validator::{validate_runbook, ValidationReport};
