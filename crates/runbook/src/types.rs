// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared shapes produced by the parser and consumed by the validator and
//! the engine.

use rb_core::ClaimSet;

/// Ordered heading -> body map, as split by top-level (`# `) headings.
/// Order is preserved because "History" must be the last H1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections(pub Vec<(String, String)>);

impl Sections {
    pub fn get(&self, heading: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(h, _)| h == heading)
            .map(|(_, b)| b.as_str())
    }

    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(h, _)| h.as_str())
    }

    pub fn last_heading(&self) -> Option<&str> {
        self.0.last().map(|(h, _)| h.as_str())
    }

    pub fn contains(&self, heading: &str) -> bool {
        self.0.iter().any(|(h, _)| h == heading)
    }
}

/// File System Requirements, each list defaulting to empty when its key is
/// absent from the block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRequirements {
    pub input: Vec<String>,
    pub output: Vec<String>,
}

/// The fields of a runbook document that the rest of the workspace needs,
/// gathered by [`crate::parser`] from the raw section map. Parsing this
/// struct never fails outright: individual fields are `None`/empty when a
/// section is missing or its YAML subset fails to parse, so the validator
/// can report every problem in one pass instead of stopping at the first.
#[derive(Debug, Clone)]
pub struct ParsedRunbook {
    pub sections: Sections,
    pub name: Option<String>,
    pub environment_requirements: Option<Vec<(String, String)>>,
    pub environment_requirements_error: Option<String>,
    pub file_requirements: Option<FileRequirements>,
    pub file_requirements_error: Option<String>,
    pub required_claims: Option<ClaimSet>,
    pub script: Option<String>,
}
