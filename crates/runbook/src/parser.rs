// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lossless extraction of runbook sections, fenced code blocks, and the
//! restricted YAML subset. Purely functional: nothing here touches the
//! filesystem or a clock.

use crate::types::{FileRequirements, ParsedRunbook, Sections};
use rb_core::ClaimSet;
use std::collections::BTreeMap;
use thiserror::Error;

/// A value in the restricted YAML subset: either a trimmed scalar string or
/// an ordered list of `- item` lines under a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YamlValue {
    Scalar(String),
    List(Vec<String>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum YamlError {
    #[error("list item `- {0}` has no preceding key")]
    ListItemWithoutKey(String),
    #[error("line is neither `key: value` nor `- item`: {0}")]
    UnrecognizedLine(String),
}

const SHELL_TAGS: [&str; 3] = ["sh", "zsh", "bash"];

/// Split `text` by top-level (`# `) headings. Each body runs until the next
/// top-level heading, or end of file for the last one.
pub fn sections(text: &str) -> Sections {
    let mut out: Vec<(String, String)> = Vec::new();
    let mut current_heading: Option<String> = None;
    let mut current_body = String::new();
    let mut in_fence = false;

    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            if current_heading.is_some() {
                current_body.push_str(line);
                current_body.push('\n');
            }
            continue;
        }
        if !in_fence && line.strip_prefix("# ").is_some() {
            if let Some(heading) = current_heading.take() {
                out.push((heading, std::mem::take(&mut current_body)));
            }
            current_heading = Some(line.strip_prefix("# ").unwrap_or("").trim().to_string());
        } else if !in_fence && line == "#" {
            if let Some(heading) = current_heading.take() {
                out.push((heading, std::mem::take(&mut current_body)));
            }
            current_heading = Some(String::new());
        } else if current_heading.is_some() {
            current_body.push_str(line);
            current_body.push('\n');
        }
    }
    if let Some(heading) = current_heading {
        out.push((heading, current_body));
    }
    Sections(out)
}

/// Returns the content of the first fenced code block tagged `language` in
/// `body`, or `None` if no such block exists.
pub fn fenced_block(body: &str, language: &str) -> Option<String> {
    let mut lines = body.lines();
    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();
        if let Some(tag) = trimmed.strip_prefix("```") {
            if tag.trim() == language {
                let mut content = String::new();
                for inner in lines.by_ref() {
                    if inner.trim_start().starts_with("```") {
                        return Some(content);
                    }
                    content.push_str(inner);
                    content.push('\n');
                }
                return Some(content);
            }
        }
    }
    None
}

/// Returns the content of the first fenced code block whose tag is any of
/// `sh`, `zsh`, `bash`.
fn fenced_shell_block(body: &str) -> Option<String> {
    SHELL_TAGS.iter().find_map(|tag| fenced_block(body, tag))
}

/// Parses the restricted YAML subset: `key: value` scalar lines and `- item`
/// list lines under the most recently seen key. No custom tags, anchors, or
/// executable constructs are recognized.
pub fn yaml_mapping(block: &str) -> Result<Vec<(String, YamlValue)>, YamlError> {
    let mut out: Vec<(String, YamlValue)> = Vec::new();
    let mut current_key: Option<String> = None;

    for raw_line in block.lines() {
        let line = raw_line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        let trimmed = line.trim_start();
        if let Some(item) = trimmed.strip_prefix("- ") {
            let key = current_key
                .clone()
                .ok_or_else(|| YamlError::ListItemWithoutKey(item.trim().to_string()))?;
            let item = item.trim().to_string();
            match out.iter_mut().find(|(k, _)| k == &key) {
                Some((_, YamlValue::List(items))) => items.push(item),
                Some((_, value)) => *value = YamlValue::List(vec![item]),
                None => out.push((key, YamlValue::List(vec![item]))),
            }
            continue;
        }
        if let Some((key, value)) = trimmed.split_once(':') {
            let key = key.trim().to_string();
            let value = value.trim().to_string();
            current_key = Some(key.clone());
            out.push((key, YamlValue::Scalar(value)));
            continue;
        }
        return Err(YamlError::UnrecognizedLine(line.to_string()));
    }
    Ok(out)
}

fn lookup<'a>(mapping: &'a [(String, YamlValue)], key: &str) -> Option<&'a YamlValue> {
    mapping.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

/// Returns the body of the Environment Requirements section's YAML block,
/// parsed into `(variable, description)` pairs, preserving declaration order.
pub fn environment_requirements_of(text: &str) -> Result<Option<Vec<(String, String)>>, YamlError> {
    let sections = sections(text);
    let Some(body) = sections.get("Environment Requirements") else {
        return Ok(None);
    };
    let block = fenced_block(body, "yaml").unwrap_or_default();
    let mapping = yaml_mapping(&block)?;
    let pairs = mapping
        .into_iter()
        .map(|(k, v)| {
            let description = match v {
                YamlValue::Scalar(s) => s,
                YamlValue::List(items) => items.join(", "),
            };
            (k, description)
        })
        .collect();
    Ok(Some(pairs))
}

/// Returns `{Input: [path], Output: [path]}` from the File System
/// Requirements block. Missing keys default to empty lists.
pub fn file_requirements_of(mapping: &[(String, YamlValue)]) -> FileRequirements {
    let as_list = |value: Option<&YamlValue>| -> Vec<String> {
        match value {
            Some(YamlValue::List(items)) => items.clone(),
            Some(YamlValue::Scalar(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    };
    FileRequirements {
        input: as_list(lookup(mapping, "Input")),
        output: as_list(lookup(mapping, "Output")),
    }
}

/// The fenced shell block under Script, or `None` if the section is absent
/// or its script block is only whitespace.
pub fn script_of(text: &str) -> Option<String> {
    let sections = sections(text);
    let body = sections.get("Script")?;
    let script = fenced_shell_block(body)?;
    if script.trim().is_empty() {
        None
    } else {
        Some(script)
    }
}

/// The Required Claims section parsed into a claim-name -> allowed-values
/// map. A missing section is absence (`None`), not an error. An empty block
/// yields an empty mapping, identical to absence for authorization purposes.
pub fn required_claims_of(text: &str) -> Result<Option<ClaimSet>, YamlError> {
    let sections = sections(text);
    let Some(body) = sections.get("Required Claims") else {
        return Ok(None);
    };
    let block = fenced_block(body, "yaml").unwrap_or_default();
    let mapping = yaml_mapping(&block)?;
    let mut claims: ClaimSet = BTreeMap::new();
    for (claim, value) in mapping {
        let scalar = match value {
            YamlValue::Scalar(s) => s,
            YamlValue::List(items) => items.join(","),
        };
        let values: Vec<String> = scalar
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        claims.insert(claim, values);
    }
    Ok(Some(claims))
}

/// Parses every field the rest of the workspace needs from a runbook's raw
/// text. Individual fields are `None`/carry an error string instead of
/// aborting the whole parse, so the validator can surface every problem.
pub fn parse(text: &str) -> ParsedRunbook {
    let secs = sections(text);
    let name = secs.get("Name").map(|b| b.trim().to_string());

    let (environment_requirements, environment_requirements_error) =
        match environment_requirements_of(text) {
            Ok(pairs) => (pairs, None),
            Err(e) => (None, Some(e.to_string())),
        };

    let file_requirements_block = secs
        .get("File System Requirements")
        .and_then(|b| fenced_block(b, "yaml"));
    let (file_requirements, file_requirements_error) = match &file_requirements_block {
        Some(block) => match yaml_mapping(block) {
            Ok(mapping) => (Some(file_requirements_of(&mapping)), None),
            Err(e) => (None, Some(e.to_string())),
        },
        None => (Some(FileRequirements::default()), None),
    };

    let required_claims = required_claims_of(text).unwrap_or(None);
    let script = script_of(text);

    ParsedRunbook {
        sections: secs,
        name,
        environment_requirements,
        environment_requirements_error,
        file_requirements,
        file_requirements_error,
        required_claims,
        script,
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
