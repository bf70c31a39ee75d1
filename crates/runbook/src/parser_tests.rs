// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use std::collections::BTreeMap;
use yare::parameterized;

const SAMPLE: &str = "\
# SimpleRunbook

A runbook that prints ok.

# Environment Requirements

```yaml
GREETING: the greeting to print
```

# File System Requirements

```yaml
Input:
  - config.txt
Output:
  - result.txt
```

# Required Claims

```yaml
roles: developer, admin
```

# Script

```sh
echo ok
```

# History
";

#[test]
fn sections_splits_on_top_level_headings_in_order() {
    let secs = sections(SAMPLE);
    let headings: Vec<&str> = secs.headings().collect();
    assert_eq!(
        headings,
        vec![
            "SimpleRunbook",
            "Environment Requirements",
            "File System Requirements",
            "Required Claims",
            "Script",
            "History",
        ]
    );
    assert_eq!(secs.last_heading(), Some("History"));
}

#[test]
fn sections_ignores_hash_lines_inside_fenced_blocks() {
    let text = "# Script\n\n```sh\n# this is a shell comment, not a heading\necho hi\n```\n\n# History\n";
    let secs = sections(text);
    let headings: Vec<&str> = secs.headings().collect();
    assert_eq!(headings, vec!["Script", "History"]);
    assert!(secs.get("Script").unwrap().contains("# this is a shell comment"));
}

#[parameterized(
    sh = { "sh" },
    zsh = { "zsh" },
    bash = { "bash" },
)]
fn fenced_block_recognizes_shell_tags(tag: &str) {
    let body = format!("prose\n\n```{tag}\necho hi\n```\n");
    assert_eq!(fenced_block(&body, tag), Some("echo hi\n".to_string()));
}

#[test]
fn fenced_block_returns_none_when_absent() {
    assert_eq!(fenced_block("no fences here", "yaml"), None);
}

#[test]
fn yaml_mapping_parses_scalars_and_lists() {
    let block = "Input:\n  - a.txt\n  - b.txt\nOutput:\n  - c.txt\n";
    let mapping = yaml_mapping(block).unwrap();
    assert_eq!(
        mapping,
        vec![
            (
                "Input".to_string(),
                YamlValue::List(vec!["a.txt".to_string(), "b.txt".to_string()])
            ),
            (
                "Output".to_string(),
                YamlValue::List(vec!["c.txt".to_string()])
            ),
        ]
    );
}

#[test]
fn yaml_mapping_rejects_list_item_without_key() {
    let err = yaml_mapping("- orphan\n").unwrap_err();
    assert_eq!(err, YamlError::ListItemWithoutKey("orphan".to_string()));
}

#[test]
fn yaml_mapping_empty_block_yields_empty_mapping() {
    assert_eq!(yaml_mapping("").unwrap(), vec![]);
    assert_eq!(yaml_mapping("\n\n").unwrap(), vec![]);
}

#[test]
fn script_of_extracts_shell_block() {
    assert_eq!(script_of(SAMPLE), Some("echo ok\n".to_string()));
}

#[test]
fn script_of_whitespace_only_is_missing() {
    let text = "# Script\n\n```sh\n   \n\n```\n\n# History\n";
    assert_eq!(script_of(text), None);
}

#[test]
fn script_of_missing_section_is_missing() {
    assert_eq!(script_of("# Name\nbody\n"), None);
}

#[test]
fn required_claims_of_absent_section_is_none() {
    let text = "# Name\nbody\n# History\n";
    assert_eq!(required_claims_of(text).unwrap(), None);
}

#[test]
fn required_claims_of_empty_block_is_empty_mapping() {
    let text = "# Required Claims\n\n```yaml\n```\n\n# History\n";
    assert_eq!(required_claims_of(text).unwrap(), Some(BTreeMap::new()));
}

#[test]
fn required_claims_of_splits_comma_separated_values_and_drops_empties() {
    let text = "# Required Claims\n\n```yaml\nroles: developer, admin, \n```\n\n# History\n";
    let claims = required_claims_of(text).unwrap().unwrap();
    assert_eq!(
        claims.get("roles"),
        Some(&vec!["developer".to_string(), "admin".to_string()])
    );
}

#[test]
fn file_requirements_of_defaults_missing_keys_to_empty() {
    let mapping = yaml_mapping("Input:\n  - a.txt\n").unwrap();
    let reqs = file_requirements_of(&mapping);
    assert_eq!(reqs.input, vec!["a.txt".to_string()]);
    assert_eq!(reqs.output, Vec::<String>::new());
}

#[test]
fn environment_requirements_of_preserves_declaration_order() {
    let text = "# Environment Requirements\n\n```yaml\nZEBRA: z\nAARDVARK: a\n```\n\n# History\n";
    let vars = environment_requirements_of(text).unwrap().unwrap();
    assert_eq!(
        vars,
        vec![
            ("ZEBRA".to_string(), "z".to_string()),
            ("AARDVARK".to_string(), "a".to_string()),
        ]
    );
}

#[test]
fn parse_gathers_all_sample_fields() {
    let parsed = parse(SAMPLE);
    assert_eq!(parsed.name.as_deref(), Some("SimpleRunbook"));
    assert!(parsed.script.is_some());
    assert!(parsed.required_claims.is_some());
    assert_eq!(
        parsed.file_requirements.as_ref().unwrap().input,
        vec!["config.txt".to_string()]
    );
}

proptest! {
    #[test]
    fn yaml_mapping_round_trips_simple_scalars(
        pairs in prop::collection::vec(
            ("[a-zA-Z][a-zA-Z0-9_]{0,10}", "[a-zA-Z0-9 ]{0,20}"),
            0..6,
        )
    ) {
        let mut seen = std::collections::HashSet::new();
        let unique: Vec<(String, String)> = pairs
            .into_iter()
            .filter(|(k, _)| seen.insert(k.clone()))
            .collect();
        let rendered: String = unique
            .iter()
            .map(|(k, v)| format!("{k}: {v}\n"))
            .collect();
        let parsed = yaml_mapping(&rendered).unwrap();
        let recovered: Vec<(String, String)> = parsed
            .into_iter()
            .map(|(k, v)| match v {
                YamlValue::Scalar(s) => (k, s),
                YamlValue::List(_) => (k, String::new()),
            })
            .collect();
        prop_assert_eq!(recovered, unique);
    }
}
