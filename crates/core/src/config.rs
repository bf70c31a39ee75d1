// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed configuration for the core. Loading a `Config` from disk is in
//! scope; wiring it to CLI flags or environment variables is not.

use serde::Deserialize;
use thiserror::Error;

fn default_script_timeout_seconds() -> u64 {
    600
}

fn default_max_output_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_max_recursion_depth() -> usize {
    50
}

fn default_shell_path() -> String {
    "zsh".to_string()
}

/// Recognized configuration options for the core, per the External
/// Interfaces section of the spec.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_script_timeout_seconds")]
    pub script_timeout_seconds: u64,
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
    #[serde(default = "default_max_recursion_depth")]
    pub max_recursion_depth: usize,
    #[serde(default = "default_shell_path")]
    pub shell_path: String,
    pub api_protocol: String,
    pub api_host: String,
    pub api_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            script_timeout_seconds: default_script_timeout_seconds(),
            max_output_bytes: default_max_output_bytes(),
            max_recursion_depth: default_max_recursion_depth(),
            shell_path: default_shell_path(),
            api_protocol: "https".to_string(),
            api_host: "localhost".to_string(),
            api_port: 8443,
        }
    }
}

impl Config {
    /// The base URL exported to scripts as `RUNBOOK_URL` / `RUNBOOK_API_BASE_URL`.
    pub fn api_base_url(&self) -> String {
        format!("{}://{}:{}", self.api_protocol, self.api_host, self.api_port)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Parse)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Self::from_toml_str(&text)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
