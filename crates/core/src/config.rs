// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration surface consumed by the core (SPEC_FULL.md §10). Resolution
//! order, highest priority first: environment variables, an optional TOML
//! file, then built-in defaults — the same layering the teacher daemon uses
//! for its `Config::load()`.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One board to poll: a ticketing-platform repo plus the project view on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub repo: String,
    pub project: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub state_dir: PathBuf,
    pub poll_interval: Duration,
    pub max_concurrent_workflows: usize,
    pub watched_statuses: Vec<String>,
    pub allowed_username: String,
    pub daemon_identity: String,
    #[serde(default)]
    pub stage_models: HashMap<String, String>,
    pub stale_threshold: Duration,
    pub hibernation_probe_interval: Duration,
    #[serde(default)]
    pub boards: Vec<BoardConfig>,
}

impl Config {
    pub fn lock_path(&self) -> PathBuf {
        self.state_dir.join("kiln.lock")
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join("kiln.log")
    }

    pub fn db_path(&self) -> PathBuf {
        self.state_dir.join("kiln.db")
    }

    fn default_state_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("KILN_STATE_DIR") {
            return PathBuf::from(dir);
        }
        if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
            return PathBuf::from(xdg).join("kiln");
        }
        dirs_state_home_fallback()
    }

    /// Load configuration: environment variables override an optional TOML
    /// file (`config_path`), which in turn overrides built-in defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Config, CoreError> {
        let mut file_values: toml::Value = match config_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    CoreError::Adapter(crate::error::AdapterError::Configuration(format!(
                        "failed to read config file {}: {e}",
                        path.display()
                    )))
                })?;
                toml::from_str(&raw).map_err(|e| {
                    CoreError::Adapter(crate::error::AdapterError::Configuration(format!(
                        "invalid config file {}: {e}",
                        path.display()
                    )))
                })?
            }
            None => toml::Value::Table(Default::default()),
        };

        let table = file_values
            .as_table_mut()
            .ok_or_else(|| {
                CoreError::Adapter(crate::error::AdapterError::Configuration(
                    "config file must be a TOML table".to_string(),
                ))
            })?
            .clone();

        let state_dir = env_or("KILN_STATE_DIR")
            .map(PathBuf::from)
            .or_else(|| table.get("state_dir").and_then(|v| v.as_str()).map(PathBuf::from))
            .unwrap_or_else(Self::default_state_dir);

        let poll_interval = Duration::from_secs(
            env_or("KILN_POLL_INTERVAL")
                .and_then(|v| v.parse().ok())
                .or_else(|| table.get("poll_interval").and_then(|v| v.as_integer()).map(|n| n as u64))
                .unwrap_or(30),
        );

        let max_concurrent_workflows = env_or("KILN_MAX_CONCURRENT_WORKFLOWS")
            .and_then(|v| v.parse().ok())
            .or_else(|| {
                table
                    .get("max_concurrent_workflows")
                    .and_then(|v| v.as_integer())
                    .map(|n| n as usize)
            })
            .unwrap_or(3);

        let watched_statuses = env_or("KILN_WATCHED_STATUSES")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .or_else(|| {
                table.get("watched_statuses").and_then(|v| v.as_array()).map(|a| {
                    a.iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect()
                })
            })
            .unwrap_or_else(|| {
                vec!["Research".to_string(), "Plan".to_string(), "Implement".to_string()]
            });

        let allowed_username = env_or("KILN_ALLOWED_USERNAME")
            .or_else(|| table.get("allowed_username").and_then(|v| v.as_str()).map(str::to_string))
            .ok_or_else(|| {
                CoreError::Adapter(crate::error::AdapterError::Configuration(
                    "ALLOWED_USERNAME is required".to_string(),
                ))
            })?;

        let daemon_identity = env_or("KILN_DAEMON_IDENTITY")
            .or_else(|| table.get("daemon_identity").and_then(|v| v.as_str()).map(str::to_string))
            .ok_or_else(|| {
                CoreError::Adapter(crate::error::AdapterError::Configuration(
                    "DAEMON_IDENTITY is required".to_string(),
                ))
            })?;

        let stale_threshold = Duration::from_secs(
            env_or("KILN_STALE_THRESHOLD")
                .and_then(|v| v.parse().ok())
                .or_else(|| table.get("stale_threshold").and_then(|v| v.as_integer()).map(|n| n as u64))
                .unwrap_or(3600),
        );

        let hibernation_probe_interval = Duration::from_secs(
            env_or("KILN_HIBERNATION_PROBE_INTERVAL")
                .and_then(|v| v.parse().ok())
                .or_else(|| {
                    table
                        .get("hibernation_probe_interval")
                        .and_then(|v| v.as_integer())
                        .map(|n| n as u64)
                })
                .unwrap_or(300),
        );

        let boards = table
            .get("boards")
            .and_then(|v| Vec::<BoardConfig>::deserialize(v.clone()).ok())
            .unwrap_or_default();

        let stage_models = table
            .get("stage_models")
            .and_then(|v| HashMap::<String, String>::deserialize(v.clone()).ok())
            .unwrap_or_default();

        Ok(Config {
            state_dir,
            poll_interval,
            max_concurrent_workflows,
            watched_statuses,
            allowed_username,
            daemon_identity,
            stage_models,
            stale_threshold,
            hibernation_probe_interval,
            boards,
        })
    }
}

fn env_or(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(not(target_os = "windows"))]
fn dirs_state_home_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(|home| PathBuf::from(home).join(".local/state/kiln"))
        .unwrap_or_else(|_| PathBuf::from("/tmp/kiln-state"))
}

#[cfg(target_os = "windows")]
fn dirs_state_home_fallback() -> PathBuf {
    std::env::var("LOCALAPPDATA")
        .map(|dir| PathBuf::from(dir).join("kiln"))
        .unwrap_or_else(|_| PathBuf::from("kiln-state"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
