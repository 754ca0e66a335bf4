// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Waymark flow tracker.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Waymark configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WaymarkConfig {
    /// Flow-store storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Flow lifecycle settings.
    #[serde(default)]
    pub flows: FlowsConfig,

    /// Conflict-prompt throttle settings.
    #[serde(default)]
    pub conflicts: ConflictsConfig,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("waymark").join("waymark.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("waymark.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Flow lifecycle configuration.
///
/// Expiry is always enforced lazily on read; the sweeper only bounds table
/// growth from abandoned flows.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FlowsConfig {
    /// Background expiry sweep interval in seconds. `0` disables the sweeper.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for FlowsConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_sweep_interval_secs() -> u64 {
    0
}

/// Conflict-prompt throttle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConflictsConfig {
    /// Cool-down window in seconds between "wrong flow" prompts per user.
    #[serde(default = "default_prompt_interval_secs")]
    pub prompt_interval_secs: u64,

    /// Path of the append-only conflict audit log.
    #[serde(default = "default_audit_log_path")]
    pub audit_log_path: String,
}

impl Default for ConflictsConfig {
    fn default() -> Self {
        Self {
            prompt_interval_secs: default_prompt_interval_secs(),
            audit_log_path: default_audit_log_path(),
        }
    }
}

fn default_prompt_interval_secs() -> u64 {
    60
}

fn default_audit_log_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("waymark").join("flow_conflicts.log"))
        .unwrap_or_else(|| std::path::PathBuf::from("flow_conflicts.log"))
        .to_string_lossy()
        .into_owned()
}
