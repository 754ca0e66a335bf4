// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./waymark.toml` > `~/.config/waymark/waymark.toml` > `/etc/waymark/waymark.toml`
//! with environment variable overrides via `WAYMARK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::WaymarkConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/waymark/waymark.toml` (system-wide)
/// 3. `~/.config/waymark/waymark.toml` (user XDG config)
/// 4. `./waymark.toml` (local directory)
/// 5. `WAYMARK_*` environment variables
pub fn load_config() -> Result<WaymarkConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a specific TOML string only (no XDG lookup).
///
/// Used for testing and for explicitly chosen config files.
pub fn load_config_from_str(toml_content: &str) -> Result<WaymarkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WaymarkConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<WaymarkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WaymarkConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(WaymarkConfig::default()))
        .merge(Toml::file("/etc/waymark/waymark.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("waymark/waymark.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("waymark.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `WAYMARK_STORAGE_DATABASE_PATH` must map
/// to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("WAYMARK_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: WAYMARK_CONFLICTS_PROMPT_INTERVAL_SECS -> "conflicts_prompt_interval_secs"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("storage_", "storage.", 1)
            .replacen("flows_", "flows.", 1)
            .replacen("conflicts_", "conflicts.", 1);
        mapped.into()
    })
}
