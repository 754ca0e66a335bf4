// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and positive throttle windows.

use crate::diagnostic::ConfigError;
use crate::model::WaymarkConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &WaymarkConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.conflicts.prompt_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "conflicts.prompt_interval_secs must be at least 1".to_string(),
        });
    }

    if config.conflicts.audit_log_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "conflicts.audit_log_path must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
