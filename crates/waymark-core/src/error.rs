// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Waymark flow tracker.

use thiserror::Error;

/// The primary error type used across all Waymark crates.
#[derive(Debug, Error)]
pub enum WaymarkError {
    /// Configuration errors (invalid TOML, missing required fields, semantic checks).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database open, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A handler was registered for a flow name that already has an owner.
    #[error("duplicate handler for flow: {flow_name}")]
    DuplicateHandler { flow_name: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
