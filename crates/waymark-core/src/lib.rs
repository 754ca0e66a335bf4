// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Waymark flow tracker.
//!
//! This crate provides the shared types, the error type, and the
//! [`FlowHandler`] trait implemented by feature modules. The SQLite-backed
//! store, the conflict throttle, and the dispatcher live in sibling crates.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::WaymarkError;
pub use traits::FlowHandler;
pub use types::{EventKind, FlowRecord, InboundEvent, UserId};
