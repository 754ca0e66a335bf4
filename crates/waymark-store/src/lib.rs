// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed persistence for per-user flow state.
//!
//! Each user holds at most one flow record; starting a new flow replaces
//! the previous one. Reads apply TTL expiry lazily, and an optional
//! background sweeper bounds table growth from flows nobody reads again.

pub mod database;
pub mod migrations;
pub mod models;
pub mod store;
pub mod sweeper;

pub use database::Database;
pub use store::FlowStore;
pub use sweeper::spawn_sweeper;
