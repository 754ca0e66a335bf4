// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for Waymark collaborators.

pub mod handler;

pub use handler::FlowHandler;
