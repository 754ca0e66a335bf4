// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conflict handling for users who poke a flow they are not in.
//!
//! When an event lands on a flow with no registered handler, the user may
//! deserve a "finish your current flow first" prompt. This crate decides
//! whether to send one (at most once per user per interval) and keeps an
//! append-only audit trail of every conflict, prompted or not.

pub mod throttle;

pub use throttle::ConflictThrottle;
