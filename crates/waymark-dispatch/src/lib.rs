// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Centralized event routing for flow-bound users.
//!
//! Surfaces register one handler per flow name; the dispatcher looks up
//! the event user's active flow and hands the event to exactly that
//! handler. Everything else (no flow, no handler) is reported as an
//! outcome instead of an error, so the surrounding message loop stays in
//! control of what to tell the user.

pub mod dispatcher;

pub use dispatcher::{DispatchOutcome, FlowDispatcher};
