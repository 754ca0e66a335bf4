// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for Waymark's own test suites.
//!
//! Everything here is plain non-test code so downstream crates can pull it
//! in as a dev-dependency: a [`TestHarness`] wiring a temporary store and
//! throttle together, plus mock [`FlowHandler`](waymark_core::FlowHandler)
//! implementations that record or reject what they receive.

pub mod harness;
pub mod mock_handler;

pub use harness::{TestHarness, TestHarnessBuilder, callback_event, message_event};
pub use mock_handler::{FailingHandler, RecordingHandler};
