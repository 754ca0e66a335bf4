// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Re-exports of the shared flow model types.

pub use waymark_core::types::{FlowRecord, UserId};
