// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handler trait implemented by feature modules that own a flow.

use async_trait::async_trait;

use crate::error::WaymarkError;
use crate::types::{FlowRecord, InboundEvent};

/// A feature module that owns one named flow.
///
/// The dispatcher routes an inbound event to the handler whose
/// [`flow_name`](FlowHandler::flow_name) matches the user's active record.
/// Handlers never see events that belong to another feature's flow.
#[async_trait]
pub trait FlowHandler: Send + Sync + 'static {
    /// The flow this handler owns. Must be stable and unique per feature.
    fn flow_name(&self) -> &str;

    /// Handle one inbound event for this handler's own flow.
    ///
    /// `record` is the user's active flow record at dispatch time. Errors
    /// are logged by the dispatcher and never propagated to the event
    /// source.
    async fn on_event(
        &self,
        event: &InboundEvent,
        record: &FlowRecord,
    ) -> Result<(), WaymarkError>;
}
