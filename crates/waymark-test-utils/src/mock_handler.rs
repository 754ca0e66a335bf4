// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock flow handlers: one that records, one that always fails.

use async_trait::async_trait;
use tokio::sync::Mutex;

use waymark_core::types::{FlowRecord, InboundEvent};
use waymark_core::{FlowHandler, WaymarkError};

/// Handler that records every event and record it is given.
pub struct RecordingHandler {
    flow_name: String,
    seen: Mutex<Vec<(InboundEvent, FlowRecord)>>,
}

impl RecordingHandler {
    pub fn new(flow_name: &str) -> Self {
        Self {
            flow_name: flow_name.to_string(),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Everything delivered so far, in arrival order.
    pub async fn seen(&self) -> Vec<(InboundEvent, FlowRecord)> {
        self.seen.lock().await.clone()
    }
}

#[async_trait]
impl FlowHandler for RecordingHandler {
    fn flow_name(&self) -> &str {
        &self.flow_name
    }

    async fn on_event(
        &self,
        event: &InboundEvent,
        record: &FlowRecord,
    ) -> Result<(), WaymarkError> {
        self.seen.lock().await.push((event.clone(), record.clone()));
        Ok(())
    }
}

/// Handler that rejects every event it is given.
pub struct FailingHandler {
    flow_name: String,
}

impl FailingHandler {
    pub fn new(flow_name: &str) -> Self {
        Self {
            flow_name: flow_name.to_string(),
        }
    }
}

#[async_trait]
impl FlowHandler for FailingHandler {
    fn flow_name(&self) -> &str {
        &self.flow_name
    }

    async fn on_event(
        &self,
        _event: &InboundEvent,
        _record: &FlowRecord,
    ) -> Result<(), WaymarkError> {
        Err(WaymarkError::Internal(format!(
            "{} handler refused the event",
            self.flow_name
        )))
    }
}
