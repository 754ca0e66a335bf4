// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dispatcher: one registered handler per flow name.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tracing::{debug, error, warn};

use waymark_conflict::ConflictThrottle;
use waymark_core::types::InboundEvent;
use waymark_core::{FlowHandler, WaymarkError};
use waymark_store::FlowStore;

/// What happened to one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The user's active flow had a registered handler; the event reached it.
    Delivered { flow_name: String },
    /// The user has no live flow; the event is the caller's to interpret.
    NoActiveFlow,
    /// A flow is active but nothing is registered for it. `prompt` says
    /// whether the user should be nudged about the stuck flow this time.
    Unhandled { flow_name: String, prompt: bool },
}

/// Routes each inbound event to the handler owning the user's active flow.
pub struct FlowDispatcher {
    store: Arc<FlowStore>,
    throttle: Arc<ConflictThrottle>,
    handlers: HashMap<String, Arc<dyn FlowHandler>>,
}

impl FlowDispatcher {
    pub fn new(store: Arc<FlowStore>, throttle: Arc<ConflictThrottle>) -> Self {
        Self {
            store,
            throttle,
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under its flow name.
    ///
    /// Exactly one handler may own a flow name; a second registration is
    /// rejected rather than silently replacing the first.
    pub fn register(&mut self, handler: Arc<dyn FlowHandler>) -> Result<(), WaymarkError> {
        match self.handlers.entry(handler.flow_name().to_string()) {
            Entry::Occupied(entry) => Err(WaymarkError::DuplicateHandler {
                flow_name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                debug!(flow = %entry.key(), "flow handler registered");
                entry.insert(handler);
                Ok(())
            }
        }
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Route one event.
    ///
    /// Handler failures are logged, not surfaced: by the time a handler
    /// runs, the event has been delivered, and the message loop must not
    /// crash because one flow misbehaved.
    pub async fn dispatch(&self, event: &InboundEvent) -> DispatchOutcome {
        let Some(record) = self.store.get(event.user_id).await else {
            return DispatchOutcome::NoActiveFlow;
        };

        match self.handlers.get(&record.flow_name) {
            Some(handler) => {
                if let Err(e) = handler.on_event(event, &record).await {
                    error!(
                        user_id = event.user_id.0,
                        flow = %record.flow_name,
                        error = %e,
                        "flow handler failed"
                    );
                }
                DispatchOutcome::Delivered {
                    flow_name: record.flow_name,
                }
            }
            None => {
                let prompt = self.throttle.should_prompt(
                    event.user_id,
                    &record.flow_name,
                    "no_registered_handler",
                );
                warn!(
                    user_id = event.user_id.0,
                    flow = %record.flow_name,
                    prompt,
                    "event for a flow with no registered handler"
                );
                DispatchOutcome::Unhandled {
                    flow_name: record.flow_name,
                    prompt,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_test_utils::{RecordingHandler, TestHarness};

    #[tokio::test]
    async fn registering_the_same_flow_twice_fails() {
        let harness = TestHarness::builder().build().await.unwrap();
        let mut dispatcher = FlowDispatcher::new(harness.store.clone(), harness.throttle.clone());

        dispatcher
            .register(Arc::new(RecordingHandler::new("explicit_upload")))
            .unwrap();
        let err = dispatcher
            .register(Arc::new(RecordingHandler::new("explicit_upload")))
            .unwrap_err();

        assert!(matches!(
            err,
            WaymarkError::DuplicateHandler { ref flow_name } if flow_name == "explicit_upload"
        ));
        assert_eq!(dispatcher.len(), 1);
    }

    #[tokio::test]
    async fn distinct_flows_register_side_by_side() {
        let harness = TestHarness::builder().build().await.unwrap();
        let mut dispatcher = FlowDispatcher::new(harness.store.clone(), harness.throttle.clone());
        assert!(dispatcher.is_empty());

        dispatcher
            .register(Arc::new(RecordingHandler::new("explicit_upload")))
            .unwrap();
        dispatcher
            .register(Arc::new(RecordingHandler::new("broadcast")))
            .unwrap();
        assert_eq!(dispatcher.len(), 2);
    }
}
