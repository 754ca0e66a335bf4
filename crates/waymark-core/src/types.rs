// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Waymark workspace.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// External identity of a chat user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// The two inbound update shapes handlers distinguish.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum EventKind {
    Message,
    Callback,
}

/// One inbound chat update, transport-agnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub user_id: UserId,
    pub kind: EventKind,
    /// Message text, when the update carries one.
    pub text: Option<String>,
    /// Callback payload, when the update is a button click.
    pub payload: Option<String>,
}

/// The single active interaction-flow record for one user.
///
/// At most one record exists per user at any instant; setting a new flow
/// replaces the previous one. `step` and `meta` are opaque here: the store
/// never validates or transitions them. Handlers own the vocabulary and can
/// recover their typed view through [`FlowRecord::step_as`] and
/// [`FlowRecord::meta_as`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub user_id: UserId,
    /// Which handler owns this record, e.g. `"explicit_upload"`.
    pub flow_name: String,
    /// Position within the owning handler's own sub-protocol.
    pub step: Option<Value>,
    /// Scratch data the owning handler accumulates across steps.
    pub meta: Map<String, Value>,
    /// Unix seconds of the last write. Every update refreshes this, which
    /// also restarts the TTL window.
    pub created_at: i64,
    /// Seconds after `created_at` at which the record expires. `None` means
    /// no expiry.
    pub ttl: Option<i64>,
}

impl FlowRecord {
    /// Whether the TTL window has elapsed as of `now`.
    ///
    /// A record is live through the full window: it expires only once
    /// `now - created_at` strictly exceeds `ttl`.
    pub fn is_expired(&self, now: i64) -> bool {
        match self.ttl {
            Some(ttl) => now - self.created_at > ttl,
            None => false,
        }
    }

    /// Deserialize `step` into a handler-owned type.
    ///
    /// Returns `None` when the step is absent or does not match `T`'s shape.
    pub fn step_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.step
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Deserialize the whole `meta` map into a handler-owned type.
    ///
    /// Returns `None` when the map does not match `T`'s shape.
    pub fn meta_as<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(Value::Object(self.meta.clone())).ok()
    }
}
