// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Disposable store + throttle pair backed by a temp directory.

use std::path::PathBuf;
use std::sync::Arc;

use waymark_config::model::{ConflictsConfig, StorageConfig};
use waymark_conflict::ConflictThrottle;
use waymark_core::WaymarkError;
use waymark_core::types::{EventKind, InboundEvent, UserId};
use waymark_store::FlowStore;

/// A fully wired flow stack on temporary storage.
///
/// The temp directory lives as long as the harness; dropping the harness
/// removes the database and audit log.
pub struct TestHarness {
    pub store: Arc<FlowStore>,
    pub throttle: Arc<ConflictThrottle>,
    pub audit_path: PathBuf,
    _dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::default()
    }

    /// Shift a user's row into the past so TTL scenarios run without sleeping.
    pub async fn backdate(&self, user_id: UserId, secs: i64) -> Result<(), WaymarkError> {
        self.store
            .database()
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "UPDATE user_flows SET created_at = created_at - ?1 WHERE user_id = ?2",
                    rusqlite::params![secs, user_id.0],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| WaymarkError::Storage {
                source: Box::new(e),
            })
    }

    /// The audit log contents, or an empty string before the first conflict.
    pub fn audit_log(&self) -> String {
        std::fs::read_to_string(&self.audit_path).unwrap_or_default()
    }
}

/// Builder for [`TestHarness`] with test-friendly defaults.
pub struct TestHarnessBuilder {
    prompt_interval_secs: u64,
    wal_mode: bool,
}

impl Default for TestHarnessBuilder {
    fn default() -> Self {
        Self {
            prompt_interval_secs: 60,
            wal_mode: false,
        }
    }
}

impl TestHarnessBuilder {
    pub fn prompt_interval_secs(mut self, secs: u64) -> Self {
        self.prompt_interval_secs = secs;
        self
    }

    pub fn wal_mode(mut self, on: bool) -> Self {
        self.wal_mode = on;
        self
    }

    pub async fn build(self) -> Result<TestHarness, WaymarkError> {
        let dir = tempfile::tempdir().map_err(|e| WaymarkError::Storage {
            source: Box::new(e),
        })?;
        let storage = StorageConfig {
            database_path: dir.path().join("flows.db").to_string_lossy().into_owned(),
            wal_mode: self.wal_mode,
        };
        let conflicts = ConflictsConfig {
            prompt_interval_secs: self.prompt_interval_secs,
            audit_log_path: dir
                .path()
                .join("conflicts.log")
                .to_string_lossy()
                .into_owned(),
        };

        let store = Arc::new(FlowStore::open(&storage).await?);
        let throttle = Arc::new(ConflictThrottle::new(&conflicts));
        Ok(TestHarness {
            store,
            throttle,
            audit_path: PathBuf::from(conflicts.audit_log_path),
            _dir: dir,
        })
    }
}

/// A plain text message event.
pub fn message_event(user_id: i64, text: &str) -> InboundEvent {
    InboundEvent {
        user_id: UserId(user_id),
        kind: EventKind::Message,
        text: Some(text.to_string()),
        payload: None,
    }
}

/// A button-press event carrying a callback payload.
pub fn callback_event(user_id: i64, payload: &str) -> InboundEvent {
    InboundEvent {
        user_id: UserId(user_id),
        kind: EventKind::Callback,
        text: None,
        payload: Some(payload.to_string()),
    }
}
