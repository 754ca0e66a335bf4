// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background expiry sweep for abandoned flow records.
//!
//! Lazy expiry on read stays the source of truth; the sweeper only bounds
//! table growth from flows nobody reads again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use waymark_core::WaymarkError;

use crate::store::FlowStore;

/// Spawn a task that deletes expired rows every `interval` until cancelled.
///
/// A zero interval is rejected; callers that want no sweeping simply never
/// spawn one.
pub fn spawn_sweeper(
    store: Arc<FlowStore>,
    interval: Duration,
    cancel: CancellationToken,
) -> Result<JoinHandle<()>, WaymarkError> {
    if interval.is_zero() {
        return Err(WaymarkError::Config(
            "sweep interval must be non-zero; omit the sweeper to disable it".to_string(),
        ));
    }

    Ok(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; skip it so the initial
        // sweep lands one full interval after startup.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match store.sweep_expired().await {
                        Ok(0) => {}
                        Ok(swept) => debug!(swept, "expired flow records removed"),
                        Err(e) => warn!(error = %e, "expiry sweep failed"),
                    }
                }
            }
        }
        debug!("flow sweeper stopped");
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;
    use tempfile::tempdir;
    use waymark_config::model::StorageConfig;
    use waymark_core::types::UserId;

    async fn setup_store() -> (Arc<FlowStore>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("flows.db").to_string_lossy().into_owned(),
            wal_mode: false,
        };
        let store = FlowStore::open(&config).await.unwrap();
        (Arc::new(store), dir)
    }

    async fn backdate(store: &FlowStore, user_id: UserId, secs: i64) {
        store
            .database()
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "UPDATE user_flows SET created_at = created_at - ?1 WHERE user_id = ?2",
                    params![secs, user_id.0],
                )?;
                Ok(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn zero_interval_is_rejected() {
        let (store, _dir) = setup_store().await;
        let err = spawn_sweeper(store, Duration::ZERO, CancellationToken::new()).unwrap_err();
        assert!(matches!(err, WaymarkError::Config(_)));
    }

    #[tokio::test]
    async fn sweeper_removes_expired_rows_and_stops_on_cancel() {
        let (store, _dir) = setup_store().await;
        store
            .set(UserId(1), "explicit_upload", None, None, Some(1))
            .await;
        store.set(UserId(2), "broadcast", None, None, None).await;
        backdate(&store, UserId(1), 5).await;

        let cancel = CancellationToken::new();
        let handle =
            spawn_sweeper(store.clone(), Duration::from_millis(20), cancel.clone()).unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        let rows = store.snapshot().await;
        assert_eq!(rows.len(), 1, "the expired row was swept in the background");
        assert_eq!(rows[0].user_id, UserId(2));

        cancel.cancel();
        handle.await.unwrap();
    }
}
