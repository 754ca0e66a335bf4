// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The flow store: one active flow per user, with lazy TTL expiry.
//!
//! Public operations never fail. Storage errors are logged and reported as
//! "no active flow" (reads) or swallowed (writes), so a broken database
//! degrades callers to flowless behavior instead of propagating panics
//! into message handling.

use rusqlite::{OptionalExtension, params};
use serde_json::{Map, Value};
use tracing::warn;

use waymark_config::model::StorageConfig;
use waymark_core::WaymarkError;
use waymark_core::types::{FlowRecord, UserId};

use crate::database::{Database, map_tr_err};

/// Persistent map from user id to that user's single active flow.
pub struct FlowStore {
    db: Database,
}

impl FlowStore {
    /// Open a store on the configured database.
    pub async fn open(config: &StorageConfig) -> Result<Self, WaymarkError> {
        Ok(Self::new(Database::open(config).await?))
    }

    /// Wrap an already-open database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns the underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Start (or replace) the user's active flow and return the stored record.
    ///
    /// The record is built in memory first; if the write fails it is still
    /// returned so the caller can proceed, and the failure is logged.
    pub async fn set(
        &self,
        user_id: UserId,
        flow_name: &str,
        step: Option<Value>,
        meta: Option<Map<String, Value>>,
        ttl: Option<i64>,
    ) -> FlowRecord {
        let record = FlowRecord {
            user_id,
            flow_name: flow_name.to_string(),
            step,
            meta: meta.unwrap_or_default(),
            created_at: now_ts(),
            ttl,
        };
        if let Err(e) = self.try_set(&record).await {
            warn!(user_id = user_id.0, flow = %record.flow_name, error = %e, "flow set failed");
        }
        record
    }

    /// Fetch the user's active flow, enforcing TTL expiry.
    ///
    /// An expired record is deleted on the spot and reported as absent.
    /// Reading never refreshes the TTL window.
    pub async fn get(&self, user_id: UserId) -> Option<FlowRecord> {
        match self.try_get(user_id).await {
            Ok(record) => record,
            Err(e) => {
                warn!(user_id = user_id.0, error = %e, "flow read failed");
                None
            }
        }
    }

    /// Whether the user currently has a live (non-expired) flow.
    pub async fn is_active(&self, user_id: UserId) -> bool {
        self.get(user_id).await.is_some()
    }

    /// Remove the user's flow record if present. Idempotent.
    pub async fn clear(&self, user_id: UserId) {
        if let Err(e) = self.try_clear(user_id).await {
            warn!(user_id = user_id.0, error = %e, "flow clear failed");
        }
    }

    /// Remove the user's flow only when the active flow carries this name.
    ///
    /// Returns whether a record was removed. An expired record counts as
    /// absent, so clearing it by name reports `false`.
    pub async fn clear_named(&self, user_id: UserId, flow_name: &str) -> bool {
        match self.try_clear_named(user_id, flow_name).await {
            Ok(cleared) => cleared,
            Err(e) => {
                warn!(user_id = user_id.0, flow = %flow_name, error = %e, "flow clear failed");
                false
            }
        }
    }

    /// Replace the step payload of the user's active flow.
    ///
    /// Returns the updated record, or `None` when the user has no live
    /// flow. The write refreshes `created_at`, restarting any TTL window.
    pub async fn update_step(&self, user_id: UserId, step: Option<Value>) -> Option<FlowRecord> {
        match self.try_update_step(user_id, step).await {
            Ok(record) => record,
            Err(e) => {
                warn!(user_id = user_id.0, error = %e, "flow step update failed");
                None
            }
        }
    }

    /// Shallow-merge `partial` into the meta of the user's active flow.
    ///
    /// Keys absent from `partial` survive; keys present are overwritten.
    /// Returns `None` when the user has no live flow. The write refreshes
    /// `created_at`, restarting any TTL window.
    pub async fn merge_meta(
        &self,
        user_id: UserId,
        partial: Map<String, Value>,
    ) -> Option<FlowRecord> {
        match self.try_merge_meta(user_id, partial).await {
            Ok(record) => record,
            Err(e) => {
                warn!(user_id = user_id.0, error = %e, "flow meta merge failed");
                None
            }
        }
    }

    /// Dump every stored row, expired ones included, without touching them.
    ///
    /// Diagnostic view, ordered by user id.
    pub async fn snapshot(&self) -> Vec<FlowRecord> {
        match self.try_snapshot().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "flow snapshot failed");
                Vec::new()
            }
        }
    }

    /// Delete every expired row. Returns how many were removed.
    ///
    /// Unlike the read path this is fallible; the background sweeper logs
    /// failures and retries on its next tick.
    pub async fn sweep_expired(&self) -> Result<usize, WaymarkError> {
        let now = now_ts();
        self.db
            .connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                let swept = conn.execute(
                    "DELETE FROM user_flows WHERE ttl IS NOT NULL AND ?1 - created_at > ttl",
                    params![now],
                )?;
                Ok(swept)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn try_set(&self, record: &FlowRecord) -> Result<(), WaymarkError> {
        let step_json = record
            .step
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(json_err)?;
        let meta_json = serde_json::to_string(&record.meta).map_err(json_err)?;
        let user_id = record.user_id.0;
        let flow_name = record.flow_name.clone();
        let created_at = record.created_at;
        let ttl = record.ttl;
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT OR REPLACE INTO user_flows
                         (user_id, flow_name, step_json, meta_json, created_at, ttl)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![user_id, flow_name, step_json, meta_json, created_at, ttl],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn try_get(&self, user_id: UserId) -> Result<Option<FlowRecord>, WaymarkError> {
        let now = now_ts();
        let user_id = user_id.0;
        self.db
            .connection()
            .call(move |conn| fetch_live(conn, user_id, now))
            .await
            .map_err(map_tr_err)
    }

    async fn try_clear(&self, user_id: UserId) -> Result<(), WaymarkError> {
        let user_id = user_id.0;
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute("DELETE FROM user_flows WHERE user_id = ?1", params![user_id])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn try_clear_named(
        &self,
        user_id: UserId,
        flow_name: &str,
    ) -> Result<bool, WaymarkError> {
        let now = now_ts();
        let user_id = user_id.0;
        let flow_name = flow_name.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<bool, rusqlite::Error> {
                match fetch_live(conn, user_id, now)? {
                    Some(record) if record.flow_name == flow_name => {
                        conn.execute(
                            "DELETE FROM user_flows WHERE user_id = ?1",
                            params![user_id],
                        )?;
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            })
            .await
            .map_err(map_tr_err)
    }

    async fn try_update_step(
        &self,
        user_id: UserId,
        step: Option<Value>,
    ) -> Result<Option<FlowRecord>, WaymarkError> {
        let now = now_ts();
        let user_id = user_id.0;
        let step_json = step
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(json_err)?;
        self.db
            .connection()
            .call(move |conn| -> Result<Option<FlowRecord>, rusqlite::Error> {
                // Read, expiry check, and write run as one unit on the
                // connection thread; concurrent updates cannot interleave.
                let Some(mut record) = fetch_live(conn, user_id, now)? else {
                    return Ok(None);
                };
                conn.execute(
                    "UPDATE user_flows SET step_json = ?1, created_at = ?2 WHERE user_id = ?3",
                    params![step_json, now, user_id],
                )?;
                record.step = step;
                record.created_at = now;
                Ok(Some(record))
            })
            .await
            .map_err(map_tr_err)
    }

    async fn try_merge_meta(
        &self,
        user_id: UserId,
        partial: Map<String, Value>,
    ) -> Result<Option<FlowRecord>, WaymarkError> {
        let now = now_ts();
        let user_id = user_id.0;
        self.db
            .connection()
            .call(move |conn| -> Result<Option<FlowRecord>, rusqlite::Error> {
                let Some(mut record) = fetch_live(conn, user_id, now)? else {
                    return Ok(None);
                };
                for (key, value) in partial {
                    record.meta.insert(key, value);
                }
                let meta_json = serde_json::to_string(&record.meta)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                conn.execute(
                    "UPDATE user_flows SET meta_json = ?1, created_at = ?2 WHERE user_id = ?3",
                    params![meta_json, now, user_id],
                )?;
                record.created_at = now;
                Ok(Some(record))
            })
            .await
            .map_err(map_tr_err)
    }

    async fn try_snapshot(&self) -> Result<Vec<FlowRecord>, WaymarkError> {
        self.db
            .connection()
            .call(|conn| -> Result<Vec<FlowRecord>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT user_id, flow_name, step_json, meta_json, created_at, ttl
                     FROM user_flows ORDER BY user_id",
                )?;
                let records = stmt
                    .query_map([], row_to_record)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Load the user's row and enforce lazy expiry: an expired row is deleted
/// and reported as absent.
fn fetch_live(
    conn: &rusqlite::Connection,
    user_id: i64,
    now: i64,
) -> Result<Option<FlowRecord>, rusqlite::Error> {
    let row = conn
        .query_row(
            "SELECT user_id, flow_name, step_json, meta_json, created_at, ttl
             FROM user_flows WHERE user_id = ?1",
            params![user_id],
            row_to_record,
        )
        .optional()?;
    match row {
        Some(record) if record.is_expired(now) => {
            conn.execute("DELETE FROM user_flows WHERE user_id = ?1", params![user_id])?;
            Ok(None)
        }
        other => Ok(other),
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> Result<FlowRecord, rusqlite::Error> {
    let step_json: Option<String> = row.get(2)?;
    let meta_json: Option<String> = row.get(3)?;
    Ok(FlowRecord {
        user_id: UserId(row.get(0)?),
        flow_name: row.get(1)?,
        // A corrupt cell degrades to an empty value instead of failing the read.
        step: step_json.and_then(|s| serde_json::from_str(&s).ok()),
        meta: meta_json
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default(),
        created_at: row.get(4)?,
        ttl: row.get(5)?,
    })
}

fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

fn json_err(e: serde_json::Error) -> WaymarkError {
    WaymarkError::Storage {
        source: Box::new(e),
    }
}
