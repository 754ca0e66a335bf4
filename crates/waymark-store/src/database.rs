// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite connection lifecycle: open, PRAGMA setup, migrations, close.
//!
//! Every write is serialized through tokio-rusqlite's single background
//! thread. Never open a second connection for writes.

use std::path::Path;
use std::time::Duration;

use tracing::debug;

use waymark_config::model::StorageConfig;
use waymark_core::WaymarkError;

use crate::migrations;

/// Handle to the flow database.
///
/// Cheap to clone; all clones share one background connection thread, so
/// closing through any handle fails subsequent calls on every clone.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open the configured database, apply PRAGMAs, and run migrations.
    ///
    /// Missing parent directories are created, so a default path under the
    /// user's data directory works on first run.
    pub async fn open(config: &StorageConfig) -> Result<Self, WaymarkError> {
        let path = config.database_path.clone();
        if let Some(parent) = Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| WaymarkError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(&path)
            .await
            .map_err(map_tr_err)?;

        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        if config.wal_mode {
            // journal_mode hands back the resulting mode as a row, so it
            // cannot go through pragma_update.
            let mode: String = conn
                .call(|conn| -> Result<String, rusqlite::Error> {
                    conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
                })
                .await
                .map_err(map_tr_err)?;
            debug!(mode = %mode, "journal mode configured");
        }

        conn.call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(|e| WaymarkError::Storage {
                source: Box::new(e),
            })?;

        debug!(path = %path, "flow database opened");
        Ok(Self { conn })
    }

    /// Returns the underlying connection handle.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), WaymarkError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        self.conn.close().await.map_err(map_tr_err)?;
        Ok(())
    }
}

/// Convert tokio-rusqlite errors to the shared storage error.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> WaymarkError {
    WaymarkError::Storage {
        source: Box::new(e),
    }
}
