// SPDX-FileCopyrightText: 2026 Waymark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user prompt throttle with an append-only audit log.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::{Local, TimeZone};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::warn;

use waymark_config::model::ConflictsConfig;
use waymark_core::types::UserId;

/// Decides whether a conflicting user gets prompted right now.
///
/// Every conflict is appended to the audit log regardless of the decision;
/// the return value only throttles the user-facing prompt to at most one
/// per user per interval. Throttle state lives in memory and resets on
/// restart -- the worst case after a crash is one extra prompt.
pub struct ConflictThrottle {
    last_prompt: DashMap<UserId, i64>,
    interval_secs: i64,
    audit_path: PathBuf,
}

impl ConflictThrottle {
    pub fn new(config: &ConflictsConfig) -> Self {
        let audit_path = PathBuf::from(&config.audit_log_path);
        if let Some(parent) = audit_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "audit log directory creation failed");
            }
        }
        Self {
            last_prompt: DashMap::new(),
            interval_secs: i64::try_from(config.prompt_interval_secs).unwrap_or(i64::MAX),
            audit_path,
        }
    }

    /// Record a conflict and decide whether to prompt the user now.
    ///
    /// The first conflict for a user always prompts; later ones prompt
    /// again only once the full interval has elapsed.
    pub fn should_prompt(&self, user_id: UserId, handler: &str, reason: &str) -> bool {
        self.prompt_at(user_id, handler, reason, chrono::Utc::now().timestamp())
    }

    /// Forget the user's throttle window, so their next conflict prompts.
    pub fn reset(&self, user_id: UserId) {
        self.last_prompt.remove(&user_id);
    }

    fn prompt_at(&self, user_id: UserId, handler: &str, reason: &str, now: i64) -> bool {
        // Audit first: the trail must not depend on the throttle decision,
        // and the append must not run under the map's shard lock.
        self.append_audit_line(user_id, handler, reason, now);
        match self.last_prompt.entry(user_id) {
            Entry::Occupied(mut entry) => {
                if now - *entry.get() >= self.interval_secs {
                    entry.insert(now);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        }
    }

    fn append_audit_line(&self, user_id: UserId, handler: &str, reason: &str, now: i64) {
        let stamp = Local
            .timestamp_opt(now, 0)
            .single()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| now.to_string());
        let line = format!("{stamp} user={} handler={handler} reason={reason}\n", user_id.0);
        if let Err(e) = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.audit_path)
            .and_then(|mut file| file.write_all(line.as_bytes()))
        {
            warn!(path = %self.audit_path.display(), error = %e, "conflict audit append failed");
        }
    }
}
