//! SQLite conversation history store.
//!
//! Implements `HistoryStore` from `gptbot-core` using sqlx with split
//! read/write pools. Timestamps are stored as fixed-width RFC 3339 UTC text
//! (`2026-10-19T12:00:00Z`) so lexical order on the column is time order.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::{QueryBuilder, Row, Sqlite};

use gptbot_core::history::store::HistoryStore;
use gptbot_types::error::StoreError;
use gptbot_types::message::{MessageId, MessageRole, StoredMessage};
use gptbot_types::window::HistoryWindow;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `HistoryStore`.
///
/// Cheap to clone; clones share the underlying pools.
#[derive(Clone)]
pub struct SqliteHistoryStore {
    pool: DatabasePool,
}

impl SqliteHistoryStore {
    /// Create a history store backed by an existing pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Open the database file at `path`, creating it and any missing parent
    /// directories. Safe to call repeatedly on the same file.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::Unavailable(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let pool = DatabasePool::new(path)
            .await
            .map_err(|e| StoreError::Unavailable(format!("cannot open {}: {e}", path.display())))?;

        tracing::debug!("History database ready");
        Ok(Self::new(pool))
    }

    /// The underlying pool, for callers that need raw access.
    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct MessageRow {
    id: i64,
    timestamp: String,
    conversation_id: String,
    role: String,
    message: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            timestamp: row.try_get("timestamp")?,
            conversation_id: row.try_get("conversation_id")?,
            role: row.try_get("role")?,
            message: row.try_get("message")?,
        })
    }

    fn into_message(self) -> Result<StoredMessage, StoreError> {
        let role: MessageRole = self.role.parse().map_err(StoreError::Unavailable)?;
        let timestamp = parse_timestamp(&self.timestamp)?;

        Ok(StoredMessage {
            id: MessageId(self.id),
            timestamp,
            conversation_id: self.conversation_id,
            role,
            message: self.message,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Unavailable(format!("invalid timestamp '{s}': {e}")))
}

fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn unavailable(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

// ---------------------------------------------------------------------------
// HistoryStore implementation
// ---------------------------------------------------------------------------

impl HistoryStore for SqliteHistoryStore {
    async fn append_message(
        &self,
        conversation_id: &str,
        role: MessageRole,
        text: &str,
    ) -> Result<MessageId, StoreError> {
        let now = format_timestamp(&Utc::now().trunc_subsecs(0));

        let result = sqlx::query(
            "INSERT INTO messages (timestamp, conversation_id, role, message) VALUES (?, ?, ?, ?)",
        )
        .bind(&now)
        .bind(conversation_id)
        .bind(role.to_string())
        .bind(text)
        .execute(&self.pool.writer)
        .await
        .map_err(unavailable)?;

        let id = MessageId(result.last_insert_rowid());
        tracing::debug!(conversation_id, %role, %id, "Appended message");
        Ok(id)
    }

    async fn list_messages(
        &self,
        conversation_id: &str,
        window: &HistoryWindow,
    ) -> Result<Vec<StoredMessage>, StoreError> {
        let cutoff = window.cutoff(Utc::now()).map(|c| format_timestamp(&c));

        // Newest first so LIMIT keeps the most recent; reversed below.
        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT id, timestamp, conversation_id, role, message FROM messages WHERE conversation_id = ",
        );
        query.push_bind(conversation_id);
        if let Some(cutoff) = cutoff {
            query.push(" AND timestamp >= ");
            query.push_bind(cutoff);
        }
        query.push(" ORDER BY timestamp DESC, id DESC");
        if let Some(limit) = window.count_limit {
            query.push(" LIMIT ");
            query.push_bind(i64::from(limit.get()));
        }

        let rows = query
            .build()
            .fetch_all(&self.pool.reader)
            .await
            .map_err(unavailable)?;

        let mut messages = rows
            .iter()
            .map(|row| {
                MessageRow::from_row(row)
                    .map_err(unavailable)?
                    .into_message()
            })
            .collect::<Result<Vec<_>, _>>()?;
        messages.reverse();

        Ok(messages)
    }

    async fn get_metadata(
        &self,
        conversation_id: &str,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        let row = sqlx::query("SELECT metadata FROM conversation_metadata WHERE conversation_id = ?")
            .bind(conversation_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(unavailable)?;

        match row {
            Some(row) => {
                let text: String = row.try_get("metadata").map_err(unavailable)?;
                let value = serde_json::from_str(&text)
                    .map_err(|e| StoreError::Deserialization(format!("invalid JSON metadata: {e}")))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set_metadata(
        &self,
        conversation_id: &str,
        value: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let text = serde_json::to_string(value)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO conversation_metadata (conversation_id, metadata)
               VALUES (?, ?)
               ON CONFLICT (conversation_id) DO UPDATE SET metadata = excluded.metadata"#,
        )
        .bind(conversation_id)
        .bind(&text)
        .execute(&self.pool.writer)
        .await
        .map_err(unavailable)?;

        Ok(())
    }
}
