//! In-memory `HistoryStore` implementation.
//!
//! Keeps messages and metadata in concurrent maps keyed by conversation id.
//! Nothing survives the process; useful for ephemeral sessions and tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SubsecRound, Utc};
use dashmap::DashMap;

use gptbot_types::error::StoreError;
use gptbot_types::message::{MessageId, MessageRole, StoredMessage};
use gptbot_types::window::HistoryWindow;

use super::store::HistoryStore;

#[derive(Default)]
struct Inner {
    messages: DashMap<String, Vec<StoredMessage>>,
    /// Metadata kept as serialized JSON text, like the SQLite column.
    metadata: DashMap<String, String>,
    next_id: AtomicI64,
}

/// Process-local history store. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct InMemoryHistoryStore {
    inner: Arc<Inner>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Apply `window` to a conversation's messages as of `now`.
///
/// Filters by the time bound, orders by `(timestamp, id)`, then keeps the
/// newest `count_limit` entries.
pub fn select_window(
    mut messages: Vec<StoredMessage>,
    window: &HistoryWindow,
    now: DateTime<Utc>,
) -> Vec<StoredMessage> {
    if let Some(cutoff) = window.cutoff(now) {
        messages.retain(|m| m.timestamp >= cutoff);
    }
    messages.sort_by_key(StoredMessage::order_key);
    if let Some(limit) = window.count_limit {
        let limit = limit.get() as usize;
        if messages.len() > limit {
            messages.drain(..messages.len() - limit);
        }
    }
    messages
}

impl HistoryStore for InMemoryHistoryStore {
    async fn append_message(
        &self,
        conversation_id: &str,
        role: MessageRole,
        text: &str,
    ) -> Result<MessageId, StoreError> {
        let mut log = self
            .inner
            .messages
            .entry(conversation_id.to_string())
            .or_default();
        let id = MessageId(self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        log.push(StoredMessage {
            id,
            timestamp: Utc::now().trunc_subsecs(0),
            conversation_id: conversation_id.to_string(),
            role,
            message: text.to_string(),
        });
        Ok(id)
    }

    async fn list_messages(
        &self,
        conversation_id: &str,
        window: &HistoryWindow,
    ) -> Result<Vec<StoredMessage>, StoreError> {
        let messages = self
            .inner
            .messages
            .get(conversation_id)
            .map(|log| log.value().clone())
            .unwrap_or_default();
        Ok(select_window(messages, window, Utc::now()))
    }

    async fn get_metadata(
        &self,
        conversation_id: &str,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        match self.inner.metadata.get(conversation_id) {
            Some(text) => serde_json::from_str(text.value())
                .map(Some)
                .map_err(|e| StoreError::Deserialization(e.to_string())),
            None => Ok(None),
        }
    }

    async fn set_metadata(
        &self,
        conversation_id: &str,
        value: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let text =
            serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.inner
            .metadata
            .insert(conversation_id.to_string(), text);
        Ok(())
    }
}
