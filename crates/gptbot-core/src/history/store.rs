//! HistoryStore trait definition.
//!
//! Append-only message log per conversation plus one metadata slot per
//! conversation. Implementations live in gptbot-infra (e.g.
//! `SqliteHistoryStore`) and in [`super::memory`].

use gptbot_types::error::StoreError;
use gptbot_types::message::{MessageId, MessageRole, StoredMessage};
use gptbot_types::window::HistoryWindow;

/// Repository trait for conversation history and metadata.
///
/// Every method is a single atomic unit against the backing store. Uses
/// native async fn in traits (RPITIT, Rust 2024 edition).
pub trait HistoryStore: Send + Sync {
    /// Append a message stamped with the current time (whole seconds).
    ///
    /// Durable before the future resolves.
    fn append_message(
        &self,
        conversation_id: &str,
        role: MessageRole,
        text: &str,
    ) -> impl std::future::Future<Output = Result<MessageId, StoreError>> + Send;

    /// Messages inside `window`, ascending by `(timestamp, id)`.
    ///
    /// The time bound is applied before the count bound. Returns an empty
    /// vector when nothing matches.
    fn list_messages(
        &self,
        conversation_id: &str,
        window: &HistoryWindow,
    ) -> impl std::future::Future<Output = Result<Vec<StoredMessage>, StoreError>> + Send;

    /// The stored metadata value, or `None` if never set.
    fn get_metadata(
        &self,
        conversation_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, StoreError>> + Send;

    /// Replace the metadata value (upsert).
    fn set_metadata(
        &self,
        conversation_id: &str,
        value: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
