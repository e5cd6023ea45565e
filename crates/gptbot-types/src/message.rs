//! Persisted chat messages.
//!
//! A [`StoredMessage`] is one user or assistant turn as recorded by a history
//! store. Messages within a conversation are totally ordered by
//! `(timestamp, id)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Role of a persisted message.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('user', 'assistant'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// Store-assigned message identifier.
///
/// Strictly increasing in insertion order; only used to break ties between
/// messages that share a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single persisted message within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: MessageId,
    /// Creation time, whole seconds.
    pub timestamp: DateTime<Utc>,
    pub conversation_id: String,
    pub role: MessageRole,
    pub message: String,
}

impl StoredMessage {
    /// Sort key used for every ordering decision on messages.
    pub fn order_key(&self) -> (DateTime<Utc>, MessageId) {
        (self.timestamp, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_message_role_roundtrip() {
        for role in [MessageRole::User, MessageRole::Assistant] {
            let parsed: MessageRole = role.to_string().parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_message_role_rejects_system() {
        let err = "system".parse::<MessageRole>().unwrap_err();
        assert!(err.contains("system"));
    }

    #[test]
    fn test_order_key_breaks_ties_by_id() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let first = StoredMessage {
            id: MessageId(7),
            timestamp: ts,
            conversation_id: "c1".into(),
            role: MessageRole::User,
            message: "a".into(),
        };
        let second = StoredMessage {
            id: MessageId(8),
            message: "b".into(),
            ..first.clone()
        };
        assert!(first.order_key() < second.order_key());
    }

    #[test]
    fn test_message_id_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&MessageId(42)).unwrap(), "42");
    }
}
