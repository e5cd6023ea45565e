//! Completion request/response types.
//!
//! These model the narrow contract with the completion collaborator: an
//! ordered list of role-tagged turns goes out, and exactly one of two response
//! shapes comes back.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::message::MessageRole;

/// Role of a turn in an outbound completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::System => write!(f, "system"),
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl From<MessageRole> for TurnRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => TurnRole::User,
            MessageRole::Assistant => TurnRole::Assistant,
        }
    }
}

/// One role-tagged text unit sent to the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::System,
            content: content.into(),
        }
    }
}

/// Request sent to the completion collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    /// System turn first, then history in ascending order.
    pub turns: Vec<Turn>,
    /// Opaque function schemas, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<serde_json::Value>>,
}

/// A function invocation requested by the collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Parsed from the collaborator's serialized argument blob.
    pub arguments: serde_json::Value,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// The two response shapes a completer may return.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Free-text reply, untrimmed.
    Text(String),
    /// Ordered list of requested function invocations.
    FunctionCalls(Vec<FunctionCall>),
}

/// Result of one `ask` call.
///
/// Serializes as `{"type": "text", "data": "..."}` or
/// `{"type": "function", "data": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum AskOutcome {
    Text(String),
    Function(Vec<FunctionCall>),
}

impl AskOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            AskOutcome::Text(_) => "text",
            AskOutcome::Function(_) => "function",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_turn_role_from_message_role() {
        assert_eq!(TurnRole::from(MessageRole::User), TurnRole::User);
        assert_eq!(TurnRole::from(MessageRole::Assistant), TurnRole::Assistant);
    }

    #[test]
    fn test_ask_outcome_text_shape() {
        let outcome = AskOutcome::Text("hello".into());
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"type": "text", "data": "hello"})
        );
    }

    #[test]
    fn test_ask_outcome_function_shape() {
        let outcome = AskOutcome::Function(vec![FunctionCall::new(
            "lookup",
            json!({"city": "Paris"}),
        )]);
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "type": "function",
                "data": [{"name": "lookup", "arguments": {"city": "Paris"}}]
            })
        );
        assert_eq!(outcome.kind(), "function");
    }

    #[test]
    fn test_request_omits_absent_tools() {
        let request = CompletionRequest {
            model: "gpt-3.5-turbo".into(),
            turns: vec![Turn::system("be brief")],
            tools: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("tools").is_none());
        assert_eq!(value["turns"][0]["role"], "system");
    }
}
