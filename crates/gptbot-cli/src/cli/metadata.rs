//! `gptbot metadata`: per-conversation JSON metadata.

use anyhow::Result;
use clap::Subcommand;
use console::style;

use gptbot_core::history::store::HistoryStore;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum MetadataCommand {
    /// Print the metadata value.
    Get {
        /// Conversation id.
        conversation: String,
    },

    /// Replace the metadata value (JSON; plain text is stored as a string).
    Set {
        /// Conversation id.
        conversation: String,

        /// JSON value (object, array, string, number, boolean, null).
        value: String,
    },
}

/// Handle a metadata subcommand.
pub async fn handle_metadata_command(
    cmd: MetadataCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd {
        MetadataCommand::Get { conversation } => metadata_get(state, &conversation, json).await,
        MetadataCommand::Set {
            conversation,
            value,
        } => metadata_set(state, &conversation, &value, json).await,
    }
}

/// Parse a CLI value as JSON, falling back to a JSON string.
fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

/// JSON output for `metadata get`. `metadata` is omitted when nothing was
/// ever set, so a stored `null` stays distinguishable from absence.
fn metadata_json(conversation_id: &str, value: Option<&serde_json::Value>) -> serde_json::Value {
    let mut result = serde_json::json!({
        "conversation_id": conversation_id,
        "found": value.is_some(),
    });
    if let Some(value) = value {
        result["metadata"] = value.clone();
    }
    result
}

async fn metadata_get(state: &AppState, conversation_id: &str, json: bool) -> Result<()> {
    let value = state.store.get_metadata(conversation_id).await?;

    if json {
        let result = metadata_json(conversation_id, value.as_ref());
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match value {
        Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        None => {
            println!();
            println!(
                "  {} No metadata for '{}'",
                style("i").blue().bold(),
                style(conversation_id).cyan(),
            );
            println!();
        }
    }

    Ok(())
}

async fn metadata_set(state: &AppState, conversation_id: &str, raw: &str, json: bool) -> Result<()> {
    let value = parse_value(raw);
    state.store.set_metadata(conversation_id, &value).await?;

    if json {
        let result = serde_json::json!({
            "conversation_id": conversation_id,
            "metadata": value,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!(
            "  {} Set metadata for '{}'",
            style("ok").green(),
            style(conversation_id).cyan(),
        );
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_json() {
        assert_eq!(
            parse_value(r#"{"lang":"fr"}"#),
            serde_json::json!({"lang": "fr"})
        );
        assert_eq!(parse_value("42"), serde_json::json!(42));
        assert_eq!(parse_value("null"), serde_json::Value::Null);
    }

    #[test]
    fn test_parse_value_plain_text_is_string() {
        assert_eq!(parse_value("Alice"), serde_json::json!("Alice"));
    }

    #[test]
    fn test_metadata_json_absent_omits_value() {
        let result = metadata_json("c1", None);
        assert_eq!(result, serde_json::json!({"conversation_id": "c1", "found": false}));
        assert!(result.get("metadata").is_none());
    }

    #[test]
    fn test_metadata_json_stored_null_is_found() {
        let result = metadata_json("c1", Some(&serde_json::Value::Null));
        assert_eq!(
            result,
            serde_json::json!({"conversation_id": "c1", "found": true, "metadata": null})
        );
    }

    #[test]
    fn test_metadata_json_object() {
        let stored = serde_json::json!({"lang": "fr"});
        let result = metadata_json("c1", Some(&stored));
        assert_eq!(result["found"], true);
        assert_eq!(result["metadata"]["lang"], "fr");
    }
}
