//! `gptbot ask`: one conversation turn.

use std::path::Path;

use anyhow::{Context, Result, bail};
use console::style;
use tracing::Instrument;

use gptbot_observe::genai_attrs::{OP_CHAT, PROVIDER_OPENAI, span_name};
use gptbot_types::completion::AskOutcome;

use crate::cli::SessionArgs;
use crate::state::AppState;

/// Send `message` in `conversation_id` and print the outcome.
pub async fn ask(
    state: &AppState,
    conversation_id: &str,
    message: &str,
    tools_path: Option<&Path>,
    session: &SessionArgs,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let tools = match tools_path {
        Some(path) => Some(load_tools(path).await?),
        None => None,
    };

    let config = state.conversation_config(conversation_id, session);
    let span = tracing::info_span!(
        "gptbot.ask",
        otel.name = %span_name(OP_CHAT, &config.model),
        gen_ai.operation.name = OP_CHAT,
        gen_ai.provider.name = PROVIDER_OPENAI,
    );

    let conversation = state.conversation(config)?;
    let outcome = conversation
        .ask(message, tools.as_deref())
        .instrument(span)
        .await
        .with_context(|| format!("Failed to get a reply in '{conversation_id}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        AskOutcome::Text(reply) => println!("{reply}"),
        AskOutcome::Function(calls) => {
            if !quiet {
                println!();
                println!(
                    "  {} Model requested {} function call(s):",
                    style("fn").magenta().bold(),
                    calls.len()
                );
                println!();
            }
            for call in &calls {
                println!(
                    "  {}({})",
                    style(&call.name).cyan().bold(),
                    serde_json::to_string(&call.arguments)?
                );
            }
            if !quiet {
                println!();
            }
        }
    }

    Ok(())
}

/// Read function tool schemas from a JSON file.
///
/// Accepts either a list of schemas or a single schema object.
pub async fn load_tools(path: &Path) -> Result<Vec<serde_json::Value>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read tools file {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Tools file {} is not valid JSON", path.display()))?;

    match value {
        serde_json::Value::Array(tools) => Ok(tools),
        serde_json::Value::Object(_) => Ok(vec![value]),
        _ => bail!(
            "Tools file {} must contain a JSON object or array",
            path.display()
        ),
    }
}
