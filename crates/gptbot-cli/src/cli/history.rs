//! `gptbot history`: print a conversation's window as a table.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use gptbot_core::history::store::HistoryStore;
use gptbot_types::message::{MessageRole, StoredMessage};
use gptbot_types::window::HistoryWindow;

use crate::cli::WindowArgs;
use crate::state::AppState;

/// List the current history window of `conversation_id`.
pub async fn show_history(
    state: &AppState,
    conversation_id: &str,
    all: bool,
    window_args: &WindowArgs,
    json: bool,
) -> Result<()> {
    let window = if all {
        HistoryWindow::unbounded()
    } else {
        state.window_config(conversation_id, window_args).window()
    };

    let messages = state.store.list_messages(conversation_id, &window).await?;

    if json {
        let result = serde_json::json!({
            "conversation_id": conversation_id,
            "messages": messages,
            "count": messages.len(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!();
        println!(
            "  {} No messages in '{}'.",
            style("i").blue().bold(),
            style(conversation_id).cyan(),
        );
        println!(
            "     Start one with: gptbot ask {} <message>",
            conversation_id,
        );
        println!();
        return Ok(());
    }

    println!();
    println!(
        "  History for '{}' ({} messages, {})",
        style(conversation_id).cyan(),
        messages.len(),
        style(state.database_path.display()).dim(),
    );
    println!();
    println!("{}", render_table(&messages));
    println!();

    Ok(())
}

fn render_table(messages: &[StoredMessage]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Time (UTC)").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Message").fg(Color::White),
    ]);

    for message in messages {
        let role_color = match message.role {
            MessageRole::User => Color::Green,
            MessageRole::Assistant => Color::Cyan,
        };
        table.add_row(vec![
            Cell::new(message.id).fg(Color::DarkGrey),
            Cell::new(message.timestamp.format("%Y-%m-%d %H:%M:%S")).fg(Color::DarkGrey),
            Cell::new(message.role).fg(role_color),
            Cell::new(&message.message),
        ]);
    }

    table
}
