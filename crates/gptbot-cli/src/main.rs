//! gptbot CLI entry point.
//!
//! Binary name: `gptbot`
//!
//! Parses CLI arguments, sets up tracing, opens the history database, then
//! dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,gptbot_core=debug,gptbot_infra=debug",
        _ => "trace",
    };
    gptbot_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    gptbot_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "gptbot", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.config.as_deref(), cli.database.as_deref()).await?;

    match cli.command {
        Commands::Ask {
            conversation,
            message,
            tools,
            session,
        } => {
            cli::ask::ask(
                &state,
                &conversation,
                &message,
                tools.as_deref(),
                &session,
                cli.json,
                cli.quiet,
            )
            .await?;
        }

        Commands::History {
            conversation,
            all,
            window,
        } => {
            cli::history::show_history(&state, &conversation, all, &window, cli.json).await?;
        }

        Commands::Metadata { command } => {
            cli::metadata::handle_metadata_command(command, &state, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
