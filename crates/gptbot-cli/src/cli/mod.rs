//! CLI command definitions for the `gptbot` binary.
//!
//! Uses clap derive macros for argument parsing. Every command addresses one
//! conversation by its caller-chosen id.

pub mod ask;
pub mod history;
pub mod metadata;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use self::metadata::MetadataCommand;

/// Chat with an OpenAI model, keeping conversation history in SQLite.
#[derive(Parser)]
#[command(name = "gptbot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors and replies.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of `{data_dir}/config.toml`.
    #[arg(long, global = true, env = "GPTBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// History database to use instead of the configured one.
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Export trace spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a message and print the reply.
    Ask {
        /// Conversation id.
        conversation: String,

        /// Message text.
        message: String,

        /// JSON file with a list of function tool schemas.
        #[arg(long)]
        tools: Option<PathBuf>,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Show the current history window.
    History {
        /// Conversation id.
        conversation: String,

        /// Ignore the configured limits and show every message.
        #[arg(long)]
        all: bool,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Read or replace a conversation's metadata.
    #[command(alias = "meta")]
    Metadata {
        #[command(subcommand)]
        command: MetadataCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// History window overrides. Zero means no limit.
#[derive(Args, Debug, Default, Clone)]
pub struct WindowArgs {
    /// Number of past messages sent with each request.
    #[arg(long)]
    pub message_limit: Option<u32>,

    /// Only send messages from the last N hours.
    #[arg(long)]
    pub time_limit_hours: Option<u32>,
}

/// Per-invocation session overrides.
#[derive(Args, Debug, Default, Clone)]
pub struct SessionArgs {
    /// Model name (e.g. gpt-4o-mini).
    #[arg(short, long)]
    pub model: Option<String>,

    /// System prompt sent before the history.
    #[arg(long)]
    pub system_prompt: Option<String>,

    #[command(flatten)]
    pub window: WindowArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_overrides() {
        let cli = Cli::try_parse_from([
            "gptbot",
            "--json",
            "ask",
            "c1",
            "hello there",
            "--model",
            "gpt-4o",
            "--message-limit",
            "2",
            "--tools",
            "tools.json",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Ask {
                conversation,
                message,
                tools,
                session,
            } => {
                assert_eq!(conversation, "c1");
                assert_eq!(message, "hello there");
                assert_eq!(tools, Some(PathBuf::from("tools.json")));
                assert_eq!(session.model.as_deref(), Some("gpt-4o"));
                assert_eq!(session.window.message_limit, Some(2));
                assert!(session.window.time_limit_hours.is_none());
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["gptbot", "history", "c1", "-vv", "--database", "x.db"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.database, Some(PathBuf::from("x.db")));
    }

    #[test]
    fn test_parse_metadata_set() {
        let cli =
            Cli::try_parse_from(["gptbot", "metadata", "set", "c1", r#"{"lang":"fr"}"#]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Metadata {
                command: MetadataCommand::Set { .. }
            }
        ));
    }
}
