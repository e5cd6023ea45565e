//! Application state shared by the CLI commands.
//!
//! Resolves the data directory, loads the config, and opens the history
//! database once per invocation. The completion client is only built by the
//! commands that call the endpoint, so `history` and `metadata` work without
//! a credential.

use std::path::{Path, PathBuf};

use anyhow::Context;

use gptbot_core::conversation::Conversation;
use gptbot_core::llm::box_completer::BoxCompleter;
use gptbot_infra::config::{
    load_config, read_config, resolve_api_key, resolve_data_dir, resolve_database_path,
};
use gptbot_infra::llm::create_completer;
use gptbot_infra::sqlite::history::SqliteHistoryStore;
use gptbot_types::config::{ConversationConfig, GptbotConfig};

use crate::cli::{SessionArgs, WindowArgs};

/// Conversation pinned to the concrete infra implementations.
pub type CliConversation = Conversation<SqliteHistoryStore, BoxCompleter>;

pub struct AppState {
    pub config: GptbotConfig,
    pub database_path: PathBuf,
    pub store: SqliteHistoryStore,
}

impl AppState {
    /// Initialize the application state: load config, open the database.
    ///
    /// An explicit `config_path` must parse; the default config file falls
    /// back to defaults with a warning.
    pub async fn init(
        config_path: Option<&Path>,
        database: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        let config = match config_path {
            Some(path) => read_config(path)
                .await
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => load_config(&data_dir).await,
        };

        let database_path = database
            .map(Path::to_path_buf)
            .unwrap_or_else(|| resolve_database_path(&config, &data_dir));

        let store = SqliteHistoryStore::open(&database_path)
            .await
            .with_context(|| {
                format!("Failed to open history database {}", database_path.display())
            })?;

        tracing::debug!(
            data_dir = %data_dir.display(),
            database = %database_path.display(),
            "Application state ready"
        );

        Ok(Self {
            config,
            database_path,
            store,
        })
    }

    /// Session options for `conversation_id` with CLI overrides applied.
    pub fn conversation_config(
        &self,
        conversation_id: &str,
        args: &SessionArgs,
    ) -> ConversationConfig {
        let mut config = self.window_config(conversation_id, &args.window);
        if let Some(model) = &args.model {
            config = config.with_model(model.clone());
        }
        if let Some(prompt) = &args.system_prompt {
            config = config.with_system_prompt(prompt.clone());
        }
        config
    }

    /// Session options carrying only the window overrides.
    pub fn window_config(&self, conversation_id: &str, args: &WindowArgs) -> ConversationConfig {
        let mut config = self.config.conversation(conversation_id);
        if let Some(limit) = args.message_limit {
            config = config.with_message_limit(limit);
        }
        if let Some(hours) = args.time_limit_hours {
            config = config.with_time_limit_hours(hours);
        }
        config
    }

    /// Build a conversation backed by the OpenAI completer.
    ///
    /// Fails if the configured API key variable is not set.
    pub fn conversation(&self, config: ConversationConfig) -> anyhow::Result<CliConversation> {
        let api_key = resolve_api_key(&self.config).with_context(|| {
            format!("Set {} to your OpenAI API key", self.config.api_key_env)
        })?;
        let completer = create_completer(&self.config, api_key);
        Ok(Conversation::new(config, self.store.clone(), completer))
    }
}
