//! Configuration types for gptbot.
//!
//! `GptbotConfig` is the top-level `config.toml`; `ConversationConfig` holds
//! the per-session options a `Conversation` is built from.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::window::HistoryWindow;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful virtual assistant.";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_DATABASE_FILE: &str = "database.sqlite3";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Top-level configuration, loaded from `{data_dir}/config.toml`.
///
/// All fields have defaults, so an empty file is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GptbotConfig {
    /// SQLite file; defaults to `{data_dir}/database.sqlite3`.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Number of history messages sent with each request.
    #[serde(default)]
    pub message_limit: Option<u32>,

    /// Only send messages exchanged within this many hours.
    #[serde(default)]
    pub time_limit_hours: Option<u32>,

    /// Override for OpenAI-compatible endpoints.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

impl Default for GptbotConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            model: default_model(),
            system_prompt: default_system_prompt(),
            message_limit: None,
            time_limit_hours: None,
            base_url: None,
            api_key_env: default_api_key_env(),
        }
    }
}

impl GptbotConfig {
    /// Session options for `conversation_id` using this config's defaults.
    pub fn conversation(&self, conversation_id: impl Into<String>) -> ConversationConfig {
        ConversationConfig {
            conversation_id: conversation_id.into(),
            system_prompt: self.system_prompt.clone(),
            model: self.model.clone(),
            message_limit: self.message_limit,
            time_limit_hours: self.time_limit_hours,
        }
    }
}

/// Options for one conversation session. Immutable once the session is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationConfig {
    pub conversation_id: String,
    pub system_prompt: String,
    pub model: String,
    pub message_limit: Option<u32>,
    pub time_limit_hours: Option<u32>,
}

impl ConversationConfig {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        GptbotConfig::default().conversation(conversation_id)
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_message_limit(mut self, limit: u32) -> Self {
        self.message_limit = Some(limit);
        self
    }

    pub fn with_time_limit_hours(mut self, hours: u32) -> Self {
        self.time_limit_hours = Some(hours);
        self
    }

    /// The history window every `ask` reads back.
    pub fn window(&self) -> HistoryWindow {
        HistoryWindow::from_limits(self.message_limit, self.time_limit_hours)
    }
}
