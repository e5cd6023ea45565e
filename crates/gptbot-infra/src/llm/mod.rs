//! Completion endpoint implementations.
//!
//! Contains the concrete [`Completer`](gptbot_core::llm::completer::Completer)
//! for OpenAI-compatible APIs and a factory ([`create_completer`]) that builds
//! one from a [`GptbotConfig`].

pub mod openai;

use secrecy::SecretString;

use gptbot_core::llm::box_completer::BoxCompleter;
use gptbot_types::config::GptbotConfig;

use self::openai::OpenAiCompleter;

/// Create a [`BoxCompleter`] for `config`, authenticated with `api_key`.
///
/// Uses `config.base_url` when set, otherwise the public OpenAI endpoint.
pub fn create_completer(config: &GptbotConfig, api_key: SecretString) -> BoxCompleter {
    let completer = match config.base_url.as_deref() {
        Some(base_url) => OpenAiCompleter::with_base_url(api_key, base_url),
        None => OpenAiCompleter::new(api_key),
    };
    tracing::debug!(base_url = completer.base_url(), "Created completion client");
    BoxCompleter::new(completer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gptbot_core::llm::completer::Completer;

    #[test]
    fn test_create_completer_default() {
        let completer = create_completer(
            &GptbotConfig::default(),
            SecretString::from("sk-test".to_string()),
        );
        assert_eq!(Completer::name(&completer), "openai");
    }

    #[test]
    fn test_create_completer_with_base_url() {
        let config = GptbotConfig {
            base_url: Some("http://localhost:11434/v1".to_string()),
            ..GptbotConfig::default()
        };
        let completer = create_completer(&config, SecretString::from("sk-test".to_string()));
        assert_eq!(Completer::name(&completer), "openai");
    }
}
