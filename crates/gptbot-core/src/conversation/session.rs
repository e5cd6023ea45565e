//! Conversation session.
//!
//! Each `ask` is a strict sequence: persist the user turn, read back the
//! bounded window (which therefore always contains that turn), send the
//! system prompt plus window to the completer, persist the reply, return a
//! typed outcome. Nothing is retried; a user turn persisted before a failed
//! completion stays in history.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{Instrument, Span, debug, info, info_span, warn};

use gptbot_types::completion::{AskOutcome, Completion, CompletionRequest, Turn};
use gptbot_types::config::ConversationConfig;
use gptbot_types::error::{AskError, StoreError};
use gptbot_types::message::{MessageRole, StoredMessage};
use gptbot_types::window::HistoryWindow;

use crate::history::store::HistoryStore;
use crate::llm::completer::Completer;

/// Assistant message persisted in place of a function-call response.
pub const FUNCTION_CALL_PLACEHOLDER: &str = "Ok, done.";

/// One logical conversation over a history store and a completer.
///
/// Generic over `HistoryStore` and `Completer` so gptbot-core never depends
/// on gptbot-infra. All state is fixed at construction.
pub struct Conversation<S: HistoryStore, C: Completer> {
    config: ConversationConfig,
    window: HistoryWindow,
    store: S,
    completer: C,
}

impl<S: HistoryStore, C: Completer> Conversation<S, C> {
    pub fn new(config: ConversationConfig, store: S, completer: C) -> Self {
        let window = config.window();
        Self {
            config,
            window,
            store,
            completer,
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.config.conversation_id
    }

    pub fn config(&self) -> &ConversationConfig {
        &self.config
    }

    pub fn window(&self) -> &HistoryWindow {
        &self.window
    }

    /// Access the history store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ask the completer a question within this conversation.
    ///
    /// `tools` is an opaque list of function schemas passed straight through
    /// to the completer.
    #[tracing::instrument(
        name = "conversation.ask",
        skip_all,
        fields(
            conversation_id = %self.config.conversation_id,
            model = %self.config.model,
            window_len = tracing::field::Empty,
            outcome = tracing::field::Empty,
        )
    )]
    pub async fn ask(
        &self,
        user_text: &str,
        tools: Option<&[serde_json::Value]>,
    ) -> Result<AskOutcome, AskError> {
        let conversation_id = self.conversation_id();

        self.store
            .append_message(conversation_id, MessageRole::User, user_text)
            .await?;

        let history = self.store.list_messages(conversation_id, &self.window).await?;
        Span::current().record("window_len", history.len());
        debug!(window_len = history.len(), "Loaded conversation window");

        let request = self.build_request(&history, tools);

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.operation.name = "chat",
            gen_ai.provider.name = self.completer.name(),
            gen_ai.request.model = %request.model,
            gen_ai.conversation.id = conversation_id,
            turns = request.turns.len(),
            tools = request.tools.as_ref().map_or(0, Vec::len),
        );

        let completion = match self.completer.complete(&request).instrument(span).await {
            Ok(completion) => completion,
            Err(e) => {
                warn!(error = %e, "Completion failed; user turn remains in history");
                return Err(e.into());
            }
        };

        let outcome = match completion {
            Completion::Text(body) => {
                let reply = body.trim().to_string();
                self.store
                    .append_message(conversation_id, MessageRole::Assistant, &reply)
                    .await?;
                AskOutcome::Text(reply)
            }
            Completion::FunctionCalls(calls) => {
                self.store
                    .append_message(
                        conversation_id,
                        MessageRole::Assistant,
                        FUNCTION_CALL_PLACEHOLDER,
                    )
                    .await?;
                AskOutcome::Function(calls)
            }
        };

        Span::current().record("outcome", outcome.kind());
        info!(outcome = outcome.kind(), "Conversation turn completed");
        Ok(outcome)
    }

    /// The current history window, without appending anything.
    pub async fn history(&self) -> Result<Vec<StoredMessage>, StoreError> {
        self.store
            .list_messages(self.conversation_id(), &self.window)
            .await
    }

    /// This conversation's metadata, or `None` if never set.
    pub async fn get_metadata(&self) -> Result<Option<serde_json::Value>, StoreError> {
        self.store.get_metadata(self.conversation_id()).await
    }

    /// Metadata decoded into `T`.
    pub async fn get_metadata_as<T: DeserializeOwned>(&self) -> Result<Option<T>, StoreError> {
        match self.get_metadata().await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StoreError::Deserialization(e.to_string())),
            None => Ok(None),
        }
    }

    /// Replace this conversation's metadata with `value`.
    ///
    /// Fails with `StoreError::Serialization` if `value` has no JSON
    /// representation.
    pub async fn set_metadata<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), StoreError> {
        let value =
            serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store
            .set_metadata(self.conversation_id(), &value)
            .await
    }

    fn build_request(
        &self,
        history: &[StoredMessage],
        tools: Option<&[serde_json::Value]>,
    ) -> CompletionRequest {
        let mut turns = Vec::with_capacity(history.len() + 1);
        turns.push(Turn::system(self.config.system_prompt.clone()));
        turns.extend(history.iter().map(|m| Turn {
            role: m.role.into(),
            content: m.message.clone(),
        }));

        CompletionRequest {
            model: self.config.model.clone(),
            turns,
            tools: tools.map(<[serde_json::Value]>::to_vec),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, VecDeque};
    use std::sync::Mutex;

    use serde_json::json;

    use gptbot_types::completion::{FunctionCall, TurnRole};
    use gptbot_types::error::CompletionError;

    use crate::history::memory::InMemoryHistoryStore;

    // --- Mock completer ---

    /// Replays scripted results and records every request it receives.
    struct ScriptedCompleter {
        script: Mutex<VecDeque<Result<Completion, CompletionError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedCompleter {
        fn new(script: Vec<Result<Completion, CompletionError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Completer for ScriptedCompleter {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<Completion, CompletionError> {
            self.requests.lock().unwrap().push(request.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(CompletionError::Unavailable("script exhausted".into())))
        }
    }

    fn text(body: &str) -> Result<Completion, CompletionError> {
        Ok(Completion::Text(body.to_string()))
    }

    fn conversation(
        config: ConversationConfig,
        script: Vec<Result<Completion, CompletionError>>,
    ) -> Conversation<InMemoryHistoryStore, std::sync::Arc<ScriptedCompleter>> {
        Conversation::new(
            config,
            InMemoryHistoryStore::new(),
            std::sync::Arc::new(ScriptedCompleter::new(script)),
        )
    }

    fn roles_and_texts(turns: &[Turn]) -> Vec<(TurnRole, &str)> {
        turns.iter().map(|t| (t.role, t.content.as_str())).collect()
    }

    #[tokio::test]
    async fn test_ask_text_reply_is_trimmed_and_persisted() {
        let conv = conversation(ConversationConfig::new("c1"), vec![text("  hello \n")]);

        let outcome = conv.ask("hi", None).await.unwrap();
        assert_eq!(outcome, AskOutcome::Text("hello".into()));

        let history = conv.history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[0].message, "hi");
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert_eq!(history[1].message, "hello");
    }

    #[tokio::test]
    async fn test_request_starts_with_system_prompt_and_includes_new_turn() {
        let config = ConversationConfig::new("c1")
            .with_system_prompt("Be terse.")
            .with_model("gpt-4o-mini");
        let completer = std::sync::Arc::new(ScriptedCompleter::new(vec![text("ok")]));
        let conv = Conversation::new(config, InMemoryHistoryStore::new(), completer.clone());

        conv.ask("first question", None).await.unwrap();

        let requests = completer.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gpt-4o-mini");
        assert_eq!(
            roles_and_texts(&requests[0].turns),
            vec![(TurnRole::System, "Be terse."), (TurnRole::User, "first question")]
        );
        assert!(requests[0].tools.is_none());
    }

    #[tokio::test]
    async fn test_message_limit_bounds_window() {
        let config = ConversationConfig::new("c1").with_message_limit(2);
        let completer = std::sync::Arc::new(ScriptedCompleter::new(vec![
            text("hello "),
            text("again to you"),
        ]));
        let conv = Conversation::new(config, InMemoryHistoryStore::new(), completer.clone());

        conv.ask("hi", None).await.unwrap();
        conv.ask("again", None).await.unwrap();

        let requests = completer.requests();
        assert_eq!(
            roles_and_texts(&requests[1].turns),
            vec![
                (TurnRole::System, "You are a helpful virtual assistant."),
                (TurnRole::Assistant, "hello"),
                (TurnRole::User, "again"),
            ]
        );

        let all = conv
            .store()
            .list_messages("c1", &HistoryWindow::unbounded())
            .await
            .unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn test_history_is_current_window_without_appending() {
        let config = ConversationConfig::new("c1").with_message_limit(3);
        let conv = conversation(config, vec![text("one"), text("two")]);

        conv.ask("first", None).await.unwrap();
        conv.ask("second", None).await.unwrap();

        let history = conv.history().await.unwrap();
        let texts: Vec<&str> = history.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["one", "second", "two"]);

        // Reading the window twice stores nothing new.
        assert_eq!(conv.history().await.unwrap(), history);
        let all = conv
            .store()
            .list_messages("c1", &HistoryWindow::unbounded())
            .await
            .unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn test_function_call_persists_placeholder() {
        let calls = vec![FunctionCall::new("lookup", json!({"city": "Paris"}))];
        let conv = conversation(
            ConversationConfig::new("c1"),
            vec![Ok(Completion::FunctionCalls(calls.clone()))],
        );

        let outcome = conv.ask("weather in Paris?", None).await.unwrap();
        assert_eq!(outcome, AskOutcome::Function(calls));

        let history = conv.history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert_eq!(history[1].message, FUNCTION_CALL_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_tools_are_passed_through() {
        let completer = std::sync::Arc::new(ScriptedCompleter::new(vec![text("ok")]));
        let conv = Conversation::new(
            ConversationConfig::new("c1"),
            InMemoryHistoryStore::new(),
            completer.clone(),
        );
        let tools = vec![json!({
            "type": "function",
            "function": {"name": "lookup", "parameters": {"type": "object"}}
        })];

        conv.ask("hi", Some(&tools)).await.unwrap();

        assert_eq!(completer.requests()[0].tools.as_deref(), Some(tools.as_slice()));
    }

    #[tokio::test]
    async fn test_completion_failure_keeps_user_turn() {
        let conv = conversation(
            ConversationConfig::new("c1"),
            vec![Err(CompletionError::Unavailable("connection refused".into()))],
        );

        let err = conv.ask("anyone there?", None).await.unwrap_err();
        assert!(matches!(
            err,
            AskError::Completion(CompletionError::Unavailable(_))
        ));

        let history = conv.history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[0].message, "anyone there?");
    }

    #[tokio::test]
    async fn test_protocol_error_surfaces() {
        let conv = conversation(
            ConversationConfig::new("c1"),
            vec![Err(CompletionError::Protocol("missing content".into()))],
        );

        let err = conv.ask("hi", None).await.unwrap_err();
        assert!(matches!(err, AskError::Completion(CompletionError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_metadata_roundtrip_and_replace() {
        let conv = conversation(ConversationConfig::new("c1"), vec![]);
        assert!(conv.get_metadata().await.unwrap().is_none());

        conv.set_metadata(&json!({"lang": "fr", "tier": 2}))
            .await
            .unwrap();
        conv.set_metadata(&json!({"lang": "de"})).await.unwrap();

        assert_eq!(
            conv.get_metadata().await.unwrap(),
            Some(json!({"lang": "de"}))
        );
    }

    #[tokio::test]
    async fn test_metadata_typed_access() {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Prefs {
            lang: String,
        }

        let conv = conversation(ConversationConfig::new("c1"), vec![]);
        conv.set_metadata(&Prefs { lang: "fr".into() }).await.unwrap();

        let prefs: Option<Prefs> = conv.get_metadata_as().await.unwrap();
        assert_eq!(prefs, Some(Prefs { lang: "fr".into() }));
    }

    #[tokio::test]
    async fn test_metadata_unserializable_value() {
        let conv = conversation(ConversationConfig::new("c1"), vec![]);
        let mut value = BTreeMap::new();
        value.insert((1u8, 2u8), "tuple keys have no JSON form");

        let err = conv.set_metadata(&value).await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
        assert!(conv.get_metadata().await.unwrap().is_none());
    }
}
