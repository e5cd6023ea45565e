//! OpenAI chat-completion client.
//!
//! [`OpenAiCompleter`] implements the `Completer` port on top of
//! [`async_openai`]. It sends the turns (and any tool schemas) as a
//! non-streaming chat completion and classifies the first choice as either
//! free text or a list of function calls.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionMessageToolCalls, ChatCompletionRequestAssistantMessage,
    ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessage, ChatCompletionRequestSystemMessageContent,
    ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent,
    CreateChatCompletionRequest, CreateChatCompletionResponse, FinishReason,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use gptbot_core::llm::completer::Completer;
use gptbot_types::completion::{Completion, CompletionRequest, FunctionCall, Turn, TurnRole};
use gptbot_types::error::CompletionError;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Completer for the OpenAI chat-completion API and compatible endpoints.
///
/// Does NOT derive Debug: the `async_openai::Client` holds the API key.
pub struct OpenAiCompleter {
    client: Client<OpenAIConfig>,
    base_url: String,
}

impl OpenAiCompleter {
    /// Create a completer for `https://api.openai.com/v1`.
    pub fn new(api_key: SecretString) -> Self {
        Self::with_base_url(api_key, OPENAI_BASE_URL)
    }

    /// Create a completer for an OpenAI-compatible endpoint.
    pub fn with_base_url(api_key: SecretString, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let config = OpenAIConfig::new()
            .with_api_key(api_key.expose_secret())
            .with_api_base(&base_url);

        Self {
            client: Client::with_config(config),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Completer for OpenAiCompleter {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        let oai_request = build_request(request)?;

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(map_openai_error)?;

        classify_response(response)
    }
}

// ---------------------------------------------------------------------------
// Request mapping
// ---------------------------------------------------------------------------

fn to_openai_message(turn: &Turn) -> ChatCompletionRequestMessage {
    match turn.role {
        TurnRole::System => {
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(turn.content.clone()),
                name: None,
            })
        }
        TurnRole::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(turn.content.clone()),
            name: None,
        }),
        TurnRole::Assistant => {
            #[allow(deprecated)]
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                    turn.content.clone(),
                )),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
    }
}

/// Build a [`CreateChatCompletionRequest`] from a [`CompletionRequest`].
///
/// Tool schemas are opaque here; ones that do not fit the endpoint's tool
/// shape are rejected as `InvalidRequest`.
fn build_request(request: &CompletionRequest) -> Result<CreateChatCompletionRequest, CompletionError> {
    let mut req = CreateChatCompletionRequest {
        model: request.model.clone(),
        messages: request.turns.iter().map(to_openai_message).collect(),
        ..Default::default()
    };

    if let Some(tools) = request.tools.as_ref().filter(|t| !t.is_empty()) {
        let tools = serde_json::from_value(Value::Array(tools.clone()))
            .map_err(|e| CompletionError::InvalidRequest(format!("invalid tool schema: {e}")))?;
        req.tools = Some(tools);
    }

    Ok(req)
}

// ---------------------------------------------------------------------------
// Response classification
// ---------------------------------------------------------------------------

/// Classify the first choice of a chat-completion response.
///
/// - `FinishReason::ToolCalls`: every function tool call, with its argument
///   blob parsed as JSON. Other tool call types are skipped. A tool-call
///   finish carrying no function calls is a protocol error.
/// - any other finish reason: the choice's text content.
fn classify_response(
    response: CreateChatCompletionResponse,
) -> Result<Completion, CompletionError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::Protocol("response has no choices".to_string()))?;

    match choice.finish_reason {
        Some(FinishReason::ToolCalls) => {
            let calls = choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .filter_map(|call| match call {
                    ChatCompletionMessageToolCalls::Function(call) => {
                        Some(parse_function_call(&call.function.name, &call.function.arguments))
                    }
                    ChatCompletionMessageToolCalls::Custom(_) => None,
                })
                .collect::<Result<Vec<_>, _>>()?;

            if calls.is_empty() {
                return Err(CompletionError::Protocol(
                    "tool_calls finish without function calls".to_string(),
                ));
            }
            Ok(Completion::FunctionCalls(calls))
        }
        Some(
            FinishReason::Stop
            | FinishReason::Length
            | FinishReason::ContentFilter
            | FinishReason::FunctionCall,
        )
        | None => match choice.message.content {
            Some(content) => Ok(Completion::Text(content)),
            None => Err(CompletionError::Protocol(
                "text reply has no content".to_string(),
            )),
        },
    }
}

fn parse_function_call(name: &str, arguments: &str) -> Result<FunctionCall, CompletionError> {
    let arguments: Value = serde_json::from_str(arguments).map_err(|e| {
        CompletionError::Protocol(format!("arguments for '{name}' are not JSON: {e}"))
    })?;
    Ok(FunctionCall::new(name, arguments))
}

/// Map an `async_openai::error::OpenAIError` to a [`CompletionError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> CompletionError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("unknown");
            tracing::warn!(code, "Completion endpoint returned an error");
            CompletionError::Unavailable(format!("{} ({code})", api_err.message))
        }
        OpenAIError::JSONDeserialize(_, content) => {
            CompletionError::Protocol(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => CompletionError::InvalidRequest(msg.clone()),
        _ => CompletionError::Unavailable(err.to_string()),
    }
}
