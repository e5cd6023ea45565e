//! Completer trait definition.
//!
//! The completion endpoint is a black box: turns (and optional opaque tool
//! schemas) go in, and either free text or a list of function calls comes out.
//! Transport, auth, and retry behavior belong to the implementation.

use std::sync::Arc;

use gptbot_types::completion::{Completion, CompletionRequest};
use gptbot_types::error::CompletionError;

/// Trait for completion endpoint clients.
///
/// Implementations own their credentials; nothing about the endpoint is
/// process-global. Implementations live in gptbot-infra (e.g.
/// `OpenAiCompleter`).
pub trait Completer: Send + Sync {
    /// Human-readable endpoint name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send the request and classify the response into one of the two
    /// [`Completion`] shapes.
    ///
    /// Responses that fit neither shape are `CompletionError::Protocol`.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<Completion, CompletionError>> + Send;
}

impl<T: Completer> Completer for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<Completion, CompletionError>> + Send {
        (**self).complete(request)
    }
}
