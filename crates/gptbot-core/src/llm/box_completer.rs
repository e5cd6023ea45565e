//! BoxCompleter -- object-safe dynamic dispatch wrapper for Completer.
//!
//! 1. Define an object-safe `CompleterDyn` trait with boxed futures
//! 2. Blanket-impl `CompleterDyn` for all `T: Completer`
//! 3. `BoxCompleter` wraps `Box<dyn CompleterDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use gptbot_types::completion::{Completion, CompletionRequest};
use gptbot_types::error::CompletionError;

use super::completer::Completer;

/// Object-safe version of [`Completer`] with boxed futures.
pub trait CompleterDyn: Send + Sync {
    fn name(&self) -> &str;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Completion, CompletionError>> + Send + 'a>>;
}

impl<T: Completer> CompleterDyn for T {
    fn name(&self) -> &str {
        Completer::name(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Completion, CompletionError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }
}

/// Type-erased completer for runtime endpoint selection.
///
/// Since `Completer` uses RPITIT it cannot be a trait object directly;
/// `BoxCompleter` delegates to the inner `CompleterDyn` object and itself
/// implements `Completer`, so a `Conversation` can be built over it.
pub struct BoxCompleter {
    inner: Box<dyn CompleterDyn + Send + Sync>,
}

impl BoxCompleter {
    /// Wrap a concrete `Completer` in a type-erased box.
    pub fn new<T: Completer + 'static>(completer: T) -> Self {
        Self {
            inner: Box::new(completer),
        }
    }
}

impl Completer for BoxCompleter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        self.inner.complete_boxed(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoCompleter;

    impl Completer for EchoCompleter {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<Completion, CompletionError> {
            let last = request
                .turns
                .last()
                .map(|t| t.content.clone())
                .unwrap_or_default();
            Ok(Completion::Text(last))
        }
    }

    #[tokio::test]
    async fn test_box_completer_delegates() {
        use gptbot_types::completion::Turn;

        let boxed = BoxCompleter::new(EchoCompleter);
        assert_eq!(Completer::name(&boxed), "echo");

        let request = CompletionRequest {
            model: "m".into(),
            turns: vec![Turn::system("sys")],
            tools: None,
        };
        let completion = boxed.complete(&request).await.unwrap();
        assert_eq!(completion, Completion::Text("sys".into()));
    }
}
