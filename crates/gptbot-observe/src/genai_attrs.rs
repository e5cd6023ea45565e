//! OpenTelemetry GenAI Semantic Convention values.
//!
//! `tracing` field names must be literal identifiers, so spans spell the
//! attribute names out inline (`gen_ai.request.model = ...`). Only the
//! well-known values and the span name format live here.

// --- Operation name values ---

/// Standard chat completion operation.
pub const OP_CHAT: &str = "chat";

// --- Provider name values ---

pub const PROVIDER_OPENAI: &str = "openai";

/// Span name for a GenAI operation: `"{operation} {model}"`.
pub fn span_name(operation: &str, model: &str) -> String {
    format!("{operation} {model}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_name() {
        assert_eq!(span_name(OP_CHAT, "gpt-4o"), "chat gpt-4o");
    }
}
