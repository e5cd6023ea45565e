use thiserror::Error;

/// Errors from history store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing store unreachable, unwritable, or corrupt.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Metadata value could not be serialized to text.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Stored metadata text could not be parsed back.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Errors from the completion collaborator.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Network, auth, or server failure reaching the endpoint.
    #[error("completion endpoint unavailable: {0}")]
    Unavailable(String),

    /// The response did not match either expected shape.
    #[error("completion protocol error: {0}")]
    Protocol(String),

    /// The request could not be encoded for the endpoint.
    #[error("invalid completion request: {0}")]
    InvalidRequest(String),
}

/// Errors surfaced by a conversation `ask`.
#[derive(Debug, Error)]
pub enum AskError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("credential not found in environment variable '{0}'")]
    MissingCredential(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Unavailable("disk full".to_string());
        assert_eq!(err.to_string(), "storage unavailable: disk full");
    }

    #[test]
    fn test_ask_error_is_transparent() {
        let err: AskError = CompletionError::Protocol("no choices".to_string()).into();
        assert_eq!(err.to_string(), "completion protocol error: no choices");
        assert!(matches!(err, AskError::Completion(CompletionError::Protocol(_))));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingCredential("OPENAI_API_KEY".to_string());
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
