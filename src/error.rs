//! Error types shared by the collaborators and the HTTP surface

use thiserror::Error;

/// Result type alias for conversation operations
pub type ConverseResult<T> = Result<T, ConverseError>;

#[derive(Error, Debug)]
pub enum ConverseError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingCredentials(Vec<String>),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_errors_name_their_source() {
        let err = ConverseError::Synthesis("stream reset".to_string());
        assert_eq!(err.to_string(), "Synthesis error: stream reset");

        let err: ConverseError = config::ConfigError::Message("bad port".to_string()).into();
        assert!(matches!(err, ConverseError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
