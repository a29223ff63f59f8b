use std::time::Duration;

/// Failures surfaced by lifecycle operations and console executions.
///
/// None of these are fatal: callers turn them into a notice or an inline
/// console error and leave prior state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeckError {
    /// A required field was empty; no request was issued.
    #[error("{0}")]
    Validation(String),

    /// No response arrived from the server.
    #[error("{0}")]
    Transport(String),

    /// The server answered with `success: false`.
    #[error("{0}")]
    Server(String),

    /// Canned syntax error from the simulated executor.
    #[error("{0}")]
    Syntax(String),

    /// No answer before the deadline.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The id is not in the local collection.
    #[error("Database #{0} not found")]
    NotFound(i64),

    /// A response body could not be decoded.
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl DeckError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DeckError::Validation(msg.into())
    }

    /// Server message verbatim when present, otherwise the caller's fallback.
    pub fn server(message: Option<String>, fallback: &str) -> Self {
        match message {
            Some(m) if !m.trim().is_empty() => DeckError::Server(m),
            _ => DeckError::Server(fallback.to_string()),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DeckError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_verbatim() {
        let err = DeckError::server(Some("name already taken".into()), "Failed to create database");
        assert_eq!(err.to_string(), "name already taken");
    }

    #[test]
    fn test_server_fallback_on_missing_or_blank() {
        let err = DeckError::server(None, "Failed to create database");
        assert_eq!(err.to_string(), "Failed to create database");
        let err = DeckError::server(Some("  ".into()), "Query failed");
        assert_eq!(err.to_string(), "Query failed");
    }

    #[test]
    fn test_timeout_message() {
        let err = DeckError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Request timed out after 30s");
    }
}
