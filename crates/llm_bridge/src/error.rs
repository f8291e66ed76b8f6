//! Relay error type

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Placeholder substituted for the credential in surfaced text
pub const REDACTED: &str = "[REDACTED]";

/// Failure modes of a single relay call to the model provider
#[derive(Debug, Error)]
pub enum RelayError {
    /// Connection error, timeout or broken response body
    #[error("Error contacting Groq API: {0}")]
    Transport(String),

    /// Provider answered with something other than 200
    #[error("Groq API error")]
    Upstream { status: u16, body: String },

    /// Envelope or model content is not the JSON we asked for
    #[error("Failed to parse Groq response")]
    Malformed(String),
}

impl RelayError {
    /// Detail text suitable for an HTTP error body
    pub fn details(&self) -> &str {
        match self {
            Self::Transport(details) => details,
            Self::Upstream { body, .. } => body,
            Self::Malformed(details) => details,
        }
    }
}

/// Strip every occurrence of the credential from `text`
pub fn redact(text: &str, secret: &SecretString) -> String {
    let secret = secret.expose_secret();
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret.as_str(), REDACTED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_removes_secret() {
        let secret = SecretString::new("gsk_live_123".to_string());
        let text = "invalid key gsk_live_123 (gsk_live_123)";
        assert_eq!(
            redact(text, &secret),
            "invalid key [REDACTED] ([REDACTED])"
        );
    }

    #[test]
    fn test_redact_empty_secret_is_noop() {
        let secret = SecretString::new(String::new());
        assert_eq!(redact("unchanged", &secret), "unchanged");
    }

    #[test]
    fn test_error_messages() {
        let err = RelayError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "Error contacting Groq API: connection refused");
        assert_eq!(err.details(), "connection refused");

        let err = RelayError::Upstream {
            status: 401,
            body: "bad key".to_string(),
        };
        assert_eq!(err.to_string(), "Groq API error");
        assert_eq!(err.details(), "bad key");
    }
}
