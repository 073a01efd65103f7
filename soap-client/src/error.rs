//! Error types for the SOAP client

use thiserror::Error;

/// Errors that can occur during SOAP communication
#[derive(Debug, Error)]
pub enum SoapError {
    /// Network or HTTP communication error
    #[error("Network/HTTP error: {0}")]
    Transport(String),

    /// Response was well-formed HTTP but not a recognizable SOAP document
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl SoapError {
    /// Build an `UnexpectedResponse` from an offending body, keeping only a
    /// short excerpt for diagnostics.
    pub fn unexpected(context: &str, body: &str) -> Self {
        Self::UnexpectedResponse(format!("{}: {}", context, excerpt(body)))
    }
}

const EXCERPT_CHARS: usize = 200;

fn excerpt(body: &str) -> String {
    if body.chars().count() <= EXCERPT_CHARS {
        body.to_string()
    } else {
        let cut: String = body.chars().take(EXCERPT_CHARS).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_keeps_short_bodies_whole() {
        let err = SoapError::unexpected("no SOAP Body", "<oops/>");
        assert_eq!(
            format!("{}", err),
            "Unexpected response: no SOAP Body: <oops/>"
        );
    }

    #[test]
    fn test_unexpected_truncates_long_bodies() {
        let body = "x".repeat(500);
        let err = SoapError::unexpected("garbage", &body);
        let text = format!("{}", err);
        assert!(text.ends_with("..."));
        assert!(text.len() < 300);
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        // Multi-byte content must not be sliced mid-codepoint.
        let body = "💋".repeat(300);
        let err = SoapError::unexpected("garbage", &body);
        let _ = format!("{}", err);
    }
}
