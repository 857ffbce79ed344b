//! Errors shared by every external-provider port.

/// Errors that can occur when calling an external provider.
///
/// None of these are fatal to a request: callers log them and fall back.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    Malformed(String),

    #[error("No results for '{0}'")]
    NoResults(String),
}

impl ProviderError {
    /// Build a `Status` error, keeping at most 200 bytes of the body.
    #[must_use]
    pub fn status(status: u16, body: &str) -> Self {
        let mut end = body.len().min(200);
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        Self::Status {
            status,
            body: body[..end].to_string(),
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}
