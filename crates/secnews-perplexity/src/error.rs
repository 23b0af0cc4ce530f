use thiserror::Error;

/// Errors returned by the Perplexity API client.
#[derive(Debug, Error)]
pub enum PerplexityError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a status other than 200.
    #[error("upstream API returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The response body did not match the expected schema.
    #[error("unexpected response shape for {context}: {reason}")]
    Parse { context: String, reason: String },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
