use secnews_perplexity::PerplexityError;
use thiserror::Error;

/// Failure to hand the rendered message to the webhook.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Errors that end a digest run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("news fetch failed: {0}")]
    Fetch(#[source] PerplexityError),

    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("pipeline setup failed: {0}")]
    Setup(String),
}
