//! Digest pipeline for DACH cybersecurity news.
//!
//! Fetches recent items from Perplexity, strips markup from their excerpts,
//! summarizes each one, renders a single Slack message and posts it to an
//! incoming webhook.

pub mod clean;
pub mod error;
pub mod format;
pub mod notify;
pub mod pipeline;

pub use clean::clean_text;
pub use error::{DeliveryError, PipelineError};
pub use format::{format_digest, DigestEntry};
pub use notify::SlackWebhook;
pub use pipeline::{Digest, DigestOptions, DigestPipeline, RunOutcome};
