//! Perplexity API client for the security news digest.
//!
//! Retrieves recent DACH cybersecurity news through either the structured
//! search endpoint or a chat completion, and produces short German synopses
//! of individual items.

pub mod client;
pub mod error;
pub mod normalize;
pub mod query;
pub mod types;

pub use client::PerplexityClient;
pub use error::PerplexityError;
pub use query::{business_day_window, build_search_query};
