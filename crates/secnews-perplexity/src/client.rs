//! HTTP client for the Perplexity search and chat-completion APIs.
//!
//! Wraps `reqwest` with bearer authentication, strict status handling
//! (anything but 200 is [`PerplexityError::Upstream`]) and typed response
//! deserialization.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use reqwest::{Client, StatusCode, Url};
use secnews_core::{FetchMode, NewsItem};
use serde::Serialize;

use crate::error::PerplexityError;
use crate::normalize::{normalize_chat_items, normalize_search_results, strip_code_fence};
use crate::query::{
    build_search_query, chat_news_messages, summary_messages, CHAT_NEWS_MAX_TOKENS,
    CHAT_NEWS_TEMPERATURE, SUMMARY_MAX_TOKENS, SUMMARY_TEMPERATURE,
};
use crate::types::{ChatRequest, ChatResponse, SearchRequest, SearchResponse};

const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai/";

/// Client for the Perplexity REST API.
///
/// Holds the API key, the completion model, and the resolved endpoint URLs.
/// Use [`PerplexityClient::new`] for production or
/// [`PerplexityClient::with_base_url`] to point at a mock server in tests.
#[derive(Clone)]
pub struct PerplexityClient {
    client: Client,
    api_key: String,
    model: String,
    search_url: Url,
    chat_url: Url,
}

impl std::fmt::Debug for PerplexityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerplexityClient")
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("search_url", &self.search_url.as_str())
            .field("chat_url", &self.chat_url.as_str())
            .finish_non_exhaustive()
    }
}

impl PerplexityClient {
    /// Creates a client pointed at the production Perplexity API.
    ///
    /// # Errors
    ///
    /// Returns [`PerplexityError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        model: &str,
        timeout_secs: Option<u64>,
    ) -> Result<Self, PerplexityError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// `timeout_secs` of `None` leaves outbound requests unbounded.
    ///
    /// # Errors
    ///
    /// Returns [`PerplexityError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PerplexityError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: Option<u64>,
        base_url: &str,
    ) -> Result<Self, PerplexityError> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent("secnews/0.1 (dach-security-digest)");
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalised).map_err(|e| invalid_base_url(base_url, &e))?;
        let search_url = base
            .join("search")
            .map_err(|e| invalid_base_url(base_url, &e))?;
        let chat_url = base
            .join("chat/completions")
            .map_err(|e| invalid_base_url(base_url, &e))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            search_url,
            chat_url,
        })
    }

    /// Fetches up to `max_items` news items using the given endpoint shape.
    ///
    /// # Errors
    ///
    /// See [`PerplexityClient::search_news`] and
    /// [`PerplexityClient::fetch_news_via_chat`].
    pub async fn fetch_news(
        &self,
        mode: FetchMode,
        max_items: usize,
    ) -> Result<Vec<NewsItem>, PerplexityError> {
        let today = Utc::now().date_naive();
        match mode {
            FetchMode::Search => self.search_news(today, max_items).await,
            FetchMode::Chat => self.fetch_news_via_chat(today, max_items).await,
        }
    }

    /// Queries the search endpoint for DACH security news from the two
    /// business days ending at `today`.
    ///
    /// An empty `results` array yields an empty `Vec`, not an error.
    ///
    /// # Errors
    ///
    /// - [`PerplexityError::Upstream`] on any status other than 200.
    /// - [`PerplexityError::Parse`] if the body lacks a `results` array or a
    ///   kept entry has no usable title. The raw payload is logged.
    /// - [`PerplexityError::Http`] on network failure.
    pub async fn search_news(
        &self,
        today: NaiveDate,
        max_items: usize,
    ) -> Result<Vec<NewsItem>, PerplexityError> {
        let query = build_search_query(today);
        let request = SearchRequest {
            query: &query,
            max_results: max_items,
        };
        let body = self.post_json(&self.search_url, &request).await?;

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| parse_error("search", &e, &body))?;
        let items = normalize_search_results(&parsed.results, max_items)
            .map_err(|reason| parse_error("search", &reason, &body))?;

        tracing::info!(
            received = parsed.results.len(),
            kept = items.len(),
            "search returned news items"
        );
        Ok(items)
    }

    /// Asks the chat-completion endpoint for news as a JSON array embedded in
    /// the completion text.
    ///
    /// # Errors
    ///
    /// - [`PerplexityError::Upstream`] on any status other than 200.
    /// - [`PerplexityError::Parse`] if the completion or its embedded array
    ///   does not match the expected shape. The raw content is logged.
    /// - [`PerplexityError::Http`] on network failure.
    pub async fn fetch_news_via_chat(
        &self,
        today: NaiveDate,
        max_items: usize,
    ) -> Result<Vec<NewsItem>, PerplexityError> {
        let request = ChatRequest {
            model: &self.model,
            messages: chat_news_messages(today, max_items),
            max_tokens: CHAT_NEWS_MAX_TOKENS,
            temperature: CHAT_NEWS_TEMPERATURE,
        };
        let body = self.post_json(&self.chat_url, &request).await?;

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| parse_error("chat news", &e, &body))?;
        let content = parsed
            .first_content()
            .map_err(|reason| parse_error("chat news", &reason, &body))?;
        let raw_items: Vec<serde_json::Value> = serde_json::from_str(strip_code_fence(content))
            .map_err(|e| parse_error("chat news content", &e, content))?;
        let items = normalize_chat_items(&raw_items, max_items)
            .map_err(|reason| parse_error("chat news content", &reason, content))?;

        tracing::info!(kept = items.len(), "chat completion returned news items");
        Ok(items)
    }

    /// Produces a short German synopsis of one news item.
    ///
    /// A completion body that cannot be read (missing `choices`, wrong shape,
    /// blank content) is not an error: the failure is logged and
    /// `cleaned_excerpt` is returned unchanged.
    ///
    /// # Errors
    ///
    /// - [`PerplexityError::Upstream`] on any status other than 200.
    /// - [`PerplexityError::Http`] on network failure.
    pub async fn summarize(
        &self,
        headline: &str,
        cleaned_excerpt: &str,
    ) -> Result<String, PerplexityError> {
        let request = ChatRequest {
            model: &self.model,
            messages: summary_messages(headline, cleaned_excerpt),
            max_tokens: SUMMARY_MAX_TOKENS,
            temperature: SUMMARY_TEMPERATURE,
        };
        let body = self.post_json(&self.chat_url, &request).await?;

        let summary = serde_json::from_str::<ChatResponse>(&body)
            .map_err(|e| e.to_string())
            .and_then(|parsed| {
                parsed
                    .first_content()
                    .map(ToOwned::to_owned)
                    .map_err(ToOwned::to_owned)
            });

        match summary {
            Ok(summary) => Ok(summary),
            Err(reason) => {
                tracing::warn!(
                    headline,
                    reason = %reason,
                    payload = %body,
                    "summary response malformed; using cleaned excerpt"
                );
                Ok(cleaned_excerpt.to_owned())
            }
        }
    }

    /// Sends an authenticated JSON POST and returns the body of a 200 response.
    ///
    /// # Errors
    ///
    /// Returns [`PerplexityError::Upstream`] with status and body text for
    /// any other status, or [`PerplexityError::Http`] on network failure.
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &Url,
        body: &B,
    ) -> Result<String, PerplexityError> {
        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if status != StatusCode::OK {
            tracing::error!(
                url = %url,
                status = status.as_u16(),
                body = %text,
                "Perplexity API returned an error status"
            );
            return Err(PerplexityError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

fn invalid_base_url(url: &str, reason: &dyn std::fmt::Display) -> PerplexityError {
    PerplexityError::InvalidBaseUrl {
        url: url.to_owned(),
        reason: reason.to_string(),
    }
}

/// Logs the raw payload and builds a [`PerplexityError::Parse`].
fn parse_error(context: &str, reason: &dyn std::fmt::Display, payload: &str) -> PerplexityError {
    tracing::error!(
        context,
        reason = %reason,
        payload,
        "failed to parse Perplexity response"
    );
    PerplexityError::Parse {
        context: context.to_owned(),
        reason: reason.to_string(),
    }
}
