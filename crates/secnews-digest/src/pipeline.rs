//! Digest run orchestration.

use futures::stream::{self, StreamExt};
use secnews_core::{AppConfig, FetchMode, NewsItem, SummarizedItem};
use secnews_perplexity::PerplexityClient;

use crate::clean::clean_text;
use crate::error::PipelineError;
use crate::format::format_digest;
use crate::notify::SlackWebhook;

/// Tunables for one digest run.
#[derive(Debug, Clone)]
pub struct DigestOptions {
    pub max_items: usize,
    pub fetch_mode: FetchMode,
    /// When `false`, cleaned excerpts are posted without calling the model.
    pub summarize: bool,
    /// Summaries in flight at once. Output order always follows input order.
    pub summary_concurrency: usize,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            max_items: secnews_core::config::DEFAULT_MAX_ITEMS,
            fetch_mode: FetchMode::Search,
            summarize: true,
            summary_concurrency: 1,
        }
    }
}

impl DigestOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_items: config.max_items,
            fetch_mode: config.fetch_mode,
            summarize: config.summarize,
            summary_concurrency: config.summary_concurrency,
        }
    }
}

/// A rendered digest, before delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    /// Number of news items rendered into `message`.
    pub items: usize,
    pub message: String,
}

/// How a run ended. A run never panics and never returns `Err`; failures
/// are reported through [`RunOutcome::Failed`].
#[derive(Debug)]
pub enum RunOutcome {
    /// The message with `items` entries was accepted by the webhook.
    Posted { items: usize },
    /// Upstream returned no news; nothing was posted.
    NoNews,
    /// Rendering produced an empty message; the webhook was not called.
    NothingToPost,
    Failed(PipelineError),
}

impl RunOutcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed(_))
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Posted { items } => write!(f, "posted {items} news items"),
            RunOutcome::NoNews => write!(f, "no news returned"),
            RunOutcome::NothingToPost => write!(f, "empty message, nothing posted"),
            RunOutcome::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

/// Fetch → clean → summarize → format → deliver.
#[derive(Debug, Clone)]
pub struct DigestPipeline {
    perplexity: PerplexityClient,
    webhook: SlackWebhook,
    options: DigestOptions,
}

impl DigestPipeline {
    #[must_use]
    pub fn new(perplexity: PerplexityClient, webhook: SlackWebhook, options: DigestOptions) -> Self {
        Self {
            perplexity,
            webhook,
            options,
        }
    }

    /// Builds the pipeline and its HTTP clients from application config.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Setup`] if either HTTP client cannot be built
    /// or the Perplexity base URL is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let perplexity = PerplexityClient::with_base_url(
            &config.perplexity_api_key,
            &config.perplexity_model,
            config.http_timeout_secs,
            &config.perplexity_base_url,
        )
        .map_err(|e| PipelineError::Setup(e.to_string()))?;
        let webhook = SlackWebhook::new(&config.slack_webhook_url, config.http_timeout_secs)
            .map_err(|e| PipelineError::Setup(e.to_string()))?;
        Ok(Self::new(perplexity, webhook, DigestOptions::from_config(config)))
    }

    #[must_use]
    pub fn options(&self) -> &DigestOptions {
        &self.options
    }

    /// Runs the whole digest once.
    ///
    /// Every failure is logged here and returned as [`RunOutcome::Failed`].
    pub async fn run(&self) -> RunOutcome {
        tracing::info!(
            max_items = self.options.max_items,
            fetch_mode = %self.options.fetch_mode,
            summarize = self.options.summarize,
            "digest run starting"
        );

        let outcome = match self.deliver().await {
            Ok(outcome) => outcome,
            Err(e) => RunOutcome::Failed(e),
        };

        match &outcome {
            RunOutcome::Failed(e) => tracing::error!(error = %e, "digest run failed"),
            other => tracing::info!(outcome = %other, "digest run complete"),
        }
        outcome
    }

    async fn deliver(&self) -> Result<RunOutcome, PipelineError> {
        let Some(digest) = self.compose().await? else {
            return Ok(RunOutcome::NoNews);
        };

        if digest.message.is_empty() {
            tracing::info!("rendered message is empty; skipping webhook");
            return Ok(RunOutcome::NothingToPost);
        }

        self.webhook.post(&digest.message).await?;
        Ok(RunOutcome::Posted {
            items: digest.items,
        })
    }

    /// Fetches, cleans, summarizes and renders, without delivering.
    ///
    /// Returns `None` when upstream has no news.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Fetch`] if news retrieval fails. Summarizer
    /// failures never surface here.
    pub async fn compose(&self) -> Result<Option<Digest>, PipelineError> {
        let news = self
            .perplexity
            .fetch_news(self.options.fetch_mode, self.options.max_items)
            .await
            .map_err(PipelineError::Fetch)?;

        if news.is_empty() {
            tracing::info!("no news items returned from Perplexity");
            return Ok(None);
        }
        tracing::info!(count = news.len(), "fetched news items");

        let message = if self.options.summarize {
            format_digest(&self.summarize_all(&news).await)
        } else {
            let cleaned: Vec<NewsItem> = news
                .iter()
                .map(|item| {
                    NewsItem::new(
                        item.headline.as_str(),
                        clean_text(&item.excerpt),
                        item.source_url.as_str(),
                    )
                })
                .collect();
            format_digest(&cleaned)
        };

        Ok(Some(Digest {
            items: news.len(),
            message,
        }))
    }

    /// Summarizes each item, at most `summary_concurrency` at a time, keeping
    /// input order.
    pub async fn summarize_all(&self, items: &[NewsItem]) -> Vec<SummarizedItem> {
        let futures: Vec<_> = items.iter().map(|item| self.summarize_item(item)).collect();
        stream::iter(futures)
            .buffered(self.options.summary_concurrency.max(1))
            .collect()
            .await
    }

    /// Cleans the excerpt and asks for a synopsis, falling back to the
    /// cleaned excerpt on any summarizer error.
    async fn summarize_item(&self, item: &NewsItem) -> SummarizedItem {
        let cleaned = clean_text(&item.excerpt);

        let summary = match self.perplexity.summarize(&item.headline, &cleaned).await {
            // Completions carry their own [n] citation markers.
            Ok(summary) => clean_text(&summary),
            Err(e) => {
                tracing::warn!(
                    headline = %item.headline,
                    error = %e,
                    "summarization failed; using cleaned excerpt"
                );
                String::new()
            }
        };

        let summary = if summary.is_empty() { cleaned } else { summary };
        SummarizedItem::from_news(item, summary)
    }
}
