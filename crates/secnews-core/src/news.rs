use serde::{Deserialize, Serialize};

/// A single news entry as returned by the upstream search API, normalized.
///
/// `excerpt` is the raw upstream snippet and may still contain markup.
/// `source_url` is empty when the upstream entry carried no usable link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub source_url: String,
}

impl NewsItem {
    pub fn new(
        headline: impl Into<String>,
        excerpt: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            headline: headline.into(),
            excerpt: excerpt.into(),
            source_url: source_url.into(),
        }
    }
}

/// A [`NewsItem`] after cleaning and summarization, ready for formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizedItem {
    pub headline: String,
    /// Model synopsis, or the cleaned excerpt when summarization failed.
    pub summary: String,
    pub source_url: String,
}

impl SummarizedItem {
    /// Builds the summarized form of `item`, carrying headline and link over.
    #[must_use]
    pub fn from_news(item: &NewsItem, summary: String) -> Self {
        Self {
            headline: item.headline.clone(),
            summary,
            source_url: item.source_url.clone(),
        }
    }
}
