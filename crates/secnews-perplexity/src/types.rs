//! Perplexity API request and response types.
//!
//! Responses are modelled strictly: a body that does not deserialize into
//! these shapes is reported as [`crate::PerplexityError::Parse`].

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

/// Request body for `POST /search`.
#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub max_results: usize,
}

/// Response body for `POST /search`: `{ "results": [ ... ] }`.
///
/// Entries stay untyped here; only the ones that are kept get decoded into
/// [`SearchResult`], so a bad entry past the cap cannot fail the fetch.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<serde_json::Value>,
}

/// One search hit. Only `title` is mandatory; the link may arrive under
/// any of three field names.
#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub title: String,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub direct_url: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

// ---------------------------------------------------------------------------
// chat/completions
// ---------------------------------------------------------------------------

/// One entry of the JSON array embedded in a chat-mode news completion.
///
/// Models emit `null` for unknown fields as often as they omit them; both
/// read as `None`.
#[derive(Debug, Deserialize)]
pub struct ChatNewsItem {
    pub headline: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Response body for `POST /chat/completions`, reduced to the fields we read.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    pub content: String,
}

impl ChatResponse {
    /// Returns the trimmed content of the first choice.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when there are no choices or the
    /// first choice has blank content.
    pub fn first_content(&self) -> Result<&str, &'static str> {
        let choice = self.choices.first().ok_or("response has no choices")?;
        let content = choice.message.content.trim();
        if content.is_empty() {
            return Err("first choice has empty content");
        }
        Ok(content)
    }
}
