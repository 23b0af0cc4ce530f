//! Normalization from raw Perplexity shapes to [`secnews_core::NewsItem`].

use secnews_core::NewsItem;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{ChatNewsItem, SearchResult};

/// Decodes one raw array entry, naming its position on failure.
fn decode_entry<T: DeserializeOwned>(raw: &Value, kind: &str, index: usize) -> Result<T, String> {
    T::deserialize(raw).map_err(|e| format!("{kind} {index}: {e}"))
}

/// Returns the first non-blank candidate link, in priority order
/// `direct_url`, `source_url`, `url`; empty when none is present.
fn pick_source_url(result: &SearchResult) -> String {
    [&result.direct_url, &result.source_url, &result.url]
        .into_iter()
        .flatten()
        .map(|u| u.trim())
        .find(|u| !u.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Normalizes one search hit into a [`NewsItem`].
///
/// # Errors
///
/// Returns a reason string if the hit has a blank title.
pub fn normalize_search_result(result: &SearchResult) -> Result<NewsItem, String> {
    let headline = result.title.trim();
    if headline.is_empty() {
        return Err("search result has an empty title".to_string());
    }
    Ok(NewsItem::new(
        headline,
        result.snippet.clone().unwrap_or_default(),
        pick_source_url(result),
    ))
}

/// Decodes and normalizes the first `max_items` search hits.
///
/// Entries past the cap are never decoded.
///
/// # Errors
///
/// Returns the reason for the first kept hit that fails to decode or
/// normalize.
pub fn normalize_search_results(
    results: &[Value],
    max_items: usize,
) -> Result<Vec<NewsItem>, String> {
    results
        .iter()
        .take(max_items)
        .enumerate()
        .map(|(index, raw)| {
            let hit: SearchResult = decode_entry(raw, "search result", index)?;
            normalize_search_result(&hit)
        })
        .collect()
}

/// Removes a surrounding markdown code fence (```` ```json ... ``` ````) if present.
#[must_use]
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // Drop the language tag on the opening fence line.
    match rest.split_once('\n') {
        Some((tag, body)) if !tag.trim().contains(char::is_whitespace) => body.trim(),
        _ => rest.trim(),
    }
}

/// Decodes items from a chat completion array, capped at `max_items`.
///
/// Missing or `null` excerpts and links become empty strings. Entries past
/// the cap are never decoded.
///
/// # Errors
///
/// Returns a reason string if a kept entry does not decode or has a blank
/// headline.
pub fn normalize_chat_items(items: &[Value], max_items: usize) -> Result<Vec<NewsItem>, String> {
    items
        .iter()
        .take(max_items)
        .enumerate()
        .map(|(index, raw)| {
            let item: ChatNewsItem = decode_entry(raw, "chat item", index)?;
            let headline = item.headline.trim();
            if headline.is_empty() {
                return Err(format!("chat item {index} has an empty headline"));
            }
            Ok(NewsItem::new(
                headline,
                item.excerpt.unwrap_or_default(),
                item.source_url.as_deref().unwrap_or_default().trim(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn hit(title: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            snippet: None,
            direct_url: None,
            source_url: None,
            url: None,
        }
    }

    #[test]
    fn prefers_direct_url_over_other_fields() {
        let mut result = hit("A");
        result.direct_url = Some("https://direct".into());
        result.source_url = Some("https://source".into());
        result.url = Some("https://url".into());
        assert_eq!(normalize_search_result(&result).unwrap().source_url, "https://direct");
    }

    #[test]
    fn skips_blank_candidates() {
        let mut result = hit("A");
        result.direct_url = Some("  ".into());
        result.source_url = Some(String::new());
        result.url = Some("https://url".into());
        assert_eq!(normalize_search_result(&result).unwrap().source_url, "https://url");
    }

    #[test]
    fn missing_links_degrade_to_empty_string() {
        let item = normalize_search_result(&hit("A")).unwrap();
        assert_eq!(item.source_url, "");
        assert_eq!(item.excerpt, "");
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(normalize_search_result(&hit("   ")).is_err());
    }

    #[test]
    fn results_are_capped_at_max_items() {
        let results: Vec<_> = (0..7)
            .map(|i| json!({ "title": format!("Item {i}") }))
            .collect();
        let items = normalize_search_results(&results, 5).unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[4].headline, "Item 4");
    }

    #[test]
    fn malformed_result_past_the_cap_is_ignored() {
        let results = vec![
            json!({ "title": "A", "url": "https://a" }),
            json!({ "title": "B" }),
            json!({ "snippet": "no title" }),
        ];
        let items = normalize_search_results(&results, 2).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].headline, "B");
    }

    #[test]
    fn malformed_result_within_the_cap_is_rejected() {
        let results = vec![json!({ "title": "A" }), json!({ "snippet": "no title" })];
        let err = normalize_search_results(&results, 2).unwrap_err();
        assert!(err.starts_with("search result 1:"), "{err}");
    }

    #[test]
    fn strip_code_fence_handles_language_tag() {
        let fenced = "```json\n[{\"headline\":\"A\"}]\n```";
        assert_eq!(strip_code_fence(fenced), "[{\"headline\":\"A\"}]");
    }

    #[test]
    fn strip_code_fence_leaves_plain_json() {
        assert_eq!(strip_code_fence("  [] "), "[]");
    }

    #[test]
    fn chat_items_with_blank_headline_are_rejected() {
        let items = vec![json!({ "headline": " ", "excerpt": "x", "source_url": "y" })];
        assert!(normalize_chat_items(&items, 5).is_err());
    }

    #[test]
    fn chat_items_with_null_fields_degrade_to_empty_strings() {
        let items = vec![json!({ "headline": "Breach X", "excerpt": null, "source_url": null })];
        let normalized = normalize_chat_items(&items, 5).unwrap();
        assert_eq!(normalized, vec![NewsItem::new("Breach X", "", "")]);
    }

    #[test]
    fn chat_items_past_the_cap_are_not_decoded() {
        let items = vec![json!({ "headline": "A" }), json!(42)];
        assert_eq!(normalize_chat_items(&items, 1).unwrap().len(), 1);
    }
}
