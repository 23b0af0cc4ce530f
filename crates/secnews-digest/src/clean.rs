//! Plain-text cleanup for upstream excerpts.
//!
//! Excerpts come back from search with HTML entities, tags, WordPress
//! `[caption]` blocks, template placeholders and numbered citation markers.
//! [`clean_text`] removes all of them and never fails.

use std::sync::LazyLock;

use regex::Regex;

static CAPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\[caption\b[^\]]*\].*?\[/caption\]").expect("valid caption regex")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)</?[a-zA-Z!][^>]*>").expect("valid tag regex"));
static DOUBLE_BRACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{.*?\}\}|\{%.*?%\}").expect("valid template regex")
});
static SINGLE_BRACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}\n]*\}").expect("valid template regex"));
// Takes the whitespace before the marker too, so "Text [1]." becomes "Text.".
static CITATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\[\d+\]").expect("valid citation regex"));
static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("valid newline regex"));

/// Strips markup and citation noise from `raw`, returning plain text.
///
/// Steps, in order: decode HTML5 named and numeric entities, drop
/// `[caption]…[/caption]` blocks, drop HTML tags, drop `{{…}}` / `{%…%}` /
/// `{…}` template expressions, drop `[n]` citation markers with the
/// whitespace before them, collapse runs of blank lines to a single newline,
/// trim.
///
/// Text that is already clean comes back unchanged.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = html_escape::decode_html_entities(raw).replace("\r\n", "\n");
    let text = CAPTION_RE.replace_all(&text, "");
    let text = TAG_RE.replace_all(&text, "");
    let text = DOUBLE_BRACE_RE.replace_all(&text, "");
    let text = SINGLE_BRACE_RE.replace_all(&text, "");
    let text = CITATION_RE.replace_all(&text, "");
    let text = BLANK_LINES_RE.replace_all(&text, "\n");
    text.trim().to_string()
}
