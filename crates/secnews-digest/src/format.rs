//! Slack mrkdwn rendering of the digest message.

use secnews_core::{NewsItem, SummarizedItem};

/// Localized label for the source link.
pub const LINK_LABEL: &str = "Weiterlesen";

/// Anything that can be rendered as one digest block.
pub trait DigestEntry {
    fn headline(&self) -> &str;
    /// Body text shown under the headline.
    fn body(&self) -> &str;
    fn source_url(&self) -> &str;
}

impl DigestEntry for SummarizedItem {
    fn headline(&self) -> &str {
        &self.headline
    }

    fn body(&self) -> &str {
        &self.summary
    }

    fn source_url(&self) -> &str {
        &self.source_url
    }
}

impl DigestEntry for NewsItem {
    fn headline(&self) -> &str {
        &self.headline
    }

    fn body(&self) -> &str {
        &self.excerpt
    }

    fn source_url(&self) -> &str {
        &self.source_url
    }
}

/// Escapes the three characters Slack treats as control sequences.
fn escape_mrkdwn(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escapes `text` for use inside `*…*`.
///
/// mrkdwn has no escape for `*`, so literal asterisks become U+2217 (∗) and
/// cannot close the bold span early.
fn bold_text(text: &str) -> String {
    escape_mrkdwn(text).replace('*', "\u{2217}")
}

fn render_block<E: DigestEntry>(entry: &E) -> String {
    let mut lines = vec![format!("*{}*", bold_text(entry.headline().trim()))];

    let body = entry.body().trim();
    if !body.is_empty() {
        lines.push(escape_mrkdwn(body));
    }

    let url = entry.source_url().trim();
    if !url.is_empty() {
        lines.push(format!("<{url}|{LINK_LABEL}>"));
    }

    lines.join("\n")
}

/// Renders all entries into one message, blocks separated by a blank line.
///
/// Each block is the bold headline, the body, and a `<url|Weiterlesen>` link.
/// The body line is omitted when empty and the link line when the entry has
/// no URL. An empty slice renders as an empty string.
#[must_use]
pub fn format_digest<E: DigestEntry>(entries: &[E]) -> String {
    entries
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n\n")
}
