//! Query and prompt construction.
//!
//! All user-facing text sent upstream is German so that results and
//! synopses come back in the language of the target region.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::types::ChatMessage;

/// Preferred outlets, regional ones first.
pub const PREFERRED_SOURCES: &[&str] = &[
    "heise Security",
    "Golem",
    "BSI",
    "Security-Insider",
    "ComputerWeekly DE",
    "Krebs on Security",
    "BleepingComputer",
    "The Hacker News",
    "SecurityWeek",
];

pub const SUMMARY_TEMPERATURE: f32 = 0.2;
pub const SUMMARY_MAX_TOKENS: u32 = 300;
pub const CHAT_NEWS_TEMPERATURE: f32 = 0.7;
pub const CHAT_NEWS_MAX_TOKENS: u32 = 1000;

const SYSTEM_PROMPT: &str = "Du bist ein Assistent, der Cybersecurity-Nachrichten für \
     Unternehmen in der DACH-Region (Deutschland, Österreich, Schweiz) aufbereitet.";

const DATE_FORMAT: &str = "%d.%m.%Y";

fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Returns the `(start, end)` dates covering the two most recent business
/// days up to and including `today`.
///
/// On a Monday the window starts on the previous Friday; on a weekend it
/// spans Thursday and Friday.
#[must_use]
pub fn business_day_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let mut business_days =
        std::iter::successors(Some(today), |d| d.pred_opt()).filter(|d| is_business_day(*d));
    let end = business_days.next().unwrap_or(today);
    let start = business_days.next().unwrap_or(end);
    (start, end)
}

/// Builds the search query for news published in the business-day window
/// ending at `today`.
#[must_use]
pub fn build_search_query(today: NaiveDate) -> String {
    let (start, end) = business_day_window(today);
    format!(
        "Aktuelle Cybersecurity-Nachrichten vom {} bis {} mit Relevanz für Unternehmen \
         in Deutschland, Österreich und der Schweiz. Bevorzuge Quellen aus der DACH-Region \
         wie {}.",
        start.format(DATE_FORMAT),
        end.format(DATE_FORMAT),
        PREFERRED_SOURCES.join(", "),
    )
}

/// Messages asking a chat model to return the news as a bare JSON array.
#[must_use]
pub fn chat_news_messages(today: NaiveDate, max_items: usize) -> Vec<ChatMessage> {
    let prompt = format!(
        "{}\n\n\
         Antworte ausschließlich mit einem JSON-Array von Objekten, ohne weiteren Text \
         und ohne Markdown. Jedes Objekt enthält:\n\
         - headline (string)\n\
         - excerpt (string)\n\
         - source_url (string)\n\n\
         Beispiel:\n\
         [{{\"headline\": \"Titel der Meldung\", \"excerpt\": \"Kurzer Auszug\", \
         \"source_url\": \"https://link.zum/artikel\"}}]\n\n\
         Begrenze die Antwort auf {max_items} Einträge.",
        build_search_query(today),
    );
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)]
}

/// Messages asking for a 2–3 sentence German synopsis of one item.
#[must_use]
pub fn summary_messages(headline: &str, cleaned_excerpt: &str) -> Vec<ChatMessage> {
    let mut prompt = String::from(
        "Fasse die folgende Meldung in 2 bis 3 Sätzen auf Deutsch zusammen. \
         Nenne keine Quellen, verwende keine Quellenverweise wie [1] und keine \
         Markdown-Formatierung.\n\n",
    );
    prompt.push_str("Titel: ");
    prompt.push_str(headline);
    if !cleaned_excerpt.is_empty() {
        prompt.push_str("\n\nText: ");
        prompt.push_str(cleaned_excerpt);
    }
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)]
}
