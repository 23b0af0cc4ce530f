//! End-to-end digest runs against wiremock stand-ins for Perplexity and Slack.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use secnews_core::FetchMode;
use secnews_digest::{
    DeliveryError, DigestOptions, DigestPipeline, PipelineError, RunOutcome, SlackWebhook,
};
use secnews_perplexity::{PerplexityClient, PerplexityError};

struct Harness {
    perplexity: MockServer,
    slack: MockServer,
}

impl Harness {
    async fn start() -> Self {
        Self {
            perplexity: MockServer::start().await,
            slack: MockServer::start().await,
        }
    }

    fn pipeline(&self, options: DigestOptions) -> DigestPipeline {
        let perplexity =
            PerplexityClient::with_base_url("test-key", "sonar", Some(5), &self.perplexity.uri())
                .expect("perplexity client");
        let webhook = SlackWebhook::new(&format!("{}/hook", self.slack.uri()), Some(5))
            .expect("webhook client");
        DigestPipeline::new(perplexity, webhook, options)
    }

    async fn mount_search(&self, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&self.perplexity)
            .await;
    }

    async fn mount_summary(&self, content: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(content)))
            .mount(&self.perplexity)
            .await;
    }

    async fn mount_slack(&self, status: u16, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(status).set_body_string("ok"))
            .expect(expected_calls)
            .mount(&self.slack)
            .await;
    }

    /// The `text` field of the single message posted to Slack.
    async fn posted_text(&self) -> String {
        let requests = self
            .slack
            .received_requests()
            .await
            .expect("request recording enabled");
        assert_eq!(requests.len(), 1, "exactly one webhook call");
        let payload: serde_json::Value =
            serde_json::from_slice(&requests[0].body).expect("webhook body is JSON");
        payload["text"]
            .as_str()
            .expect("text field is a string")
            .to_owned()
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({ "choices": [ { "message": { "role": "assistant", "content": content } } ] })
}

fn options() -> DigestOptions {
    DigestOptions {
        max_items: 5,
        fetch_mode: FetchMode::Search,
        summarize: true,
        summary_concurrency: 1,
    }
}

#[tokio::test]
async fn run_posts_cleaned_and_summarized_digest() {
    let h = Harness::start().await;
    h.mount_search(json!({
        "results": [ { "title": "Breach X", "snippet": "<p>Details</p>[1]", "url": "https://a" } ]
    }))
    .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [ { "message": { "content": "Short summary." } } ]
        })))
        .mount(&h.perplexity)
        .await;
    h.mount_slack(200, 1).await;

    let outcome = h.pipeline(options()).run().await;
    assert!(matches!(outcome, RunOutcome::Posted { items: 1 }), "{outcome:?}");

    let text = h.posted_text().await;
    assert!(text.contains("Breach X"));
    assert!(text.contains("Short summary."));
    assert!(text.contains("https://a"));
    assert!(!text.contains("[1]"));
    assert!(!text.contains("<p>"));
}

#[tokio::test]
async fn summary_request_carries_cleaned_excerpt() {
    let h = Harness::start().await;
    h.mount_search(json!({
        "results": [ { "title": "Breach X", "snippet": "<p>Data leak [1]</p>", "url": "https://a" } ]
    }))
    .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Text: Data leak"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Short summary.")))
        .expect(1)
        .mount(&h.perplexity)
        .await;
    h.mount_slack(200, 1).await;

    let outcome = h.pipeline(options()).run().await;
    assert!(matches!(outcome, RunOutcome::Posted { .. }), "{outcome:?}");
}

#[tokio::test]
async fn webhook_failure_is_reported_not_raised() {
    let h = Harness::start().await;
    h.mount_search(json!({
        "results": [ { "title": "Breach X", "snippet": "Leak", "url": "https://a" } ]
    }))
    .await;
    h.mount_summary("Short summary.").await;
    h.mount_slack(500, 1).await;

    let outcome = h.pipeline(options()).run().await;
    assert!(outcome.is_failure());
    assert!(
        matches!(
            outcome,
            RunOutcome::Failed(PipelineError::Delivery(DeliveryError::Status {
                status: 500,
                ..
            }))
        ),
        "{outcome:?}"
    );
}

#[tokio::test]
async fn empty_results_skip_the_webhook() {
    let h = Harness::start().await;
    h.mount_search(json!({ "results": [] })).await;
    h.mount_slack(200, 0).await;

    let outcome = h.pipeline(options()).run().await;
    assert!(matches!(outcome, RunOutcome::NoNews), "{outcome:?}");
}

#[tokio::test]
async fn upstream_fetch_error_fails_without_posting() {
    let h = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&h.perplexity)
        .await;
    h.mount_slack(200, 0).await;

    let outcome = h.pipeline(options()).run().await;
    assert!(
        matches!(
            outcome,
            RunOutcome::Failed(PipelineError::Fetch(PerplexityError::Upstream {
                status: 401,
                ..
            }))
        ),
        "{outcome:?}"
    );
}

#[tokio::test]
async fn malformed_search_body_fails_with_parse_error() {
    let h = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&h.perplexity)
        .await;
    h.mount_slack(200, 0).await;

    let outcome = h.pipeline(options()).run().await;
    assert!(
        matches!(
            outcome,
            RunOutcome::Failed(PipelineError::Fetch(PerplexityError::Parse { .. }))
        ),
        "{outcome:?}"
    );
}

#[tokio::test]
async fn malformed_summary_falls_back_to_cleaned_excerpt() {
    let h = Harness::start().await;
    h.mount_search(json!({
        "results": [ { "title": "Breach X", "snippet": "<b>Details</b> [2]", "url": "https://a" } ]
    }))
    .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "x" })))
        .mount(&h.perplexity)
        .await;
    h.mount_slack(200, 1).await;

    let outcome = h.pipeline(options()).run().await;
    assert!(matches!(outcome, RunOutcome::Posted { items: 1 }), "{outcome:?}");
    assert_eq!(h.posted_text().await, "*Breach X*\nDetails\n<https://a|Weiterlesen>");
}

#[tokio::test]
async fn summarizer_outage_falls_back_to_cleaned_excerpt() {
    let h = Harness::start().await;
    h.mount_search(json!({
        "results": [ { "title": "Breach X", "snippet": "Details", "url": "https://a" } ]
    }))
    .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&h.perplexity)
        .await;
    h.mount_slack(200, 1).await;

    let outcome = h.pipeline(options()).run().await;
    assert!(matches!(outcome, RunOutcome::Posted { items: 1 }), "{outcome:?}");
    assert!(h.posted_text().await.contains("Details"));
}

#[tokio::test]
async fn summarize_disabled_posts_excerpts_without_model_calls() {
    let h = Harness::start().await;
    h.mount_search(json!({
        "results": [ { "title": "Breach X", "snippet": "<p>Data leak [1]</p>", "url": "https://a" } ]
    }))
    .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("unused")))
        .expect(0)
        .mount(&h.perplexity)
        .await;
    h.mount_slack(200, 1).await;

    let pipeline = h.pipeline(DigestOptions {
        summarize: false,
        ..options()
    });
    let outcome = pipeline.run().await;
    assert!(matches!(outcome, RunOutcome::Posted { items: 1 }), "{outcome:?}");
    assert_eq!(h.posted_text().await, "*Breach X*\nData leak\n<https://a|Weiterlesen>");
}

#[tokio::test]
async fn concurrent_summaries_keep_upstream_order() {
    let h = Harness::start().await;
    h.mount_search(json!({
        "results": [
            { "title": "Meldung A", "snippet": "a", "url": "https://a" },
            { "title": "Meldung B", "snippet": "b", "url": "https://b" },
            { "title": "Meldung C", "snippet": "c", "url": "https://c" }
        ]
    }))
    .await;
    // The first summary answers last.
    for (headline, delay_ms) in [("Meldung A", 300), ("Meldung B", 0), ("Meldung C", 100)] {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains(format!("Titel: {headline}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion(&format!("Zusammenfassung {headline}.")))
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .mount(&h.perplexity)
            .await;
    }
    h.mount_slack(200, 1).await;

    let pipeline = h.pipeline(DigestOptions {
        summary_concurrency: 3,
        ..options()
    });
    let outcome = pipeline.run().await;
    assert!(matches!(outcome, RunOutcome::Posted { items: 3 }), "{outcome:?}");

    let text = h.posted_text().await;
    let a = text.find("Meldung A").expect("A present");
    let b = text.find("Meldung B").expect("B present");
    let c = text.find("Meldung C").expect("C present");
    assert!(a < b && b < c, "blocks out of order:\n{text}");
    assert!(text.contains("Zusammenfassung Meldung B."));
}

#[tokio::test]
async fn compose_renders_without_posting() {
    let h = Harness::start().await;
    h.mount_search(json!({
        "results": [ { "title": "Breach X", "snippet": "Leak", "direct_url": "https://direct" } ]
    }))
    .await;
    h.mount_summary("Short summary.").await;
    h.mount_slack(200, 0).await;

    let digest = h
        .pipeline(options())
        .compose()
        .await
        .expect("compose succeeds")
        .expect("news present");
    assert_eq!(digest.items, 1);
    assert_eq!(
        digest.message,
        "*Breach X*\nShort summary.\n<https://direct|Weiterlesen>"
    );
}

#[tokio::test]
async fn chat_mode_fetches_from_completion_endpoint() {
    let h = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("\"max_tokens\":1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"[{"headline":"Chat Meldung","excerpt":"Inhalt","source_url":"https://c"}]"#,
        )))
        .expect(1)
        .mount(&h.perplexity)
        .await;
    h.mount_slack(200, 1).await;

    let pipeline = h.pipeline(DigestOptions {
        fetch_mode: FetchMode::Chat,
        summarize: false,
        ..options()
    });
    let outcome = pipeline.run().await;
    assert!(matches!(outcome, RunOutcome::Posted { items: 1 }), "{outcome:?}");
    assert_eq!(h.posted_text().await, "*Chat Meldung*\nInhalt\n<https://c|Weiterlesen>");
}
