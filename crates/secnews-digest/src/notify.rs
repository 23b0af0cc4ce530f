//! Slack incoming-webhook delivery.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::error::DeliveryError;

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Posts rendered messages to a Slack incoming webhook.
///
/// One attempt per call; there is no retry.
#[derive(Clone)]
pub struct SlackWebhook {
    client: Client,
    url: String,
}

impl std::fmt::Debug for SlackWebhook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackWebhook")
            .field("url", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl SlackWebhook {
    /// Creates a webhook client. `timeout_secs` of `None` leaves the request
    /// unbounded.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(url: &str, timeout_secs: Option<u64>) -> Result<Self, DeliveryError> {
        let mut builder = Client::builder().connect_timeout(Duration::from_secs(10));
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            url: url.to_owned(),
        })
    }

    /// Sends `{"text": message}` to the webhook.
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::Status`] when the webhook answers with anything but 200.
    /// - [`DeliveryError::Http`] on network failure.
    pub async fn post(&self, message: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { text: message })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(bytes = message.len(), "webhook accepted message");
        Ok(())
    }
}
