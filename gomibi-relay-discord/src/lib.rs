//! Relay implementation posting notifications to a Discord webhook.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use gomibi_core::{
    config::WebhookTarget,
    ports::{Delivery, RelayError, RelayPort},
};

/// Body of a webhook execution. Discord renders `content` as the message text.
#[derive(Debug, Serialize)]
struct WebhookPayload<'msg> {
    content: &'msg str,
}

/// Relay posting to a single Discord webhook.
pub struct DiscordRelay {
    client: Client,
    target: WebhookTarget,
}

impl DiscordRelay {
    /// Create a relay bound to the given HTTP client and webhook.
    #[must_use]
    pub fn new(client: Client, target: WebhookTarget) -> Self {
        Self { client, target }
    }
}

#[async_trait]
impl RelayPort for DiscordRelay {
    fn name(&self) -> &str {
        "discord"
    }

    async fn send(&self, message: &str) -> Result<Delivery, RelayError> {
        let endpoint = match &self.target {
            WebhookTarget::Unconfigured => return Ok(Delivery::NotConfigured),
            WebhookTarget::Invalid(raw) => return Err(RelayError::InvalidEndpoint(raw.clone())),
            WebhookTarget::Endpoint(url) => url.clone(),
        };

        let response = self
            .client
            .post(endpoint)
            .json(&WebhookPayload { content: message })
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "discord accepted message");
            return Ok(Delivery::Sent {
                status: status.as_u16(),
            });
        }

        // Discord's error JSON, if any.
        let body = response.text().await.unwrap_or_default();
        Err(RelayError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Build the relay as a trait object for the service.
#[must_use]
pub fn relay(client: Client, target: WebhookTarget) -> Arc<dyn RelayPort> {
    Arc::new(DiscordRelay::new(client, target))
}
