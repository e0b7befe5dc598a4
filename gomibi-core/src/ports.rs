//! Traits describing the outbound relay and its error type.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while relaying a notification.
pub enum RelayError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The endpoint answered with a non-success status.
    #[error("Webhook responded with status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },
    /// The configured endpoint is not a usable webhook URL.
    #[error("Invalid webhook endpoint: {0}")]
    InvalidEndpoint(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Result of a relay attempt that did not fail.
pub enum Delivery {
    /// The endpoint accepted the message.
    Sent {
        /// HTTP status code of the response.
        status: u16,
    },
    /// No endpoint is configured yet, nothing was sent.
    NotConfigured,
}

#[async_trait]
/// Trait for outbound chat relays.
pub trait RelayPort: Send + Sync {
    /// Short name of the relay used in logs.
    fn name(&self) -> &str;

    /// Post `message` to the relay endpoint.
    ///
    /// # Errors
    ///
    /// Returns a [`RelayError`] when the endpoint is invalid, unreachable, or
    /// rejects the message.
    async fn send(&self, message: &str) -> Result<Delivery, RelayError>;
}
