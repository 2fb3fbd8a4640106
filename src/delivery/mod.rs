//! Delivery-provider interfaces.
//!
//! The gateway hands rendered messages to a third-party provider and learns
//! about their fate through provider webhooks. Both sides are external
//! collaborators; this module only defines the contracts the queue worker
//! and webhook handler program against.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider rejected the message: {0}")]
    Rejected(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// A rendered message ready for handoff to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub to: String,

    /// Sender override; the provider's account default applies when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    pub subject: String,

    pub html: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Returned by the provider on accepted handoff; the webhook stream refers
/// back to `provider_reference`.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderReceipt {
    pub message_id: Uuid,
    pub provider_reference: String,
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, message: OutboundEmail) -> Result<ProviderReceipt, ProviderError>;
}

/// Delivery state of a queued message as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Queued,
    Sent,
    Delivered,
    Bounced,
    Complained,
    Failed,
}

/// Map a provider webhook event name onto a delivery status. Unknown
/// events return `None` and are ignored by the webhook handler.
pub fn status_from_webhook_event(event: &str) -> Option<DeliveryStatus> {
    match event {
        "processed" | "queued" => Some(DeliveryStatus::Queued),
        "send" | "sent" => Some(DeliveryStatus::Sent),
        "delivery" | "delivered" => Some(DeliveryStatus::Delivered),
        "bounce" | "bounced" | "blocked" => Some(DeliveryStatus::Bounced),
        "complaint" | "spamreport" => Some(DeliveryStatus::Complained),
        "dropped" | "failed" => Some(DeliveryStatus::Failed),
        _ => None,
    }
}
