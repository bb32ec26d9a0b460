//! Delivery ports and the wire contract.

use async_trait::async_trait;
use shared_store::{OutboundEventStore, WebhookEndpointStore};
use thiserror::Error;
use uuid::Uuid;

/// Header carrying the lowercase hex HMAC-SHA256 of the body.
pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";
/// Header carrying the event type string.
pub const EVENT_TYPE_HEADER: &str = "X-Event-Type";
/// Header carrying the event id subscribers deduplicate on.
pub const EVENT_ID_HEADER: &str = "X-Event-Id";
/// Header carrying the owning organization id.
pub const ORGANIZATION_HEADER: &str = "X-Organization-Id";

/// Everything the dispatcher needs from persistence.
pub trait DeliveryStore: OutboundEventStore + WebhookEndpointStore + Send + Sync {}

impl<T> DeliveryStore for T where T: OutboundEventStore + WebhookEndpointStore + Send + Sync {}

/// One signed POST, fully prepared. The transport only moves bytes; all
/// signing and matching happened before this was built.
#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    /// Endpoint URL to POST to.
    pub url: String,
    /// Value for [`EVENT_TYPE_HEADER`].
    pub event_type: String,
    /// Value for [`EVENT_ID_HEADER`].
    pub event_id: Uuid,
    /// Value for [`ORGANIZATION_HEADER`].
    pub organization_id: Uuid,
    /// Stored payload, sent verbatim as the body.
    pub body: String,
    /// Value for [`SIGNATURE_HEADER`], computed over `body`.
    pub signature: String,
}

/// A delivery attempt that did not end in a 2xx.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The endpoint answered with a non-success status.
    #[error("endpoint answered {status}")]
    Status {
        /// HTTP status code received.
        status: u16,
    },

    /// No response within the delivery timeout.
    #[error("delivery timed out")]
    Timeout,

    /// The request never reached the endpoint.
    #[error("connection failed: {0}")]
    Connect(String),
}

/// Outbound port for moving a prepared request over the wire.
///
/// Production uses [`crate::HttpWebhookTransport`]; tests script outcomes
/// with an in-memory mock.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Delivers one request. `Ok` means the endpoint acknowledged with a
    /// 2xx within the timeout.
    async fn deliver(&self, request: &DeliveryRequest) -> Result<(), DeliveryError>;
}
