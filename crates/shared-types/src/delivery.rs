//! # Outbound Delivery Records
//!
//! The durable work queue between the domain and the webhook dispatcher.
//! Domain operations insert `OutboundEvent` rows in `Pending` status; the
//! dispatcher polls them, delivers to matching `WebhookEndpoint`s, and
//! moves each row to a terminal status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type strings carried by `OutboundEvent::event_type` and matched
/// against `WebhookEndpoint::subscribed_events`. Matching is exact and
/// case-sensitive throughout.
pub mod event_types {
    /// A proposal moved from Draft to Open.
    pub const PROPOSAL_OPENED: &str = "ProposalOpened";
    /// A proposal moved from Open to Closed.
    pub const PROPOSAL_CLOSED: &str = "ProposalClosed";
    /// A proposal moved from Closed to Finalized.
    pub const PROPOSAL_FINALIZED: &str = "ProposalFinalized";
    /// A ballot was cast on an open proposal.
    pub const VOTE_CAST: &str = "VoteCast";
}

/// Delivery state of an outbound event.
///
/// `Delivered` and `Failed` are terminal. An event with no matching
/// endpoint stays `Pending` indefinitely with `attempt_count == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// Waiting for a dispatch attempt (or for an endpoint to match).
    Pending,
    /// Every matching endpoint acknowledged with a 2xx.
    Delivered,
    /// Retries are exhausted.
    Failed,
}

impl DeliveryStatus {
    /// Returns true once the dispatcher will never pick the event up again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Failed)
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeliveryStatus::Pending => "Pending",
            DeliveryStatus::Delivered => "Delivered",
            DeliveryStatus::Failed => "Failed",
        };
        write!(f, "{s}")
    }
}

/// A domain event queued for webhook delivery.
///
/// `payload` holds the exact JSON body that will be POSTed and signed.
/// It is serialized once at enqueue time and never re-serialized, so the
/// signature is always computed over the bytes the subscriber receives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundEvent {
    /// Unique identifier, sent as `X-Event-Id`.
    pub id: Uuid,
    /// Owning organization, sent as `X-Organization-Id`.
    pub organization_id: Uuid,
    /// One of the `event_types` constants, sent as `X-Event-Type`.
    pub event_type: String,
    /// Verbatim JSON body.
    pub payload: String,
    /// Delivery state.
    pub status: DeliveryStatus,
    /// Number of completed dispatch attempts.
    pub attempt_count: u32,
    /// When the last dispatch attempt finished.
    pub last_attempt_at: Option<DateTime<Utc>>,
    /// When the event was enqueued. The dispatcher drains oldest-first.
    pub created_at: DateTime<Utc>,
}

impl OutboundEvent {
    /// Enqueues a new pending event.
    #[must_use]
    pub fn pending(
        organization_id: Uuid,
        event_type: impl Into<String>,
        payload: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            event_type: event_type.into(),
            payload,
            status: DeliveryStatus::Pending,
            attempt_count: 0,
            last_attempt_at: None,
            created_at,
        }
    }
}

/// A subscriber URL registered by an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEndpoint {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning organization. Endpoints only ever receive events from their
    /// own organization.
    pub organization_id: Uuid,
    /// Target URL for signed POSTs.
    pub url: String,
    /// Shared secret keying the HMAC-SHA256 signature.
    pub secret: String,
    /// Comma-delimited list of subscribed event types, stored verbatim.
    pub subscribed_events: String,
    /// Inactive endpoints are skipped entirely.
    pub active: bool,
}

impl WebhookEndpoint {
    /// Returns true when this endpoint subscribes to `event_type`.
    ///
    /// Segments are split on commas and trimmed of surrounding whitespace;
    /// the comparison itself is exact and case-sensitive. An endpoint
    /// subscribed to `"proposalclosed"` will never receive
    /// `"ProposalClosed"` events; the mismatch is visible in the stored
    /// subscription string rather than papered over.
    #[must_use]
    pub fn subscribes_to(&self, event_type: &str) -> bool {
        self.subscribed_events
            .split(',')
            .map(str::trim)
            .any(|s| s == event_type)
    }
}
