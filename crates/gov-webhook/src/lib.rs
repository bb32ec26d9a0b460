//! # Webhook Delivery Dispatcher
//!
//! Drains the durable outbound queue and delivers each event to every
//! active endpoint of its organization that subscribes to the event type.
//!
//! ## Delivery contract
//!
//! - The body is the stored payload byte-for-byte; it is never
//!   re-serialized, so the `X-Webhook-Signature` header (HMAC-SHA256 of
//!   the body, keyed by the endpoint secret, lowercase hex) always
//!   verifies against what the subscriber received.
//! - Any 2xx within the delivery timeout is success; everything else
//!   counts as a failed attempt.
//! - An event with no matching endpoint is left untouched: still
//!   `Pending`, attempt count unchanged. Registering an endpoint later
//!   picks it up.
//! - A partial failure retries the whole event next tick, so endpoints
//!   that already succeeded receive the event again. Subscribers
//!   deduplicate on `X-Event-Id`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod dispatcher;
pub mod ports;
pub mod signature;

pub use adapters::HttpWebhookTransport;
pub use config::WebhookConfig;
pub use dispatcher::{DispatchStats, WebhookDispatcher};
pub use ports::{DeliveryError, DeliveryRequest, DeliveryStore, WebhookTransport};
pub use signature::sign_payload;
