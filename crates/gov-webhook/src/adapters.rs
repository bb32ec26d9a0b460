//! HTTP transport over `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use crate::ports::{
    DeliveryError, DeliveryRequest, WebhookTransport, EVENT_ID_HEADER, EVENT_TYPE_HEADER,
    ORGANIZATION_HEADER, SIGNATURE_HEADER,
};

/// Delivers webhooks over HTTP(S) with a shared connection pool.
pub struct HttpWebhookTransport {
    client: reqwest::Client,
}

impl HttpWebhookTransport {
    /// Builds a transport whose requests time out after
    /// `delivery_timeout` end to end.
    pub fn new(delivery_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(delivery_timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookTransport for HttpWebhookTransport {
    async fn deliver(&self, request: &DeliveryRequest) -> Result<(), DeliveryError> {
        trace!(url = %request.url, event_id = %request.event_id, "posting webhook");
        let response = self
            .client
            .post(&request.url)
            .header("Content-Type", "application/json")
            .header(SIGNATURE_HEADER, &request.signature)
            .header(EVENT_TYPE_HEADER, &request.event_type)
            .header(EVENT_ID_HEADER, request.event_id.to_string())
            .header(ORGANIZATION_HEADER, request.organization_id.to_string())
            // Verbatim stored payload; the signature was computed over
            // exactly these bytes.
            .body(request.body.clone())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Status {
                status: status.as_u16(),
            })
        }
    }
}

fn classify(error: reqwest::Error) -> DeliveryError {
    if error.is_timeout() {
        DeliveryError::Timeout
    } else {
        DeliveryError::Connect(error.to_string())
    }
}
