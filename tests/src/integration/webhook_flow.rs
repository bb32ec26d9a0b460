//! # Webhook Delivery Flow
//!
//! Events produced by the real command layer, dispatched by the real
//! dispatcher, and checked exactly the way a subscriber's handler would:
//! recompute the HMAC over the received body with the shared secret and
//! compare against the hex digest from the signature header.

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;
    use hmac::{Hmac, Mac};
    use rust_decimal::Decimal;
    use serde_json::Value;
    use sha2::Sha256;
    use tokio::sync::watch;
    use uuid::Uuid;

    use gov_engine::{GovernanceService, NullAuditSink};
    use gov_webhook::{
        DeliveryError, DeliveryRequest, WebhookConfig, WebhookDispatcher, WebhookTransport,
    };
    use shared_store::{InMemoryGovernanceStore, OutboundEventStore};
    use shared_types::{
        event_types, DeliveryStatus, OutboundEvent, Proposal, ProposalOption, ShareBalance,
        WebhookEndpoint,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// Checks a delivery the way a subscriber's handler would.
    fn subscriber_accepts(secret: &str, body: &str, signature_hex: &str) -> bool {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(body.as_bytes());
        match hex::decode(signature_hex) {
            Ok(tag) => mac.verify_slice(&tag).is_ok(),
            Err(_) => false,
        }
    }

    /// Transport that captures every request and replays scripted
    /// failures per URL, succeeding once a script runs out.
    #[derive(Default)]
    struct CapturingTransport {
        outcomes: Mutex<HashMap<String, VecDeque<DeliveryError>>>,
        seen: Mutex<Vec<DeliveryRequest>>,
    }

    impl CapturingTransport {
        fn fail_next(&self, url: &str, errors: Vec<DeliveryError>) {
            self.outcomes
                .lock()
                .unwrap()
                .insert(url.to_string(), errors.into());
        }

        fn seen(&self) -> Vec<DeliveryRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WebhookTransport for CapturingTransport {
        async fn deliver(&self, request: &DeliveryRequest) -> Result<(), DeliveryError> {
            self.seen.lock().unwrap().push(request.clone());
            match self
                .outcomes
                .lock()
                .unwrap()
                .get_mut(&request.url)
                .and_then(VecDeque::pop_front)
            {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }
    }

    struct Fixture {
        store: Arc<InMemoryGovernanceStore>,
        service: Arc<GovernanceService<InMemoryGovernanceStore>>,
        transport: Arc<CapturingTransport>,
        dispatcher: WebhookDispatcher<InMemoryGovernanceStore>,
        organization_id: Uuid,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(InMemoryGovernanceStore::new());
            let service = Arc::new(GovernanceService::new(
                Arc::clone(&store),
                Arc::new(NullAuditSink),
            ));
            let transport = Arc::new(CapturingTransport::default());
            let dispatcher = WebhookDispatcher::new(
                Arc::clone(&store),
                transport.clone(),
                WebhookConfig::default(),
            );
            Self {
                store,
                service,
                transport,
                dispatcher,
                organization_id: Uuid::new_v4(),
            }
        }

        fn endpoint(&self, url: &str, secret: &str, subscribed: &str) {
            self.store.add_endpoint(WebhookEndpoint {
                id: Uuid::new_v4(),
                organization_id: self.organization_id,
                url: url.to_string(),
                secret: secret.to_string(),
                subscribed_events: subscribed.to_string(),
                active: true,
            });
        }

        /// Opens a fresh proposal through the command layer, producing a
        /// real `ProposalOpened` event in the outbound queue.
        async fn open_real_proposal(&self) -> Uuid {
            let now = Utc::now();
            self.store.add_balance(ShareBalance {
                user_id: Uuid::new_v4(),
                organization_id: self.organization_id,
                share_class_id: Uuid::new_v4(),
                quantity: Decimal::from(750),
                voting_weight: Decimal::ONE,
            });
            let proposal = Proposal::draft(self.organization_id, "Audit committee", now);
            let id = proposal.id;
            self.store.add_proposal(proposal);
            self.store.add_option(ProposalOption::new(id, "Yes", 0));
            self.service
                .open_proposal(id, Some("ops@acme.example"), now)
                .await
                .unwrap();
            id
        }

        async fn enqueue(&self, event_type: &str, payload: &str) -> OutboundEvent {
            let event = OutboundEvent::pending(
                self.organization_id,
                event_type,
                payload.to_string(),
                Utc::now(),
            );
            self.store.insert_event(&event).await.unwrap();
            event
        }

        async fn tick(&self) {
            let (_tx, shutdown) = watch::channel(false);
            self.dispatcher.tick(Utc::now(), &shutdown).await;
        }

        fn event(&self, id: Uuid) -> OutboundEvent {
            self.store
                .snapshot_outbound_events()
                .into_iter()
                .find(|e| e.id == id)
                .expect("event row")
        }
    }

    // =========================================================================
    // INTEGRATION TESTS: ENGINE EVENT → DISPATCHER → SUBSCRIBER
    // =========================================================================

    /// The signature on a delivered engine event verifies against the
    /// endpoint secret, binds the exact body, and the body is the same
    /// JSON the engine rendered at enqueue time.
    #[tokio::test]
    async fn test_subscriber_verifies_engine_produced_event() {
        let fx = Fixture::new();
        let secret = "whsec_a1b2c3d4";
        fx.endpoint("https://hooks.acme.example/gov", secret, "ProposalOpened");

        let proposal_id = fx.open_real_proposal().await;
        fx.tick().await;

        let seen = fx.transport.seen();
        assert_eq!(seen.len(), 1);
        let delivery = &seen[0];

        // Accepted exactly as a subscriber would accept it.
        assert!(subscriber_accepts(secret, &delivery.body, &delivery.signature));

        // Tampering with one byte of the body breaks verification, as
        // does checking against the wrong secret.
        let tampered = delivery.body.replacen("Audit", "Bogus", 1);
        assert!(!subscriber_accepts(secret, &tampered, &delivery.signature));
        assert!(!subscriber_accepts("wrong-secret", &delivery.body, &delivery.signature));

        // The body is the engine's own rendering of the proposal.
        let body: Value = serde_json::from_str(&delivery.body).unwrap();
        assert_eq!(body["proposalId"], serde_json::json!(proposal_id));
        assert_eq!(body["title"], "Audit committee");
        assert_eq!(body["eligibleVotingPower"], serde_json::json!("750"));
        assert_eq!(delivery.event_type, event_types::PROPOSAL_OPENED);
        assert_eq!(delivery.organization_id, fx.organization_id);
    }

    /// Three failed attempts exhaust the event; a fourth tick does not
    /// touch it again.
    #[tokio::test]
    async fn test_three_failures_exhaust_the_event() {
        let fx = Fixture::new();
        let url = "https://hooks.acme.example/flaky";
        fx.endpoint(url, "s", "VoteCast");
        fx.transport.fail_next(
            url,
            vec![
                DeliveryError::Status { status: 500 },
                DeliveryError::Timeout,
                DeliveryError::Connect("connection refused".to_string()),
            ],
        );
        let event = fx.enqueue(event_types::VOTE_CAST, r#"{"voteId":"v-1"}"#).await;

        for expected_attempts in 1..=2u32 {
            fx.tick().await;
            let row = fx.event(event.id);
            assert_eq!(row.status, DeliveryStatus::Pending);
            assert_eq!(row.attempt_count, expected_attempts);
        }

        fx.tick().await;
        let row = fx.event(event.id);
        assert_eq!(row.status, DeliveryStatus::Failed);
        assert_eq!(row.attempt_count, 3);

        fx.tick().await;
        assert_eq!(fx.transport.seen().len(), 3);
        assert_eq!(fx.event(event.id).attempt_count, 3);
    }

    /// One failing endpoint keeps the whole event pending; the retry
    /// re-delivers to the healthy endpoint too, under the same event id
    /// so the subscriber can deduplicate.
    #[tokio::test]
    async fn test_partial_failure_redelivers_under_same_event_id() {
        let fx = Fixture::new();
        let healthy = "https://hooks.acme.example/healthy";
        let flaky = "https://hooks.acme.example/flaky";
        fx.endpoint(healthy, "s1", "VoteCast");
        fx.endpoint(flaky, "s2", "VoteCast");
        fx.transport
            .fail_next(flaky, vec![DeliveryError::Status { status: 503 }]);
        let event = fx.enqueue(event_types::VOTE_CAST, r#"{"voteId":"v-2"}"#).await;

        fx.tick().await;
        assert_eq!(fx.event(event.id).status, DeliveryStatus::Pending);

        fx.tick().await;
        let row = fx.event(event.id);
        assert_eq!(row.status, DeliveryStatus::Delivered);
        assert_eq!(row.attempt_count, 2);

        let to_healthy: Vec<DeliveryRequest> = fx
            .transport
            .seen()
            .into_iter()
            .filter(|r| r.url == healthy)
            .collect();
        assert_eq!(to_healthy.len(), 2);
        assert_eq!(to_healthy[0].event_id, to_healthy[1].event_id);
    }

    /// Subscription matching never folds case: a lowercase subscription
    /// receives nothing and the event keeps waiting untouched.
    #[tokio::test]
    async fn test_lowercase_subscription_never_matches() {
        let fx = Fixture::new();
        fx.endpoint("https://hooks.acme.example/gov", "s", "proposalopened");

        fx.open_real_proposal().await;
        fx.tick().await;
        fx.tick().await;

        assert!(fx.transport.seen().is_empty());
        let rows = fx.store.snapshot_outbound_events();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, DeliveryStatus::Pending);
        assert_eq!(rows[0].attempt_count, 0);
        assert!(rows[0].last_attempt_at.is_none());
    }
}
