//! # Proposal Lifecycle Flow
//!
//! Drives a proposal through its whole life the way production does:
//! rows seeded in the store, the scheduler's tick performing the due
//! transitions through the same command layer an API host would call,
//! and the outbound queue accumulating one event per transition.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use tokio::sync::watch;
    use uuid::Uuid;

    use gov_engine::{GovernanceService, NullAuditSink};
    use gov_lifecycle::{LifecycleConfig, LifecycleScheduler};
    use shared_store::{InMemoryGovernanceStore, ProposalStore};
    use shared_types::{
        event_types, Organization, Proposal, ProposalOption, ProposalStatus, ShareBalance,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    struct Fixture {
        store: Arc<InMemoryGovernanceStore>,
        service: Arc<GovernanceService<InMemoryGovernanceStore>>,
        scheduler: LifecycleScheduler<InMemoryGovernanceStore>,
        organization_id: Uuid,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(InMemoryGovernanceStore::new());
            let organization_id = Uuid::new_v4();
            store.add_organization(Organization {
                id: organization_id,
                name: "Acme Holdings".to_string(),
                created_at: Utc::now(),
            });
            let service = Arc::new(GovernanceService::new(
                Arc::clone(&store),
                Arc::new(NullAuditSink),
            ));
            let scheduler = LifecycleScheduler::new(
                Arc::clone(&store),
                Arc::clone(&service),
                LifecycleConfig::default(),
            );
            Self {
                store,
                service,
                scheduler,
                organization_id,
            }
        }

        /// Registers a holder with `shares` ordinary shares (weight 1).
        fn holder(&self, shares: i64) -> Uuid {
            let user_id = Uuid::new_v4();
            self.store.add_balance(ShareBalance {
                user_id,
                organization_id: self.organization_id,
                share_class_id: Uuid::new_v4(),
                quantity: Decimal::from(shares),
                voting_weight: Decimal::ONE,
            });
            user_id
        }

        /// Seeds a draft with a voting window and two options, returning
        /// (proposal id, option A id, option B id).
        fn seed_scheduled_draft(
            &self,
            quorum: Decimal,
            start_offset_mins: i64,
            end_offset_mins: i64,
        ) -> (Uuid, Uuid, Uuid) {
            let now = Utc::now();
            let mut proposal = Proposal::draft(self.organization_id, "Board expansion", now);
            proposal.quorum_requirement = quorum;
            proposal.start_at = Some(now + Duration::minutes(start_offset_mins));
            proposal.end_at = Some(now + Duration::minutes(end_offset_mins));
            let id = proposal.id;
            self.store.add_proposal(proposal);

            let option_a = ProposalOption::new(id, "Approve", 0);
            let option_b = ProposalOption::new(id, "Reject", 1);
            let (a, b) = (option_a.id, option_b.id);
            self.store.add_option(option_a);
            self.store.add_option(option_b);
            (id, a, b)
        }

        async fn tick(&self, now: chrono::DateTime<Utc>) {
            let (_tx, shutdown) = watch::channel(false);
            self.scheduler.tick(now, &shutdown).await;
        }

        async fn proposal(&self, id: Uuid) -> Proposal {
            self.store.get_proposal(id).await.expect("proposal row")
        }

        fn event_types_in_order(&self) -> Vec<String> {
            self.store
                .snapshot_outbound_events()
                .into_iter()
                .map(|e| e.event_type)
                .collect()
        }
    }

    // =========================================================================
    // INTEGRATION TESTS: SCHEDULER + COMMAND LAYER + OUTBOUND QUEUE
    // =========================================================================

    /// A proposal scheduled in the past is opened by the tick, collects
    /// votes, is closed by a later tick with a full tally, and finalizes.
    #[tokio::test]
    async fn test_full_lifecycle_draft_to_finalized() {
        let fx = Fixture::new();
        let alice = fx.holder(600);
        let bob = fx.holder(300);
        let _carol = fx.holder(100); // abstains

        // Window opened two minutes ago, closes in ten.
        let (id, option_a, option_b) =
            fx.seed_scheduled_draft(Decimal::new(3, 1), -2, 10);

        let now = Utc::now();
        fx.tick(now).await;

        let opened = fx.proposal(id).await;
        assert_eq!(opened.status, ProposalStatus::Open);
        assert_eq!(opened.eligible_voting_power, Decimal::from(1000));

        fx.service.cast_vote(id, alice, option_a, now).await.unwrap();
        fx.service.cast_vote(id, bob, option_b, now).await.unwrap();

        // Next wakeup lands after the window ends.
        let later = now + Duration::minutes(11);
        fx.tick(later).await;

        let closed = fx.proposal(id).await;
        assert_eq!(closed.status, ProposalStatus::Closed);
        assert_eq!(closed.winning_option_id, Some(option_a));
        assert!(closed.quorum_met); // 900 of 1000 cast, quorum 0.3
        assert_eq!(closed.total_votes_cast, Decimal::from(900));
        assert_eq!(closed.closed_at, Some(later));
        // The snapshot taken at open is untouched by the close.
        assert_eq!(closed.eligible_voting_power, Decimal::from(1000));

        fx.service
            .finalize_proposal(id, Some("chair@acme.example"), later)
            .await
            .unwrap();
        let finalized = fx.proposal(id).await;
        assert_eq!(finalized.status, ProposalStatus::Finalized);

        assert_eq!(
            fx.event_types_in_order(),
            vec![
                event_types::PROPOSAL_OPENED,
                event_types::VOTE_CAST,
                event_types::VOTE_CAST,
                event_types::PROPOSAL_CLOSED,
                event_types::PROPOSAL_FINALIZED,
            ]
        );
    }

    /// Falling short of quorum still produces a winner; the flag records
    /// the shortfall instead of suppressing the tally.
    #[tokio::test]
    async fn test_quorum_shortfall_is_flagged_not_fatal() {
        let fx = Fixture::new();
        let alice = fx.holder(100);
        let _bob = fx.holder(900); // never votes

        let (id, option_a, _) = fx.seed_scheduled_draft(Decimal::new(5, 1), -2, 5);

        let now = Utc::now();
        fx.tick(now).await;
        fx.service.cast_vote(id, alice, option_a, now).await.unwrap();
        fx.tick(now + Duration::minutes(6)).await;

        let closed = fx.proposal(id).await;
        assert_eq!(closed.status, ProposalStatus::Closed);
        assert_eq!(closed.winning_option_id, Some(option_a));
        assert!(!closed.quorum_met); // 100 of 1000, quorum 0.5
        assert_eq!(closed.total_votes_cast, Decimal::from(100));
    }

    /// A draft whose whole window is already in the past opens and closes
    /// within a single tick, ending with an empty tally.
    #[tokio::test]
    async fn test_expired_window_opens_and_closes_in_one_tick() {
        let fx = Fixture::new();
        fx.holder(500);

        let (id, _, _) = fx.seed_scheduled_draft(Decimal::new(25, 2), -30, -5);

        fx.tick(Utc::now()).await;

        let closed = fx.proposal(id).await;
        assert_eq!(closed.status, ProposalStatus::Closed);
        assert_eq!(closed.winning_option_id, None);
        assert_eq!(closed.total_votes_cast, Decimal::ZERO);

        assert_eq!(
            fx.event_types_in_order(),
            vec![event_types::PROPOSAL_OPENED, event_types::PROPOSAL_CLOSED]
        );
    }

    /// Manual command-layer scheduling feeds the same loop: an operator
    /// schedules a draft, and once the window arrives the tick opens it.
    #[tokio::test]
    async fn test_manually_scheduled_draft_is_picked_up_when_due() {
        let fx = Fixture::new();
        fx.holder(250);

        let now = Utc::now();
        let mut draft = Proposal::draft(fx.organization_id, "Dividend policy", now);
        draft.quorum_requirement = Decimal::new(1, 1);
        let id = draft.id;
        fx.store.add_proposal(draft);
        fx.store
            .add_option(ProposalOption::new(id, "Adopt", 0));

        fx.service
            .schedule_proposal(
                id,
                now + Duration::minutes(5),
                now + Duration::minutes(65),
                Some("ops@acme.example"),
                now,
            )
            .await
            .unwrap();

        // Not due yet.
        fx.tick(now + Duration::minutes(1)).await;
        assert_eq!(fx.proposal(id).await.status, ProposalStatus::Draft);

        // Due now.
        fx.tick(now + Duration::minutes(6)).await;
        assert_eq!(fx.proposal(id).await.status, ProposalStatus::Open);
    }
}
