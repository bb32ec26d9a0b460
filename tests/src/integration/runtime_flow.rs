//! # Assembled Runtime Flow
//!
//! The whole subsystem as `main` wires it: real loops on real tasks,
//! one shared in-memory store, commands arriving through the runtime's
//! service handle. Webhook endpoints are deliberately absent so the
//! dispatcher idles; delivery itself is covered in `webhook_flow`.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{Duration as Mins, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use gov_runtime::{GovernanceRuntime, RuntimeConfig};
    use shared_store::{InMemoryGovernanceStore, ProposalStore};
    use shared_types::{
        event_types, AuditAction, Proposal, ProposalOption, ProposalStatus, ShareBalance,
    };

    fn fast_config() -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.lifecycle.poll_interval = Duration::from_millis(50);
        config.audit.batch_size = 1;
        config
    }

    fn seed_draft(store: &InMemoryGovernanceStore, due: bool) -> Uuid {
        let organization_id = Uuid::new_v4();
        store.add_balance(ShareBalance {
            user_id: Uuid::new_v4(),
            organization_id,
            share_class_id: Uuid::new_v4(),
            quantity: Decimal::from(400),
            voting_weight: Decimal::ONE,
        });
        let now = Utc::now();
        let mut draft = Proposal::draft(organization_id, "Budget 2026", now);
        if due {
            draft.start_at = Some(now - Mins::minutes(1));
            draft.end_at = Some(now + Mins::minutes(30));
        }
        let id = draft.id;
        store.add_proposal(draft);
        store.add_option(ProposalOption::new(id, "Adopt", 0));
        id
    }

    /// A due draft is opened by the running scheduler, the open enqueues
    /// an outbound event, and the transition's audit record reaches the
    /// store through the live pipeline.
    #[tokio::test]
    async fn test_running_scheduler_opens_due_proposal() {
        let store = Arc::new(InMemoryGovernanceStore::new());
        let proposal_id = seed_draft(&store, true);

        let runtime =
            GovernanceRuntime::start(Arc::clone(&store), fast_config()).expect("startup failed");

        let mut status = ProposalStatus::Draft;
        for _ in 0..100 {
            status = store.get_proposal(proposal_id).await.unwrap().status;
            if status == ProposalStatus::Open {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(status, ProposalStatus::Open);

        let outbound = store.snapshot_outbound_events();
        assert_eq!(outbound.len(), 1);
        assert_eq!(outbound[0].event_type, event_types::PROPOSAL_OPENED);

        let mut audited = false;
        for _ in 0..100 {
            audited = store
                .snapshot_audit_events()
                .iter()
                .any(|e| e.action == AuditAction::StatusChanged);
            if audited {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(audited, "status change never reached the audit trail");

        tokio::time::timeout(Duration::from_secs(2), runtime.shutdown())
            .await
            .expect("shutdown did not complete");
    }

    /// Commands issued through the runtime's service handle land in the
    /// store and leave their audit trail via the live pipeline.
    #[tokio::test]
    async fn test_service_handle_commands_are_audited() {
        let store = Arc::new(InMemoryGovernanceStore::new());
        let proposal_id = seed_draft(&store, false);

        let runtime =
            GovernanceRuntime::start(Arc::clone(&store), fast_config()).expect("startup failed");

        let now = Utc::now();
        runtime
            .service()
            .schedule_proposal(
                proposal_id,
                now + Mins::minutes(60),
                now + Mins::minutes(120),
                Some("ops@acme.example"),
                now,
            )
            .await
            .expect("schedule rejected");

        let stored = store.get_proposal(proposal_id).await.unwrap();
        assert_eq!(stored.start_at, Some(now + Mins::minutes(60)));

        let mut audited = false;
        for _ in 0..100 {
            audited = store.snapshot_audit_events().iter().any(|e| {
                e.action == AuditAction::Updated
                    && e.actor.as_deref() == Some("ops@acme.example")
            });
            if audited {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(audited, "schedule command never reached the audit trail");

        tokio::time::timeout(Duration::from_secs(2), runtime.shutdown())
            .await
            .expect("shutdown did not complete");
    }
}
