//! # Retention Purge Flow
//!
//! A store aged past the retention window, purged in batches, with the
//! purge leaving its own summary in the trail it just trimmed.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{Duration as Days, Utc};
    use tokio::sync::watch;

    use gov_retention::{PurgeSchedule, RetentionConfig, RetentionPurger};
    use shared_store::InMemoryGovernanceStore;
    use shared_types::{AuditAction, AuditEvent};

    fn aged_event(days_old: i64, n: usize) -> AuditEvent {
        AuditEvent::new(
            AuditAction::Updated,
            "Proposal",
            format!("p-{n}"),
            Utc::now() - Days::days(days_old),
        )
    }

    fn purger(store: Arc<InMemoryGovernanceStore>) -> RetentionPurger<InMemoryGovernanceStore> {
        let config = RetentionConfig {
            retention_days: 90,
            batch_size: 1000,
            batch_delay: Duration::from_millis(1),
            ..RetentionConfig::default()
        };
        let schedule = PurgeSchedule::parse(&config.schedule).unwrap();
        RetentionPurger::new(store, config, schedule)
    }

    /// 1500 expired rows go in two passes of at most 1000; rows at or
    /// inside the boundary survive, and the purge logs itself.
    #[tokio::test]
    async fn test_purge_trims_in_batches_and_records_summary() {
        let store = Arc::new(InMemoryGovernanceStore::new());

        let mut seeded = Vec::with_capacity(1511);
        for n in 0..1500 {
            seeded.push(aged_event(100, n));
        }
        for n in 0..10 {
            seeded.push(aged_event(1, 1500 + n));
        }
        store.add_audit_events(seeded);

        let now = Utc::now();
        let cutoff = now - Days::days(90);
        // Exactly at the boundary: deletion is strictly older-than.
        store.add_audit_events(vec![AuditEvent::new(
            AuditAction::Updated,
            "Proposal",
            "p-boundary",
            cutoff,
        )]);

        let (_tx, shutdown) = watch::channel(false);
        let outcome = purger(Arc::clone(&store))
            .run_purge(now, &shutdown)
            .await
            .expect("purge failed");

        assert_eq!(outcome.deleted, 1500);
        assert_eq!(outcome.passes, 2);
        assert_eq!(outcome.cutoff, cutoff);

        // 10 fresh + 1 boundary survivor + the summary row.
        assert_eq!(store.audit_event_count(), 12);

        let summary = store
            .snapshot_audit_events()
            .into_iter()
            .find(|e| e.resource_id == "retention-purge")
            .expect("purge summary event");
        assert_eq!(summary.action, AuditAction::Deleted);
        assert_eq!(summary.resource_type, "AuditEvent");
        assert_eq!(summary.actor.as_deref(), Some("System"));
        assert_eq!(summary.details["deletedCount"], serde_json::json!(1500));
        assert_eq!(summary.details["cutoffDate"], serde_json::json!(cutoff));
        assert!(summary.details["durationSeconds"].is_number());
    }

    /// A purge that finds nothing still writes a summary, so the trail
    /// shows retention ran on its scheduled day.
    #[tokio::test]
    async fn test_empty_purge_still_leaves_a_summary() {
        let store = Arc::new(InMemoryGovernanceStore::new());
        store.add_audit_events(vec![aged_event(5, 0)]);

        let (_tx, shutdown) = watch::channel(false);
        let outcome = purger(Arc::clone(&store))
            .run_purge(Utc::now(), &shutdown)
            .await
            .expect("purge failed");

        assert_eq!(outcome.deleted, 0);
        assert_eq!(outcome.passes, 0);

        assert_eq!(store.audit_event_count(), 2);
        let summary = store
            .snapshot_audit_events()
            .into_iter()
            .find(|e| e.resource_id == "retention-purge")
            .expect("purge summary event");
        assert_eq!(summary.details["deletedCount"], serde_json::json!(0));
    }
}
