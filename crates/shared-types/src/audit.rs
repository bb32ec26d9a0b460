//! # Audit Records
//!
//! Append-only audit trail entries. Rows are written by the audit
//! ingestion pipeline in batches and deleted only by the retention purger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Actor name recorded for actions taken by the platform itself
/// (scheduler transitions, retention purges).
pub const SYSTEM_ACTOR: &str = "System";

/// What kind of change an audit event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    /// A resource was created.
    Created,
    /// A resource was updated in place.
    Updated,
    /// A resource (or a set of rows) was deleted.
    Deleted,
    /// A proposal moved to a new lifecycle state.
    StatusChanged,
    /// A ballot was cast.
    VoteCast,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuditAction::Created => "Created",
            AuditAction::Updated => "Updated",
            AuditAction::Deleted => "Deleted",
            AuditAction::StatusChanged => "StatusChanged",
            AuditAction::VoteCast => "VoteCast",
        };
        write!(f, "{s}")
    }
}

/// Whether the recorded operation succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditOutcome {
    /// The operation completed.
    Success,
    /// The operation was rejected or failed.
    Failure,
}

/// One append-only audit trail entry.
///
/// `actor` is `None` when no principal is known, the literal `"System"`
/// for platform-initiated actions, and a user id string otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique identifier.
    pub id: Uuid,
    /// When the recorded operation happened.
    pub timestamp: DateTime<Utc>,
    /// Who performed the operation.
    pub actor: Option<String>,
    /// What kind of change this is.
    pub action: AuditAction,
    /// Resource type, e.g. `"Proposal"` or `"Vote"`.
    pub resource_type: String,
    /// Identifier of the affected resource.
    pub resource_id: String,
    /// Organization scope, when the resource has one.
    pub organization_id: Option<Uuid>,
    /// Whether the operation succeeded.
    pub outcome: AuditOutcome,
    /// Free-form structured context, serialized as-is.
    pub details: serde_json::Value,
}

impl AuditEvent {
    /// Creates a successful event with no actor, no organization, and
    /// empty details. Builder methods fill in the rest.
    #[must_use]
    pub fn new(
        action: AuditAction,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            actor: None,
            action,
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            organization_id: None,
            outcome: AuditOutcome::Success,
            details: serde_json::Value::Null,
        }
    }

    /// Sets the acting principal.
    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Sets the organization scope.
    #[must_use]
    pub fn with_organization(mut self, organization_id: Uuid) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    /// Attaches structured context.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Marks the recorded operation as failed.
    #[must_use]
    pub fn failed(mut self) -> Self {
        self.outcome = AuditOutcome::Failure;
        self
    }
}
