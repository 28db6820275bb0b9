//! Subscription entity model.

use relay_core::error::CoreError;
use relay_core::matcher::SubscriptionCandidate;
use relay_core::scope::SubscriptionScope;
use relay_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `subscriptions` table.
///
/// The nullable `project_uuid`/`job_uuid` columns encode the three scope
/// levels (unscoped, project, project+job).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub subscriber_id: DbId,
    pub event_type_id: DbId,
    pub project_uuid: Option<String>,
    pub job_uuid: Option<String>,
    pub created_at: Timestamp,
}

impl Subscription {
    /// The scope filter of this subscription as a core value.
    pub fn scope(&self) -> Result<SubscriptionScope, CoreError> {
        SubscriptionScope::from_columns(self.project_uuid.clone(), self.job_uuid.clone())
    }

    /// Convert into the matcher's input shape, given the type's name.
    pub fn as_candidate(&self, event_type: &str) -> Result<SubscriptionCandidate, CoreError> {
        Ok(SubscriptionCandidate {
            id: self.id,
            subscriber_id: self.subscriber_id,
            event_type: event_type.to_string(),
            scope: self.scope()?,
        })
    }
}
