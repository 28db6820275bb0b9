//! Pure subscription matching.
//!
//! Given a stored event and a snapshot of candidate subscriptions, compute
//! the exact set whose type and scope match. The matcher holds no state and
//! never consults delivery history, so the result is deterministic for a
//! given (event, snapshot) pair.

use crate::scope::{EventScope, SubscriptionScope};
use crate::types::DbId;

/// Minimal subscription data needed by the matcher.
///
/// Mirrors the DB model but is defined here so the core crate stays
/// independent of the DB crate.
#[derive(Debug, Clone)]
pub struct SubscriptionCandidate {
    pub id: DbId,
    pub subscriber_id: DbId,
    pub event_type: String,
    pub scope: SubscriptionScope,
}

/// Return the candidates that match the event, in input order.
///
/// Matching rules, in order:
/// 1. The subscription's type name must equal the event's type.
/// 2. An unscoped subscription matches unconditionally.
/// 3. A project-scoped subscription requires an equal `project_uuid`.
/// 4. A project+job-scoped subscription requires both `project_uuid` and
///    `job_uuid` to be equal.
///
/// Exact equality only; no partial or fuzzy matching.
pub fn matching_subscriptions<'a>(
    event_type: &str,
    event_scope: &EventScope,
    candidates: &'a [SubscriptionCandidate],
) -> Vec<&'a SubscriptionCandidate> {
    candidates
        .iter()
        .filter(|candidate| {
            candidate.event_type == event_type && scope_matches(&candidate.scope, event_scope)
        })
        .collect()
}

fn scope_matches(scope: &SubscriptionScope, event_scope: &EventScope) -> bool {
    match scope {
        SubscriptionScope::Unscoped => true,
        SubscriptionScope::Project { project_uuid } => {
            event_scope.project_uuid.as_deref() == Some(project_uuid.as_str())
        }
        SubscriptionScope::ProjectJob {
            project_uuid,
            job_uuid,
        } => {
            event_scope.project_uuid.as_deref() == Some(project_uuid.as_str())
                && event_scope.job_uuid.as_deref() == Some(job_uuid.as_str())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
