//! Event and subscription scoping.
//!
//! An [`EventScope`] is the set of platform identifiers attached to a stored
//! event; a [`SubscriptionScope`] narrows which events a subscription
//! receives. Both are validated against the event type's declared
//! [`ScopeShape`](crate::event_type::ScopeShape).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::event_type::ScopeShape;

// ---------------------------------------------------------------------------
// EventScope
// ---------------------------------------------------------------------------

/// Scoping attributes carried by an event.
///
/// The identifiers are opaque UUID strings owned by the wider platform;
/// which of them are present depends on the event type's shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventScope {
    pub project_uuid: Option<String>,
    pub pipeline_uuid: Option<String>,
    pub job_uuid: Option<String>,
    pub run_uuid: Option<String>,
    pub build_uuid: Option<String>,
    pub environment_uuid: Option<String>,
}

impl EventScope {
    /// Validate this scope against a type's declared shape.
    ///
    /// Every attribute the shape carries is required; every attribute it
    /// does not carry must be absent.
    pub fn validate_against(&self, shape: &ScopeShape) -> Result<(), CoreError> {
        let checks = [
            ("project_uuid", shape.project, self.project_uuid.is_some()),
            ("pipeline_uuid", shape.pipeline, self.pipeline_uuid.is_some()),
            ("job_uuid", shape.job, self.job_uuid.is_some()),
            ("run_uuid", shape.run, self.run_uuid.is_some()),
            ("build_uuid", shape.build, self.build_uuid.is_some()),
            (
                "environment_uuid",
                shape.environment,
                self.environment_uuid.is_some(),
            ),
        ];
        for (attr, declared, present) in checks {
            if declared && !present {
                return Err(CoreError::ScopeMismatch(format!(
                    "event type requires '{attr}' but it was not supplied"
                )));
            }
            if !declared && present {
                return Err(CoreError::ScopeMismatch(format!(
                    "event type does not carry '{attr}' but it was supplied"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SubscriptionScope
// ---------------------------------------------------------------------------

/// The scope filter of a subscription.
///
/// Specificity must be a subset of the attributes the subscribed event type
/// carries: a type with no job attribute cannot have a project+job-scoped
/// subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum SubscriptionScope {
    /// All events of the subscribed type.
    Unscoped,
    /// Events whose project matches.
    Project { project_uuid: String },
    /// Events whose project and job both match.
    ProjectJob {
        project_uuid: String,
        job_uuid: String,
    },
}

impl SubscriptionScope {
    /// Reassemble from the nullable columns a subscription row stores.
    pub fn from_columns(
        project_uuid: Option<String>,
        job_uuid: Option<String>,
    ) -> Result<Self, CoreError> {
        match (project_uuid, job_uuid) {
            (None, None) => Ok(Self::Unscoped),
            (Some(project_uuid), None) => Ok(Self::Project { project_uuid }),
            (Some(project_uuid), Some(job_uuid)) => Ok(Self::ProjectJob {
                project_uuid,
                job_uuid,
            }),
            (None, Some(_)) => Err(CoreError::Validation(
                "A job-scoped subscription must also carry a project".to_string(),
            )),
        }
    }

    /// Split back into the nullable columns a subscription row stores.
    pub fn into_columns(self) -> (Option<String>, Option<String>) {
        match self {
            Self::Unscoped => (None, None),
            Self::Project { project_uuid } => (Some(project_uuid), None),
            Self::ProjectJob {
                project_uuid,
                job_uuid,
            } => (Some(project_uuid), Some(job_uuid)),
        }
    }

    /// Validate that this scope's specificity is permitted by the type's shape.
    pub fn validate_against(&self, shape: &ScopeShape) -> Result<(), CoreError> {
        match self {
            Self::Unscoped => Ok(()),
            Self::Project { .. } => {
                if !shape.project {
                    return Err(CoreError::ScopeMismatch(
                        "event type carries no project attribute; a project-scoped \
                         subscription is not possible"
                            .to_string(),
                    ));
                }
                Ok(())
            }
            Self::ProjectJob { .. } => {
                if !shape.project || !shape.job {
                    return Err(CoreError::ScopeMismatch(
                        "event type carries no project+job attributes; a project+job-scoped \
                         subscription is not possible"
                            .to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
