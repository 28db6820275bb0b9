//! Event and event-type entity models.

use relay_core::event_type::ScopeShape;
use relay_core::scope::EventScope;
use relay_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `event_types` catalogue table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventType {
    pub id: DbId,
    pub name: String,
    pub scope_project: bool,
    pub scope_pipeline: bool,
    pub scope_job: bool,
    pub scope_run: bool,
    pub scope_build: bool,
    pub scope_environment: bool,
    pub created_at: Timestamp,
}

impl EventType {
    /// The declared scope shape of this type.
    pub fn shape(&self) -> ScopeShape {
        ScopeShape {
            project: self.scope_project,
            pipeline: self.scope_pipeline,
            job: self.scope_job,
            run: self.scope_run,
            build: self.scope_build,
            environment: self.scope_environment,
        }
    }
}

/// A row from the append-only `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub event_type_id: DbId,
    pub project_uuid: Option<String>,
    pub pipeline_uuid: Option<String>,
    pub job_uuid: Option<String>,
    pub run_uuid: Option<String>,
    pub build_uuid: Option<String>,
    pub environment_uuid: Option<String>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}

impl Event {
    /// The scoping attributes of this event as a core value.
    pub fn scope(&self) -> EventScope {
        EventScope {
            project_uuid: self.project_uuid.clone(),
            pipeline_uuid: self.pipeline_uuid.clone(),
            job_uuid: self.job_uuid.clone(),
            run_uuid: self.run_uuid.clone(),
            build_uuid: self.build_uuid.clone(),
            environment_uuid: self.environment_uuid.clone(),
        }
    }
}
