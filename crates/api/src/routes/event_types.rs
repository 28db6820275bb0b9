//! Event type catalogue endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use relay_core::event_type::ScopeShape;
use relay_db::models::EventType;
use relay_engine::EventTypeCatalog;
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Request body for `POST /event-types`.
#[derive(Deserialize)]
pub struct RegisterEventType {
    pub name: String,
    /// Explicit scope shape; derived from the name hierarchy when omitted.
    #[serde(default)]
    pub shape: Option<ScopeShape>,
}

/// GET /event-types -- the full catalogue.
async fn list_event_types(State(state): State<AppState>) -> AppResult<Json<Vec<EventType>>> {
    Ok(Json(EventTypeCatalog::list(&state.pool).await?))
}

/// POST /event-types -- register a type (idempotent for identical shape).
async fn register_event_type(
    State(state): State<AppState>,
    Json(body): Json<RegisterEventType>,
) -> AppResult<(StatusCode, Json<EventType>)> {
    let event_type = match body.shape {
        Some(shape) => EventTypeCatalog::register_with_shape(&state.pool, &body.name, shape).await?,
        None => EventTypeCatalog::register(&state.pool, &body.name).await?,
    };
    Ok((StatusCode::CREATED, Json(event_type)))
}

/// GET /event-types/{name} -- one catalogue entry.
async fn get_event_type(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<EventType>> {
    Ok(Json(EventTypeCatalog::get(&state.pool, &name).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/event-types", get(list_event_types).post(register_event_type))
        .route("/event-types/{name}", get(get_event_type))
}
