//! Event recording and query endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use relay_core::error::CoreError;
use relay_core::scope::EventScope;
use relay_core::types::DbId;
use relay_db::models::{Delivery, Event};
use relay_db::repositories::DeliveryRepo;
use relay_engine::EventIngest;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::state::AppState;

/// Request body for `POST /events`.
#[derive(Deserialize)]
pub struct RecordEvent {
    /// Registered event type name.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Scoping identifiers; must match the type's declared shape.
    #[serde(default)]
    pub scope: EventScope,
    /// Free-form payload forwarded to subscribers.
    #[serde(default = "default_payload")]
    pub payload: serde_json::Value,
}

fn default_payload() -> serde_json::Value {
    serde_json::json!({})
}

/// Response for `POST /events`: the stored event plus the deliveries fanned
/// out for it.
#[derive(Serialize)]
pub struct RecordedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub delivery_ids: Vec<DbId>,
}

/// Pagination query parameters.
#[derive(Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// POST /events -- record an event and fan out deliveries.
async fn record_event(
    State(state): State<AppState>,
    Json(body): Json<RecordEvent>,
) -> AppResult<(StatusCode, Json<RecordedEvent>)> {
    let (event, deliveries) = EventIngest::record(
        &state.pool,
        &body.event_type,
        &body.scope,
        &body.payload,
        state.config.engine_max_attempts,
        Utc::now(),
    )
    .await?;
    let delivery_ids = deliveries.iter().map(|d| d.id).collect();
    Ok((
        StatusCode::CREATED,
        Json(RecordedEvent { event, delivery_ids }),
    ))
}

/// GET /events -- recent events, newest first.
async fn list_events(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(
        EventIngest::list(&state.pool, page.limit, page.offset).await?,
    ))
}

/// GET /events/{id} -- one stored event.
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Event>> {
    Ok(Json(EventIngest::get(&state.pool, id).await?))
}

/// GET /events/{id}/deliveries -- the deliveries fanned out for one event.
async fn list_event_deliveries(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Delivery>>> {
    Ok(Json(EventIngest::deliveries(&state.pool, id).await?))
}

/// GET /events/{id}/deliveries/{subscription_id} -- delivery status for one
/// (event, subscription) pair.
async fn get_event_delivery(
    State(state): State<AppState>,
    Path((id, subscription_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Delivery>> {
    let delivery = DeliveryRepo::find_by_event_and_subscription(&state.pool, id, subscription_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Delivery",
            id,
        })?;
    Ok(Json(delivery))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(record_event))
        .route("/events/{id}", get(get_event))
        .route("/events/{id}/deliveries", get(list_event_deliveries))
        .route(
            "/events/{id}/deliveries/{subscription_id}",
            get(get_event_delivery),
        )
}
