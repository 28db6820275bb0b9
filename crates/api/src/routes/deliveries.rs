//! Delivery audit and status endpoints.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use relay_core::error::CoreError;
use relay_core::types::DbId;
use relay_db::models::{Delivery, DeliveryStatus};
use relay_db::repositories::{DeliveryFilter, DeliveryRepo};
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Query parameters for `GET /deliveries`.
#[derive(Deserialize)]
pub struct DeliveryQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub subscriber_id: Option<DbId>,
    /// RFC 3339 timestamps bounding `created_at`.
    #[serde(default)]
    pub created_from: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub created_to: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /deliveries -- filtered listing, newest first.
async fn list_deliveries(
    State(state): State<AppState>,
    Query(query): Query<DeliveryQuery>,
) -> AppResult<Json<Vec<Delivery>>> {
    // Reject unknown status values up front instead of returning an empty list.
    if let Some(status) = &query.status {
        DeliveryStatus::parse(status)?;
    }
    let filter = DeliveryFilter {
        status: query.status,
        subscriber_id: query.subscriber_id,
        created_from: query.created_from,
        created_to: query.created_to,
    };
    Ok(Json(
        DeliveryRepo::list_filtered(&state.pool, &filter, query.limit, query.offset).await?,
    ))
}

/// GET /deliveries/{id} -- one delivery row.
async fn get_delivery(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Delivery>> {
    let delivery = DeliveryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Delivery",
            id,
        })?;
    Ok(Json(delivery))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/deliveries", get(list_deliveries))
        .route("/deliveries/{id}", get(get_delivery))
}
