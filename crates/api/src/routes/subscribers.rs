//! Subscriber and subscription management endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use relay_core::scope::SubscriptionScope;
use relay_core::types::DbId;
use relay_db::models::{Subscriber, Subscription};
use relay_engine::SubscriptionRegistry;
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Request body for `POST /subscribers`, discriminated by `kind`.
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreateSubscriber {
    Webhook {
        name: String,
        url: String,
        secret: String,
        #[serde(default = "default_verify_tls")]
        verify_tls: bool,
    },
    Analytics {
        name: String,
        sink: String,
    },
}

fn default_verify_tls() -> bool {
    true
}

/// Request body for `POST /subscribers/{id}/subscriptions`.
#[derive(Deserialize)]
pub struct CreateSubscription {
    pub event_type: String,
    #[serde(default)]
    pub project_uuid: Option<String>,
    #[serde(default)]
    pub job_uuid: Option<String>,
}

/// POST /subscribers -- create a webhook or analytics subscriber.
async fn create_subscriber(
    State(state): State<AppState>,
    Json(body): Json<CreateSubscriber>,
) -> AppResult<(StatusCode, Json<Subscriber>)> {
    let subscriber = match body {
        CreateSubscriber::Webhook {
            name,
            url,
            secret,
            verify_tls,
        } => {
            SubscriptionRegistry::create_webhook_subscriber(
                &state.pool,
                &name,
                &url,
                &secret,
                verify_tls,
            )
            .await?
        }
        CreateSubscriber::Analytics { name, sink } => {
            SubscriptionRegistry::create_analytics_subscriber(&state.pool, &name, &sink).await?
        }
    };
    Ok((StatusCode::CREATED, Json(subscriber)))
}

/// GET /subscribers -- all subscribers.
async fn list_subscribers(State(state): State<AppState>) -> AppResult<Json<Vec<Subscriber>>> {
    Ok(Json(SubscriptionRegistry::list_subscribers(&state.pool).await?))
}

/// GET /subscribers/{id} -- one subscriber.
async fn get_subscriber(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Subscriber>> {
    Ok(Json(SubscriptionRegistry::get_subscriber(&state.pool, id).await?))
}

/// DELETE /subscribers/{id} -- remove a subscriber, its subscriptions, and
/// cancel its undispatched deliveries.
async fn delete_subscriber(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    SubscriptionRegistry::delete_subscriber(&state.pool, id, Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /subscribers/{id}/subscriptions -- subscribe to an event type.
async fn create_subscription(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<CreateSubscription>,
) -> AppResult<(StatusCode, Json<Subscription>)> {
    let scope = SubscriptionScope::from_columns(body.project_uuid, body.job_uuid)?;
    let subscription =
        SubscriptionRegistry::subscribe(&state.pool, id, &body.event_type, scope).await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

/// GET /subscribers/{id}/subscriptions -- a subscriber's subscriptions.
async fn list_subscriptions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Subscription>>> {
    Ok(Json(SubscriptionRegistry::list_subscriptions(&state.pool, id).await?))
}

/// GET /subscriptions/{id} -- one subscription.
async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Subscription>> {
    Ok(Json(SubscriptionRegistry::get_subscription(&state.pool, id).await?))
}

/// DELETE /subscriptions/{id} -- unsubscribe (idempotent).
async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    SubscriptionRegistry::unsubscribe(&state.pool, id, Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subscribers", get(list_subscribers).post(create_subscriber))
        .route(
            "/subscribers/{id}",
            get(get_subscriber).delete(delete_subscriber),
        )
        .route(
            "/subscribers/{id}/subscriptions",
            get(list_subscriptions).post(create_subscription),
        )
        .route(
            "/subscriptions/{id}",
            get(get_subscription).delete(delete_subscription),
        )
}
