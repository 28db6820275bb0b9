pub mod deliveries;
pub mod event_types;
pub mod events;
pub mod health;
pub mod subscribers;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /event-types                              list, register (GET, POST)
/// /event-types/{name}                       get (GET)
///
/// /events                                   list, record (GET, POST)
/// /events/{id}                              get (GET)
/// /events/{id}/deliveries                   deliveries for one event (GET)
/// /events/{id}/deliveries/{subscription_id} one (event, subscription) status (GET)
///
/// /subscribers                              list, create (GET, POST)
/// /subscribers/{id}                         get, delete (GET, DELETE)
/// /subscribers/{id}/subscriptions           list, subscribe (GET, POST)
/// /subscriptions/{id}                       get, unsubscribe (GET, DELETE)
///
/// /deliveries                               filtered list (GET)
/// /deliveries/{id}                          get (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(event_types::router())
        .merge(events::router())
        .merge(subscribers::router())
        .merge(deliveries::router())
}
