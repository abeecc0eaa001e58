//! HTTP route definitions.

mod events;
mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the relay router.
///
/// # Route Structure
///
/// - `POST /` - The relay endpoint. Requires the `octolog-token` header;
///   authorization happens inside the pipeline so the response bodies stay
///   exactly as the upstream tool expects.
/// - `GET /health` - Health check for load balancer probes (no auth).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(events::relay_event))
        .route("/health", get(health::health_check))
        .with_state(state)
}
