//! The relay endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::error::RelayError;
use crate::pipeline;
use crate::state::AppState;

/// Accept one deployment event and run it through the pipeline.
///
/// Takes the raw header map and body rather than a `Json` extractor so the
/// authorize stage runs before any parsing and the error bodies stay under
/// the pipeline's control.
pub async fn relay_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, RelayError> {
    pipeline::process(&state, &headers, &body).await?;
    Ok(StatusCode::OK)
}
