//! Service-key authentication (§6): enforced only when the server has a
//! key configured, via the optional `x-service-key` header.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::RelayAxumError;
use crate::state::AppState;
use relay_core::RelayError;

pub async fn require_service_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, RelayAxumError> {
    if let Some(expected) = &state.config.service_api_key {
        let provided = headers
            .get("x-service-key")
            .and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            return Err(RelayError::not_authenticated("invalid or missing x-service-key").into());
        }
    }

    Ok(next.run(request).await)
}
