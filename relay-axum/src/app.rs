use axum::http::{HeaderName, HeaderValue, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::require_service_key;
use crate::handlers::{audio, chat, embeddings, health, ocr};
use crate::state::AppState;

async fn ensure_request_id<B>(mut req: Request<B>, next: Next) -> Response {
    let header = HeaderName::from_static("x-request-id");
    let request_id = req
        .headers()
        .get(&header)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Ok(v) = HeaderValue::from_str(&request_id) {
        req.headers_mut().insert(header.clone(), v);
    }

    let mut res = next.run(req).await;
    if let Ok(v) = HeaderValue::from_str(&request_id) {
        res.headers_mut().insert(header, v);
    }
    res
}

/// Builds the complete router: chat/embeddings/audio/OCR endpoints behind
/// the optional service-key check, plus an unauthenticated health probe.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/chat", post(chat::handle))
        .route("/embeddings", post(embeddings::handle))
        .route("/audio", post(audio::handle))
        .route("/image/ocr", post(ocr::handle))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_service_key));

    Router::new()
        .route("/test", get(health::handle))
        .merge(protected)
        .layer(middleware::from_fn(ensure_request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
