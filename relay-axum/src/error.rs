use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relay_core::RelayError;

#[derive(Debug)]
pub struct RelayAxumError(pub anyhow::Error);

impl From<anyhow::Error> for RelayAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<RelayError> for RelayAxumError {
    fn from(e: RelayError) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for RelayAxumError {
    fn into_response(self) -> Response {
        if let Some(relay) = self.0.chain().find_map(|e| e.downcast_ref::<RelayError>()) {
            let status = StatusCode::from_u16(relay.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return (status, Json(relay.to_json())).into_response();
        }

        let relay = RelayError::general_error(self.0.to_string());
        (StatusCode::INTERNAL_SERVER_ERROR, Json(relay.to_json())).into_response()
    }
}

