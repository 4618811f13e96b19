use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use ulid::Ulid;

use super::error::ApiError;
use super::AppState;
use crate::protocol::Acknowledgment;

/// POST handler: validate and acknowledge an application
pub async fn submit_application(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload: Value =
        serde_json::from_slice(&body).map_err(|e| ApiError::MalformedPayload(e.to_string()))?;

    let record = state.schema.validate(&payload).map_err(|errors| {
        info!(count = errors.len(), "application rejected");
        ApiError::Invalid(errors.into_errors())
    })?;

    // Persistence would happen here; the record is only logged
    let reference = Ulid::new().to_string();
    info!(%reference, record = ?record, "validated application");

    Ok((StatusCode::OK, Json(Acknowledgment::ok(reference))))
}

/// Any method other than POST
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
