use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use thiserror::Error;

use crate::protocol::{ErrorBody, Rejection};
use crate::schema::FieldError;

/// Failures while hosting the endpoint
#[derive(Error, Debug, Diagnostic)]
pub enum ServerError {
    #[error("Could not bind {address}")]
    #[diagnostic(code(hmv::server::bind), help("Is another process using the address?"))]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server I/O error: {0}")]
    #[diagnostic(code(hmv::server::io))]
    Io(#[from] std::io::Error),
}

/// Error responses of the submission endpoint
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid data")]
    Invalid(Vec<FieldError>),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Method Not Allowed")]
    MethodNotAllowed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Invalid(errors) => {
                (StatusCode::BAD_REQUEST, Json(Rejection::invalid(errors))).into_response()
            }
            ApiError::MalformedPayload(reason) => (
                StatusCode::BAD_REQUEST,
                Json(Rejection::invalid(vec![FieldError::document(format!(
                    "Malformed JSON: {}",
                    reason
                ))])),
            )
                .into_response(),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(ErrorBody {
                    message: "Method Not Allowed".to_string(),
                }),
            )
                .into_response(),
        }
    }
}
