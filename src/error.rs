// =============================================================================
// error.rs — THE ONE THING THAT CAN GO WRONG (FOR THE CALLER)
// =============================================================================
//
// Upstreams fail all the time and callers never see it as an error: it comes
// back as a limitation note inside a normal response. The only failure a
// caller can cause is sending something that is not a CNPJ.
// =============================================================================

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Normalized identifier did not have exactly 14 digits.
    #[error("CNPJ deve ter 14 dígitos.")]
    InvalidCnpj,
}

impl ApiError {
    /// Stable machine-readable code placed in the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidCnpj => "cnpj_invalido",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidCnpj => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
