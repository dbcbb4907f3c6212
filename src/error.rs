//! Failures surfaced over HTTP.
//!
//! Every variant maps to status 500. The body carries the underlying
//! message plus a `kind` tag so clients can tell failures apart without
//! parsing text.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body was not the expected JSON.
    #[error("{0}")]
    InputParse(#[from] serde_json::Error),
    /// The inference provider failed or returned nothing usable.
    #[error("{0:#}")]
    Inference(anyhow::Error),
    /// The result store failed to read or write.
    #[error("{0:#}")]
    Storage(anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InputParse(_) => "input_parse",
            ApiError::Inference(_) => "inference",
            ApiError::Storage(_) => "storage",
        }
    }
}

/// Wire shape of a failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(kind = self.kind(), error = %self, "request failed");
        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
