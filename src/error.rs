//! HTTP error mapping.
//!
//! Error classes and their status codes:
//!   client input            -> 400
//!   upstream unreachable    -> 503
//!   upstream timeout        -> 504
//!   upstream contract break -> 500 (malformed/empty reply, extraction failure)
//!   anything unexpected     -> 500
//!
//! Callers always receive a JSON body, never a stack trace; the full error
//! chain goes to the local log instead.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{error, warn};

use crate::predict::{ExtractError, PredictError};
use crate::validate::ValidationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Predict(PredictError::UpstreamUnavailable { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Predict(PredictError::UpstreamTimeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Predict(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            ApiError::Validation(err) => err.to_payload(),
            ApiError::Predict(err) => predict_payload(err),
            ApiError::Internal(_) => json!({ "error": "Internal server error" }),
        }
    }
}

fn predict_payload(err: &PredictError) -> Value {
    match err {
        PredictError::UpstreamUnavailable { model, url, .. } => json!({
            "error": format!("Could not connect to model {model}. Make sure it is running at {url}"),
        }),
        PredictError::UpstreamTimeout { model } => json!({
            "error": format!("Model {model} request timed out"),
        }),
        PredictError::UpstreamStatus { status } => json!({
            "error": "Error calling chat model",
            "status_code": status,
        }),
        PredictError::MalformedResponse(_) => json!({
            "error": "Malformed response from model",
        }),
        PredictError::EmptyResponse => json!({
            "error": "Empty response from model",
        }),
        PredictError::Extraction(ExtractError::NoNumber) => json!({
            "error": "No numeric value found in response",
        }),
        PredictError::Extraction(ExtractError::OutOfRange { raw }) => json!({
            "error": "BAA level out of range",
            "received_value": raw,
        }),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, error = %self, "request failed");
        } else {
            warn!(status = %status, error = %self, "request rejected");
        }
        (status, Json(self.payload())).into_response()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
