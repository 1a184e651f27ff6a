//! HTTP surface of the risk service.
//!
//! Routes:
//! ```text
//!   POST /predict    validated prediction, JSON in / JSON out
//!   POST /chat       streaming assistant relay (SSE)
//!   POST /init-chat  scripted greeting from analysis results (SSE)
//!   *                bundled front end; unknown paths get a JSON 404
//!                    with an endpoint directory
//! ```
//!
//! Requests are stateless and share nothing mutable; `AppState` only holds
//! the chat client and the immutable local predictor.

pub mod chat;

use axum::extract::State;
use axum::handler::HandlerWithoutStateExt;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::model::PredictorKind;
use crate::predict::{ChatClient, TabularPredictor};
use crate::validate::validate_request;

// ---------------------------------------------------------------------------
// State and router
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub chat: ChatClient,
    pub tabular: Arc<TabularPredictor>,
}

pub fn build_router(config: &AppConfig, state: AppState) -> Router {
    let static_files = ServeDir::new(&config.server.static_dir)
        .not_found_service(endpoint_directory.into_service());

    Router::new()
        .route("/predict", post(predict))
        .route("/chat", post(chat::chat))
        .route("/init-chat", post(chat::init_chat))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Predict the bleaching risk for one set of readings.
///
/// Validation runs first and short-circuits; the predictor selected by the
/// `model` flag only ever sees validated input.
async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let request = validate_request(&payload)?;

    let level = match request.predictor {
        PredictorKind::Llm => state.chat.classify(&request).await?,
        PredictorKind::Local => state.tabular.predict(&request),
    };

    let info = level.risk_info();
    info!(
        region = %request.region.code,
        date = %request.date,
        predictor = ?request.predictor,
        level = %level,
        "prediction served"
    );

    Ok(Json(json!({
        "risk_level": level.value(),
        "status": info.status,
        "description": info.description,
    })))
}

/// JSON 404 with an endpoint directory, also used by the static-file
/// service when a path matches no bundled asset.
async fn endpoint_directory() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "message": "The requested URL was not found on the server.",
            "available_endpoints": {
                "/": "GET - Home page",
                "/predict": "POST - Predict coral bleaching risk",
                "/chat": "POST - Chat with the AI assistant",
                "/init-chat": "POST - Start an assistant conversation from analysis results",
            },
        })),
    )
}
