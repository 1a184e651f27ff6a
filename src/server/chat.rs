//! Streaming chat relay.
//!
//! Both routes forward a conversation to the chat endpoint with streaming
//! enabled and re-emit each decoded NDJSON line as a server-sent event of
//! the form `{"content": ...}`. Once the SSE response has started there is
//! no HTTP status left to change, so upstream failures surface as in-band
//! `{"error": ...}` events instead.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use std::convert::Infallible;
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;
use tracing::warn;

use super::AppState;
use crate::predict::{ChatMessage, PredictError};

const ASSISTANT_SYSTEM_PROMPT: &str = "You are a coral reef monitoring assistant. You help users \
     understand coral bleaching risks, interpret temperature data, and provide recommendations \
     for coral reef protection. Be concise but informative.";

const GREETING_SYSTEM_PROMPT: &str = "You are a coral reef monitoring assistant. Respond ONLY \
     with a greeting message that follows this exact structure:\n\
     1. Start with \"Hello! I am your AI coral reef assistant.\"\n\
     2. Follow with \"I see these temperature readings:\"\n\
     3. List the temperatures as bullet points\n\
     4. State the risk level and status (make the status bold with **text**)\n\
     5. Add the description\n\
     6. End with a short question about how you can help\n\
     DO NOT add any additional text, quotes, or commentary about the greeting itself. \
     Start directly with \"Hello!\".";

const GREETING_FIELDS: &[&str] = &[
    "min_sst",
    "max_sst",
    "hotspot_sst",
    "sst_anomaly",
    "risk_level",
    "risk_status",
    "description",
];

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /chat — relay one user message (plus optional history).
pub async fn chat(State(state): State<AppState>, Json(payload): Json<Value>) -> Response {
    let Some(message) = payload.get("message").and_then(Value::as_str) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing message field" })),
        )
            .into_response();
    };

    let history = match payload.get("history") {
        None => Vec::new(),
        Some(value) => match serde_json::from_value::<Vec<ChatMessage>>(value.clone()) {
            Ok(history) => history,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Invalid history: expected a list of {role, content} messages" })),
                )
                    .into_response();
            }
        },
    };

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(ASSISTANT_SYSTEM_PROMPT));
    messages.extend(history);
    messages.push(ChatMessage::user(message));

    relay(&state, messages).await
}

/// POST /init-chat — generate the scripted greeting from analysis results.
pub async fn init_chat(State(state): State<AppState>, Json(payload): Json<Value>) -> Response {
    let missing: Vec<&str> = GREETING_FIELDS
        .iter()
        .filter(|f| payload.get(**f).is_none())
        .copied()
        .collect();
    if !missing.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Missing required fields",
                "missing_fields": missing,
            })),
        )
            .into_response();
    }

    let messages = vec![
        ChatMessage::system(GREETING_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Create an initial greeting with these values:\n\
             - Minimum Temperature: {}°C\n\
             - Maximum Temperature: {}°C\n\
             - Hotspot Temperature: {}°C\n\
             - Temperature Anomaly: {}°C\n\
             - Risk Level: {}\n\
             - Risk Status: {}\n\
             - Description: {}",
            field_text(&payload["min_sst"]),
            field_text(&payload["max_sst"]),
            field_text(&payload["hotspot_sst"]),
            field_text(&payload["sst_anomaly"]),
            field_text(&payload["risk_level"]),
            field_text(&payload["risk_status"]),
            field_text(&payload["description"]),
        )),
    ];

    relay(&state, messages).await
}

/// Renders a JSON field for prompt embedding without the quoting that
/// `Value`'s Display would add to strings.
fn field_text(value: &Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Relay plumbing
// ---------------------------------------------------------------------------

async fn relay(state: &AppState, messages: Vec<ChatMessage>) -> Response {
    let events: BoxStream<'static, Result<Event, Infallible>> =
        match state.chat.stream_chat(messages).await {
            Ok(response) => relay_stream(response).boxed(),
            Err(err) => {
                warn!(error = %err, "chat relay could not reach the model");
                let event = error_event(&err);
                stream::once(async move { Ok(event) }).boxed()
            }
        };

    Sse::new(events).keep_alive(KeepAlive::default()).into_response()
}

/// One decoded line of the upstream NDJSON stream.
#[derive(Debug, Deserialize)]
struct StreamChunk {
    message: Option<ChatMessage>,
}

/// Maps the upstream byte stream to SSE events, line by line.
///
/// Undecodable lines are skipped rather than aborting the stream; a
/// transport error mid-stream becomes a final in-band error event.
fn relay_stream(
    response: reqwest::Response,
) -> impl Stream<Item = Result<Event, Infallible>> + Send {
    let bytes = response
        .bytes_stream()
        .map(|chunk| chunk.map_err(std::io::Error::other));
    let lines = FramedRead::new(StreamReader::new(bytes), LinesCodec::new());

    lines.filter_map(|line| async move {
        match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    return None;
                }
                match serde_json::from_str::<StreamChunk>(trimmed) {
                    Ok(chunk) => chunk
                        .message
                        .filter(|m| !m.content.is_empty())
                        .map(|m| Ok(content_event(&m.content))),
                    Err(_) => None,
                }
            }
            Err(err) => Some(Ok(Event::default()
                .data(json!({ "error": format!("stream interrupted: {err}") }).to_string()))),
        }
    })
}

fn content_event(content: &str) -> Event {
    Event::default().data(json!({ "content": content }).to_string())
}

fn error_event(err: &PredictError) -> Event {
    Event::default().data(json!({ "error": err.to_string() }).to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
