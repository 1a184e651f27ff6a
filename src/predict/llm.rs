//! Remote chat-completion strategy.
//!
//! Builds a fixed classification prompt from the validated readings, POSTs
//! it to the configured chat endpoint (an Ollama-style `/api/chat`), and
//! extracts a single 0-4 integer from the reply text. The same client also
//! opens the streaming requests the chat relay forwards.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::LlmConfig;
use crate::model::ValidatedRequest;
use crate::risk::BaaLevel;

use super::{ExtractError, PredictError};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One message of a chat conversation, as exchanged with the endpoint and
/// with relay clients (`history` entries arrive in this shape).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the chat-completion endpoint.
///
/// One instance is shared by the /predict llm strategy and both streaming
/// relay routes. The classification call carries a fixed request deadline;
/// streaming calls only bound the connection, since a healthy stream may
/// outlive any fixed total timeout.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    request_timeout: Duration,
    classify_temperature: f64,
    chat_temperature: f64,
}

impl ChatClient {
    pub fn new(config: &LlmConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(ChatClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            request_timeout: Duration::from_secs(config.timeout_secs),
            classify_temperature: config.classify_temperature,
            chat_temperature: config.chat_temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    fn transport_error(&self, err: reqwest::Error) -> PredictError {
        if err.is_timeout() {
            PredictError::UpstreamTimeout {
                model: self.model.clone(),
            }
        } else {
            PredictError::UpstreamUnavailable {
                model: self.model.clone(),
                url: self.chat_url(),
                detail: err.to_string(),
            }
        }
    }

    /// Classifies a validated request into a BAA level.
    ///
    /// Non-streaming, low temperature, bounded by the configured request
    /// timeout. The reply text goes through `extract_baa_level` unchanged.
    pub async fn classify(&self, request: &ValidatedRequest) -> Result<BaaLevel, PredictError> {
        let messages = classification_messages(request);
        let body = ChatRequest {
            model: &self.model,
            messages: &messages,
            stream: false,
            temperature: self.classify_temperature,
        };

        debug!(model = %self.model, region = %request.region.code, "requesting BAA classification");

        let response = self
            .http
            .post(self.chat_url())
            .json(&body)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status() != StatusCode::OK {
            return Err(PredictError::UpstreamStatus {
                status: response.status().as_u16(),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PredictError::MalformedResponse(e.to_string()))?;

        let content = parsed.message.map(|m| m.content).unwrap_or_default();
        let text = content.trim();
        if text.is_empty() {
            return Err(PredictError::EmptyResponse);
        }

        Ok(extract_baa_level(text)?)
    }

    /// Opens a streaming chat completion and hands back the raw response.
    ///
    /// The caller (the SSE relay) owns line decoding; a non-200 status is
    /// still reported here so the relay can emit a single error event.
    pub async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<reqwest::Response, PredictError> {
        let body = ChatRequest {
            model: &self.model,
            messages: &messages,
            stream: true,
            temperature: self.chat_temperature,
        };

        let response = self
            .http
            .post(self.chat_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status() != StatusCode::OK {
            return Err(PredictError::UpstreamStatus {
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }
}

// ---------------------------------------------------------------------------
// Prompt construction
// ---------------------------------------------------------------------------

const CLASSIFY_SYSTEM_PROMPT: &str = "You are a coral reef monitoring system. Always respond \
     with ONLY a single number (0-4) representing the BAA level. No explanation needed.";

fn classification_messages(request: &ValidatedRequest) -> Vec<ChatMessage> {
    let r = &request.indicators;
    vec![
        ChatMessage::system(CLASSIFY_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Region: {} ({}). Date: {}. SST values: MIN={}, MAX={}, HOTSPOT={}, ANOMALY={}. \
             DHW (90th percentile): {}. Predict BAA (0=No Stress, 1=Watch, 2=Warning, \
             3=Alert1, 4=Alert2). Respond with ONLY the number.",
            request.region.name,
            request.region.code,
            request.date,
            r.min_sst,
            r.max_sst,
            r.hotspot_sst,
            r.sst_anomaly,
            r.dhw_90th,
        )),
    ]
}

// ---------------------------------------------------------------------------
// Numeric extraction
// ---------------------------------------------------------------------------

lazy_static! {
    static ref BAA_LABELED: Regex = Regex::new(r"BAA:\s*(\d+)").expect("static pattern");
    static ref FIRST_NUMBER: Regex = Regex::new(r"\d+").expect("static pattern");
}

/// Extracts a BAA level from free-text model output.
///
/// First-match-wins: a labeled `BAA: N` takes priority over any other digit
/// run; without the label, the first digit run in the text is used. Numbers
/// outside 0-4 are extraction errors.
pub fn extract_baa_level(text: &str) -> Result<BaaLevel, ExtractError> {
    let digits = BAA_LABELED
        .captures(text)
        .map(|c| c.get(1).expect("group 1 is not optional").as_str())
        .or_else(|| FIRST_NUMBER.find(text).map(|m| m.as_str()))
        .ok_or(ExtractError::NoNumber)?;

    digits
        .parse::<i64>()
        .ok()
        .and_then(BaaLevel::new)
        .ok_or_else(|| ExtractError::OutOfRange {
            raw: digits.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
