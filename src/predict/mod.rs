//! Predictor strategies for the /predict endpoint.
//!
//! Two interchangeable strategies, selected per request by the client's
//! `model` flag:
//!
//! - `llm` — forwards the validated readings to a chat-completion endpoint
//!   and extracts the BAA level from the free-text reply (`llm`).
//! - `local` — engineered features into a pre-trained linear model loaded
//!   from on-disk artifacts (`tabular`).
//!
//! Both strategies return a `risk::BaaLevel`; the HTTP layer resolves it
//! against the static risk table.

pub mod llm;
pub mod tabular;

use thiserror::Error;

pub use llm::{ChatClient, ChatMessage, extract_baa_level};
pub use tabular::TabularPredictor;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure extracting a BAA level from free-text model output.
///
/// Out-of-range and absent numbers are reported, never silently clamped —
/// clamping is reserved for the local regression output, where the raw
/// value is a float by construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no numeric value found in model response")]
    NoNumber,

    #[error("BAA level {raw} out of range 0-4")]
    OutOfRange { raw: String },
}

/// Failure of the remote prediction path.
#[derive(Debug, Error)]
pub enum PredictError {
    /// Connection refused or other transport failure before a response.
    #[error("could not connect to model '{model}' at {url}: {detail}")]
    UpstreamUnavailable {
        model: String,
        url: String,
        detail: String,
    },

    /// The 30s request deadline elapsed.
    #[error("model '{model}' request timed out")]
    UpstreamTimeout { model: String },

    /// The chat endpoint answered with a non-200 status.
    #[error("chat endpoint returned HTTP {status}")]
    UpstreamStatus { status: u16 },

    /// The response body could not be decoded.
    #[error("malformed response from chat endpoint: {0}")]
    MalformedResponse(String),

    /// A well-formed response with no content to extract from.
    #[error("empty response from model")]
    EmptyResponse,

    #[error(transparent)]
    Extraction(#[from] ExtractError),
}
