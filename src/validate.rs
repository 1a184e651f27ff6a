//! Request validation for the prediction endpoint.
//!
//! Validation runs once, synchronously, before any downstream call. Any
//! violation short-circuits with a structured error — invalid requests
//! never reach a predictor. The checks run in a fixed order: field
//! presence, region membership, date parse, then each numeric range in
//! `REQUIRED_FIELDS` order.

use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

use crate::model::{BleachingIndicators, PredictorKind, ValidatedRequest};
use crate::regions::{self, Region};

// ---------------------------------------------------------------------------
// Field contract
// ---------------------------------------------------------------------------

/// Required request fields, in validation order.
pub const REQUIRED_FIELDS: &[&str] = &[
    "region",
    "date",
    "min_sst",
    "max_sst",
    "hotspot_sst",
    "sst_anomaly",
    "dhw_90th",
];

/// Physical range for ocean surface temperatures, °C.
pub const SST_RANGE: (f64, f64) = (-5.0, 40.0);

/// Documented range for 90th-percentile degree heating weeks.
pub const DHW_RANGE: (f64, f64) = (0.0, 20.0);

const SST_FIELDS: &[&str] = &["min_sst", "max_sst", "hotspot_sst", "sst_anomaly"];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A client input error. Every variant maps to HTTP 400 with a structured
/// JSON payload; `to_payload` builds the body the front end consumes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("unknown region '{0}'")]
    UnknownRegion(String),

    #[error("'{0}' is not an ISO calendar date")]
    InvalidDate(String),

    #[error("field '{field}' must be a number")]
    NotANumber { field: &'static str },

    #[error("field '{field}' value {value} outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("unknown predictor '{0}', expected 'llm' or 'local'")]
    UnknownPredictor(String),
}

impl ValidationError {
    /// Structured JSON body for the 400 response.
    pub fn to_payload(&self) -> Value {
        match self {
            ValidationError::MissingFields(missing) => serde_json::json!({
                "error": "Missing required fields",
                "missing_fields": missing,
            }),
            ValidationError::UnknownRegion(region) => serde_json::json!({
                "error": format!("Invalid region '{region}'"),
                "valid_regions": regions::all_region_codes(),
            }),
            ValidationError::InvalidDate(date) => serde_json::json!({
                "error": format!("Invalid date '{date}'. Must be an ISO calendar date (YYYY-MM-DD)"),
            }),
            ValidationError::NotANumber { field } => serde_json::json!({
                "error": format!("Invalid value for {field}. All temperature and DHW values must be numbers"),
            }),
            ValidationError::OutOfRange {
                field,
                value,
                min,
                max,
            } => serde_json::json!({
                "error": format!("Invalid value for {field}. Must be between {min} and {max}"),
                "received_value": value,
            }),
            ValidationError::UnknownPredictor(kind) => serde_json::json!({
                "error": format!("Invalid model '{kind}'. Must be 'llm' or 'local'"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validates a raw JSON prediction payload.
///
/// Returns the first violation found; the error lists *exactly* the missing
/// fields when presence is what failed. Numeric fields accept JSON numbers
/// or numeric strings, since older front-end builds sent form values as
/// strings.
pub fn validate_request(payload: &Value) -> Result<ValidatedRequest, ValidationError> {
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|f| payload.get(**f).is_none())
        .map(|f| f.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let region = resolve_region(&payload["region"])?;
    let date = parse_date(&payload["date"])?;

    let mut sst = [0.0f64; 4];
    for (slot, field) in sst.iter_mut().zip(SST_FIELDS.iter().copied()) {
        *slot = numeric_in_range(payload, field, SST_RANGE)?;
    }
    let dhw_90th = numeric_in_range(payload, "dhw_90th", DHW_RANGE)?;

    let predictor = resolve_predictor(payload.get("model"))?;

    Ok(ValidatedRequest {
        region,
        date,
        indicators: BleachingIndicators {
            min_sst: sst[0],
            max_sst: sst[1],
            hotspot_sst: sst[2],
            sst_anomaly: sst[3],
            dhw_90th,
        },
        predictor,
    })
}

fn resolve_region(value: &Value) -> Result<&'static Region, ValidationError> {
    let code = value.as_str().unwrap_or_default();
    regions::find_region(code).ok_or_else(|| ValidationError::UnknownRegion(code.to_string()))
}

fn parse_date(value: &Value) -> Result<NaiveDate, ValidationError> {
    let text = value.as_str().unwrap_or_default();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(text.to_string()))
}

fn numeric_in_range(
    payload: &Value,
    field: &'static str,
    (min, max): (f64, f64),
) -> Result<f64, ValidationError> {
    let value = match &payload[field] {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
    .ok_or(ValidationError::NotANumber { field })?;

    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

fn resolve_predictor(value: Option<&Value>) -> Result<PredictorKind, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(PredictorKind::Llm),
        Some(v) => match v.as_str() {
            Some("llm") => Ok(PredictorKind::Llm),
            Some("local") => Ok(PredictorKind::Local),
            _ => Err(ValidationError::UnknownPredictor(
                v.as_str().unwrap_or_default().to_string(),
            )),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
