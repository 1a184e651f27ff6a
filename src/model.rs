/// Core data types for the coral bleaching risk service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic, no I/O, and no external dependencies beyond chrono —
/// only types.

use chrono::NaiveDate;

use crate::regions::Region;

// ---------------------------------------------------------------------------
// Predictor selection
// ---------------------------------------------------------------------------

/// Which predictor strategy a request is dispatched to.
///
/// Selected by the client-supplied `model` field. Requests without the field
/// default to the remote chat-completion strategy, which was the only
/// strategy early front-end builds knew about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictorKind {
    /// Remote chat-completion endpoint with numeric extraction (`"llm"`).
    Llm,
    /// Local pre-trained tabular model (`"local"`).
    Local,
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// The five thermal-stress indicators carried by a prediction request.
///
/// All temperatures are sea-surface temperatures in °C; `dhw_90th` is the
/// 90th-percentile degree-heating-week value, a cumulative stress metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BleachingIndicators {
    pub min_sst: f64,
    pub max_sst: f64,
    pub hotspot_sst: f64,
    pub sst_anomaly: f64,
    pub dhw_90th: f64,
}

/// A fully validated prediction request.
///
/// Produced by `validate::validate_request`; existence of a value of this
/// type means every field was present, the region resolved against
/// `regions::REGION_REGISTRY`, the date parsed as an ISO calendar date, and
/// every indicator passed its documented physical range. Predictors only
/// ever see this type, never raw JSON.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedRequest {
    pub region: &'static Region,
    pub date: NaiveDate,
    pub indicators: BleachingIndicators,
    pub predictor: PredictorKind,
}
