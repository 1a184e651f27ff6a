//! Local tabular-model strategy.
//!
//! Derives 20 engineered features from a validated request, standard-scales
//! them with a pre-fit scaler, applies a pre-trained linear model, and
//! clamps the rounded output into the BAA range. Deterministic for
//! identical input.
//!
//! The model and scaler are two on-disk JSON artifacts exported from the
//! offline training run. Their `feature_names` must agree with
//! `FEATURE_COLUMNS` exactly — column order is the contract between
//! training and serving, and a mismatch is a startup error rather than a
//! silently wrong prediction.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::model::ValidatedRequest;
use crate::regions::region_index;
use crate::risk::BaaLevel;

// ---------------------------------------------------------------------------
// Feature contract
// ---------------------------------------------------------------------------

/// Fixed feature column order required by the trained model.
///
/// Raw indicators, calendar parts, one-hot season, one-hot region (registry
/// order), then the polynomial/interaction terms. Do not reorder.
pub const FEATURE_COLUMNS: [&str; 20] = [
    "min_sst",
    "max_sst",
    "hotspot_sst",
    "sst_anomaly",
    "dhw_90th",
    "month",
    "day_of_year",
    "season_djf",
    "season_mam",
    "season_jja",
    "season_son",
    "region_caribbean",
    "region_florida_keys",
    "region_great_barrier_reef",
    "region_coral_triangle",
    "sst_range",
    "anomaly_sq",
    "hotspot_sq",
    "hotspot_x_dhw",
    "anomaly_x_dhw",
];

/// Builds the feature vector for one request, in `FEATURE_COLUMNS` order.
pub fn build_feature_vector(request: &ValidatedRequest) -> [f64; 20] {
    use chrono::Datelike;

    let r = &request.indicators;
    let month = request.date.month();
    let season = season_one_hot(month);
    let region = region_one_hot(request);

    [
        r.min_sst,
        r.max_sst,
        r.hotspot_sst,
        r.sst_anomaly,
        r.dhw_90th,
        month as f64,
        request.date.ordinal() as f64,
        season[0],
        season[1],
        season[2],
        season[3],
        region[0],
        region[1],
        region[2],
        region[3],
        r.max_sst - r.min_sst,
        r.sst_anomaly * r.sst_anomaly,
        r.hotspot_sst * r.hotspot_sst,
        r.hotspot_sst * r.dhw_90th,
        r.sst_anomaly * r.dhw_90th,
    ]
}

/// Meteorological season one-hot: DJF, MAM, JJA, SON.
fn season_one_hot(month: u32) -> [f64; 4] {
    let mut one_hot = [0.0; 4];
    let idx = match month {
        12 | 1 | 2 => 0,
        3..=5 => 1,
        6..=8 => 2,
        _ => 3,
    };
    one_hot[idx] = 1.0;
    one_hot
}

/// Region one-hot in registry order. The registry guarantees membership for
/// any `ValidatedRequest`, so the index lookup cannot miss.
fn region_one_hot(request: &ValidatedRequest) -> [f64; 4] {
    let mut one_hot = [0.0; 4];
    if let Some(idx) = region_index(request.region) {
        if idx < one_hot.len() {
            one_hot[idx] = 1.0;
        }
    }
    one_hot
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct ModelArtifact {
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ScalerArtifact {
    feature_names: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// Errors loading or checking the serialized model artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("artifact {path} violates the feature contract: {detail}")]
    ColumnMismatch { path: String, detail: String },
}

fn check_columns(path: &str, names: &[String], values: usize) -> Result<(), ArtifactError> {
    if names.len() != FEATURE_COLUMNS.len() || values != FEATURE_COLUMNS.len() {
        return Err(ArtifactError::ColumnMismatch {
            path: path.to_string(),
            detail: format!(
                "expected {} columns, artifact has {} names and {} values",
                FEATURE_COLUMNS.len(),
                names.len(),
                values
            ),
        });
    }
    for (got, expected) in names.iter().zip(FEATURE_COLUMNS.iter()) {
        if got != expected {
            return Err(ArtifactError::ColumnMismatch {
                path: path.to_string(),
                detail: format!("column '{got}' where '{expected}' was expected"),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Predictor
// ---------------------------------------------------------------------------

/// The local strategy: pre-fit standard scaler + pre-trained linear model.
#[derive(Debug, Clone)]
pub struct TabularPredictor {
    coefficients: Vec<f64>,
    intercept: f64,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl TabularPredictor {
    /// Loads and cross-checks both artifacts. Called once at startup.
    pub fn load(
        model_path: impl AsRef<Path>,
        scaler_path: impl AsRef<Path>,
    ) -> Result<Self, ArtifactError> {
        let model: ModelArtifact = read_artifact(model_path.as_ref())?;
        let scaler: ScalerArtifact = read_artifact(scaler_path.as_ref())?;
        Self::from_artifacts(
            model,
            &model_path.as_ref().display().to_string(),
            scaler,
            &scaler_path.as_ref().display().to_string(),
        )
    }

    fn from_artifacts(
        model: ModelArtifact,
        model_path: &str,
        scaler: ScalerArtifact,
        scaler_path: &str,
    ) -> Result<Self, ArtifactError> {
        check_columns(model_path, &model.feature_names, model.coefficients.len())?;
        check_columns(scaler_path, &scaler.feature_names, scaler.mean.len())?;
        if scaler.scale.len() != scaler.mean.len() {
            return Err(ArtifactError::ColumnMismatch {
                path: scaler_path.to_string(),
                detail: format!(
                    "scaler has {} means but {} scales",
                    scaler.mean.len(),
                    scaler.scale.len()
                ),
            });
        }
        Ok(TabularPredictor {
            coefficients: model.coefficients,
            intercept: model.intercept,
            mean: scaler.mean,
            scale: scaler.scale,
        })
    }

    /// Predicts a BAA level. Always deterministic, always in 0..=4.
    pub fn predict(&self, request: &ValidatedRequest) -> BaaLevel {
        BaaLevel::from_regression_output(self.raw_output(request))
    }

    /// The unclamped regression output; exposed for tests of the clamp.
    pub fn raw_output(&self, request: &ValidatedRequest) -> f64 {
        let features = build_feature_vector(request);
        let mut acc = self.intercept;
        for i in 0..features.len() {
            // A zero-variance training column scales to 0, matching the
            // offline scaler's behavior.
            let scaled = if self.scale[i] == 0.0 {
                0.0
            } else {
                (features[i] - self.mean[i]) / self.scale[i]
            };
            acc += scaled * self.coefficients[i];
        }
        acc
    }
}

fn read_artifact<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ArtifactError> {
    let text = fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ArtifactError::Parse {
        path: path.display().to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
