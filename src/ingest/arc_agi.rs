//! ARC-AGI task file reader and text renderer.
//!
//! A task file is JSON with `train` and `test` lists of input/output grid
//! pairs; cells are small integers (0-9 color indices). The renderer is
//! textual — good enough for eyeballing a grid in a terminal without
//! pulling a plotting stack into the crate.

use serde::Deserialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Task types
// ---------------------------------------------------------------------------

/// A single grid: rows of color-index cells.
pub type Grid = Vec<Vec<u8>>;

/// One demonstration or evaluation pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GridPair {
    pub input: Grid,
    pub output: Grid,
}

/// A full task: training demonstrations plus held-out test pairs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArcTask {
    pub train: Vec<GridPair>,
    pub test: Vec<GridPair>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ArcLoadError {
    #[error("failed to read task file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse task JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

pub fn load_task_file(path: impl AsRef<Path>) -> Result<ArcTask, ArcLoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ArcLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_task(&text)
}

pub fn parse_task(text: &str) -> Result<ArcTask, ArcLoadError> {
    Ok(serde_json::from_str(text)?)
}

// ---------------------------------------------------------------------------
// Rendering and scoring
// ---------------------------------------------------------------------------

/// Renders a grid as one digit per cell, one row per line.
pub fn render_grid(grid: &Grid) -> String {
    let mut out = String::new();
    for row in grid {
        for cell in row {
            let _ = write!(out, "{cell}");
        }
        out.push('\n');
    }
    out
}

/// Fraction of predictions that match their ground-truth grid exactly.
///
/// Returns `None` for an empty ground truth, where accuracy is undefined.
/// Extra predictions beyond the ground-truth length are ignored, missing
/// ones count as wrong.
pub fn grid_accuracy(predictions: &[Grid], ground_truth: &[Grid]) -> Option<f64> {
    if ground_truth.is_empty() {
        return None;
    }
    let correct = ground_truth
        .iter()
        .zip(predictions)
        .filter(|(truth, predicted)| truth == predicted)
        .count();
    Some(correct as f64 / ground_truth.len() as f64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
