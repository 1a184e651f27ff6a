//! Dataset loaders.
//!
//! Standalone readers used by the exploratory `datasets` binary and by
//! offline analysis; the HTTP service does not depend on them.
//!
//! Submodules:
//! - `noaa` — fixed-width NOAA Coral Reef Watch station time-series files.
//! - `arc_agi` — ARC-AGI task JSON files, with a text grid renderer.

pub mod arc_agi;
pub mod noaa;
