//! NOAA Coral Reef Watch station file reader.
//!
//! Regional virtual-station time series come as a text file with a short
//! header block followed by fixed-width daily rows:
//!
//! ```text
//! NOAA Coral Reef Watch 5km Regional Virtual Station Time Series
//! Station: Southwestern Cuba
//! Region: caribbean
//! Latitude: 21.2500
//! Longitude: -82.7500
//! YYYY MM DD  SST_MIN  SST_MAX SST90_HS SSTA90_HS    DHW90
//! 2024 05 01    28.12    29.45    29.10      0.85     2.40
//! ```
//!
//! Values are read from fixed character columns, not by splitting on
//! whitespace — station names and future columns may themselves contain
//! spaces. Numeric ranges are deliberately not validated on ingest; the
//! files are source data and out-of-range values belong to downstream
//! analysis, not the loader.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// One daily row of a station time series.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub sst_min: f64,
    pub sst_max: f64,
    /// 90th-percentile HotSpot SST.
    pub sst_90th_hs: f64,
    /// 90th-percentile SST anomaly.
    pub ssta_90th_hs: f64,
    /// Degree heating weeks derived from the 90th-percentile HotSpot.
    pub dhw_90th: f64,
}

impl StationRecord {
    /// The calendar date of this row, if the date parts form one. The
    /// parser accepts whatever the file says, so an impossible date is
    /// only discovered here.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

/// A parsed station file: header metadata plus all daily rows.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSeries {
    pub station_name: String,
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub records: Vec<StationRecord>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum NoaaParseError {
    #[error("failed to read station file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("station file header is missing the '{field}' line")]
    MissingHeader { field: &'static str },

    #[error("station file has no column header line")]
    MissingColumnHeader,

    #[error("line {line_no}: row is {len} characters, expected at least {expected}")]
    ShortRow {
        line_no: usize,
        len: usize,
        expected: usize,
    },

    #[error("line {line_no}: could not parse {field} from '{text}'")]
    BadField {
        line_no: usize,
        field: &'static str,
        text: String,
    },
}

// ---------------------------------------------------------------------------
// Fixed column layout
// ---------------------------------------------------------------------------

// Byte ranges of each column within a data row. The layout is part of the
// file format; rows are right-aligned within their columns.
const COL_YEAR: (usize, usize) = (0, 4);
const COL_MONTH: (usize, usize) = (5, 7);
const COL_DAY: (usize, usize) = (8, 10);
const COL_SST_MIN: (usize, usize) = (10, 19);
const COL_SST_MAX: (usize, usize) = (19, 28);
const COL_SST90: (usize, usize) = (28, 37);
const COL_SSTA90: (usize, usize) = (37, 47);
const COL_DHW: (usize, usize) = (47, 56);

const ROW_WIDTH: usize = COL_DHW.1;

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Loads and parses a station file from disk.
pub fn load_station_file(path: impl AsRef<Path>) -> Result<StationSeries, NoaaParseError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| NoaaParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_station_series(&text)
}

/// Parses the full station file text.
pub fn parse_station_series(text: &str) -> Result<StationSeries, NoaaParseError> {
    let mut station_name = None;
    let mut region = None;
    let mut latitude = None;
    let mut longitude = None;
    let mut records = Vec::new();
    let mut in_data = false;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if !in_data {
            if let Some(rest) = line.strip_prefix("Station:") {
                station_name = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("Region:") {
                region = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("Latitude:") {
                latitude = Some(parse_header_number(rest, "Latitude", line_no)?);
            } else if let Some(rest) = line.strip_prefix("Longitude:") {
                longitude = Some(parse_header_number(rest, "Longitude", line_no)?);
            } else if line.starts_with("YYYY") {
                in_data = true;
            }
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_row(line, line_no)?);
    }

    if !in_data {
        return Err(NoaaParseError::MissingColumnHeader);
    }

    Ok(StationSeries {
        station_name: station_name.ok_or(NoaaParseError::MissingHeader { field: "Station" })?,
        region: region.ok_or(NoaaParseError::MissingHeader { field: "Region" })?,
        latitude: latitude.ok_or(NoaaParseError::MissingHeader { field: "Latitude" })?,
        longitude: longitude.ok_or(NoaaParseError::MissingHeader { field: "Longitude" })?,
        records,
    })
}

fn parse_header_number(
    rest: &str,
    field: &'static str,
    line_no: usize,
) -> Result<f64, NoaaParseError> {
    rest.trim()
        .parse()
        .map_err(|_| NoaaParseError::BadField {
            line_no,
            field,
            text: rest.trim().to_string(),
        })
}

/// Parses one fixed-width data row.
fn parse_row(line: &str, line_no: usize) -> Result<StationRecord, NoaaParseError> {
    if line.len() < ROW_WIDTH {
        return Err(NoaaParseError::ShortRow {
            line_no,
            len: line.len(),
            expected: ROW_WIDTH,
        });
    }

    Ok(StationRecord {
        year: column(line, COL_YEAR, "year", line_no)?,
        month: column(line, COL_MONTH, "month", line_no)?,
        day: column(line, COL_DAY, "day", line_no)?,
        sst_min: column(line, COL_SST_MIN, "SST_MIN", line_no)?,
        sst_max: column(line, COL_SST_MAX, "SST_MAX", line_no)?,
        sst_90th_hs: column(line, COL_SST90, "SST90_HS", line_no)?,
        ssta_90th_hs: column(line, COL_SSTA90, "SSTA90_HS", line_no)?,
        dhw_90th: column(line, COL_DHW, "DHW90", line_no)?,
    })
}

fn column<T: std::str::FromStr>(
    line: &str,
    (start, end): (usize, usize),
    field: &'static str,
    line_no: usize,
) -> Result<T, NoaaParseError> {
    let text = line[start..end].trim();
    text.parse().map_err(|_| NoaaParseError::BadField {
        line_no,
        field,
        text: text.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
NOAA Coral Reef Watch 5km Regional Virtual Station Time Series
Station: Southwestern Cuba
Region: caribbean
Latitude: 21.2500
Longitude: -82.7500
YYYY MM DD  SST_MIN  SST_MAX SST90_HS SSTA90_HS    DHW90
2024 05 01    28.12    29.45    29.10      0.85     2.40
2024 05 02    28.20    29.61    29.33      1.02     2.55
";

    #[test]
    fn test_header_block_is_parsed() {
        let series = parse_station_series(SAMPLE).expect("sample must parse");
        assert_eq!(series.station_name, "Southwestern Cuba");
        assert_eq!(series.region, "caribbean");
        assert_eq!(series.latitude, 21.25);
        assert_eq!(series.longitude, -82.75);
    }

    #[test]
    fn test_rows_are_read_from_fixed_columns() {
        let series = parse_station_series(SAMPLE).unwrap();
        assert_eq!(series.records.len(), 2);
        let first = &series.records[0];
        assert_eq!((first.year, first.month, first.day), (2024, 5, 1));
        assert_eq!(first.sst_min, 28.12);
        assert_eq!(first.sst_max, 29.45);
        assert_eq!(first.sst_90th_hs, 29.10);
        assert_eq!(first.ssta_90th_hs, 0.85);
        assert_eq!(first.dhw_90th, 2.40);
    }

    #[test]
    fn test_record_date_helper() {
        let series = parse_station_series(SAMPLE).unwrap();
        assert_eq!(
            series.records[1].date(),
            NaiveDate::from_ymd_opt(2024, 5, 2)
        );
    }

    #[test]
    fn test_out_of_range_values_are_accepted_on_ingest() {
        // The loader takes the file at its word; range checks belong to
        // downstream analysis.
        let sample = SAMPLE.replace("    29.45", "    99.99");
        let series = parse_station_series(&sample).unwrap();
        assert_eq!(series.records[0].sst_max, 99.99);
    }

    #[test]
    fn test_truncated_row_reports_its_line_number() {
        let sample = format!("{}2024 05 03    28.31\n", SAMPLE);
        let err = parse_station_series(&sample).unwrap_err();
        match err {
            NoaaParseError::ShortRow { line_no, .. } => assert_eq!(line_no, 9),
            other => panic!("expected ShortRow, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_in_a_column_reports_field_and_line() {
        let sample = SAMPLE.replace("    28.20", "    2x.20");
        let err = parse_station_series(&sample).unwrap_err();
        match err {
            NoaaParseError::BadField { field, line_no, .. } => {
                assert_eq!(field, "SST_MIN");
                assert_eq!(line_no, 8);
            }
            other => panic!("expected BadField, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_station_header_is_an_error() {
        let sample = SAMPLE.replace("Station: Southwestern Cuba\n", "");
        assert!(matches!(
            parse_station_series(&sample).unwrap_err(),
            NoaaParseError::MissingHeader { field: "Station" }
        ));
    }

    #[test]
    fn test_file_without_column_header_is_an_error() {
        let sample = "Station: X\nRegion: caribbean\nLatitude: 1\nLongitude: 2\n";
        assert!(matches!(
            parse_station_series(sample).unwrap_err(),
            NoaaParseError::MissingColumnHeader
        ));
    }

    #[test]
    fn test_blank_lines_between_rows_are_skipped() {
        let sample = SAMPLE.replace(
            "2024 05 02",
            "\n2024 05 02",
        );
        let series = parse_station_series(&sample).unwrap();
        assert_eq!(series.records.len(), 2);
    }

    #[test]
    fn test_bundled_station_file_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/noaa/southwestern_cuba.txt");
        let series = load_station_file(path).expect("bundled station file must parse");
        assert_eq!(series.region, "caribbean");
        assert!(!series.records.is_empty());
    }
}
