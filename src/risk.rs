//! BAA risk levels and the static status/description table.
//!
//! The Bleaching Alert Area (BAA) level is a 0–4 integer classification of
//! thermal stress. Both predictor strategies produce a `BaaLevel`; the
//! HTTP layer resolves it against `RISK_TABLE` when building the response.
//! The table is static and immutable — nothing is persisted per request.

use std::fmt;

// ---------------------------------------------------------------------------
// BAA level
// ---------------------------------------------------------------------------

/// A validated bleaching alert level in 0..=4.
///
/// Construction is the only place the range is enforced: `new` rejects
/// out-of-range integers (used by the extraction path, where an out-of-range
/// number is an upstream contract violation), while `from_regression_output`
/// clamps (used by the local model, whose raw output is an unbounded float).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BaaLevel(u8);

impl BaaLevel {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 4;

    /// Accepts an integer already expected to be in range. Returns `None`
    /// for anything outside 0..=4 — callers decide whether that is a
    /// client error or an upstream contract violation.
    pub fn new(level: i64) -> Option<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&level) {
            Some(BaaLevel(level as u8))
        } else {
            None
        }
    }

    /// Rounds a raw regression output and clamps it into 0..=4.
    ///
    /// Non-finite outputs clamp to 0; the artifact check at startup makes
    /// them unlikely, but the clamp must never panic.
    pub fn from_regression_output(raw: f64) -> Self {
        if !raw.is_finite() {
            return BaaLevel(Self::MIN);
        }
        let rounded = raw.round();
        let clamped = rounded.clamp(Self::MIN as f64, Self::MAX as f64);
        BaaLevel(clamped as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// The static risk entry for this level. Total over 0..=4.
    pub fn risk_info(self) -> &'static RiskInfo {
        &RISK_TABLE[self.0 as usize]
    }
}

impl fmt::Display for BaaLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Risk table
// ---------------------------------------------------------------------------

/// Status and description shown to the caller for one BAA level.
#[derive(Debug, PartialEq, Eq)]
pub struct RiskInfo {
    pub status: &'static str,
    pub description: &'static str,
}

/// Risk information indexed by BAA level, 0 through 4.
pub static RISK_TABLE: [RiskInfo; 5] = [
    RiskInfo {
        status: "Healthy Conditions",
        description: "Coral reef are thriving with optimal water temperatures. \
                      Perfect conditions for coral growth and recovery.",
    },
    RiskInfo {
        status: "Bleaching Watch",
        description: "Early thermal stress detected in monitoring data. Sensitive \
                      coral species should be monitored closely for initial stress responses.",
    },
    RiskInfo {
        status: "Bleaching Warning",
        description: "Moderate thermal stress is affecting coral health. Bleaching \
                      may begin in sensitive species within the next few days.",
    },
    RiskInfo {
        status: "High Risk Alert",
        description: "High thermal stress detected across the reef system. Widespread \
                      coral bleaching is expected to occur soon.",
    },
    RiskInfo {
        status: "Critical Emergency",
        description: "Critical thermal stress levels reached. Severe coral bleaching \
                      and potential mortality are imminent without immediate intervention.",
    },
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_all_valid_levels() {
        for level in 0..=4 {
            let baa = BaaLevel::new(level).expect("levels 0..=4 must be accepted");
            assert_eq!(baa.value(), level as u8);
        }
    }

    #[test]
    fn test_new_rejects_out_of_range_levels() {
        assert!(BaaLevel::new(-1).is_none(), "-1 is below the BAA range");
        assert!(BaaLevel::new(5).is_none(), "5 is above the BAA range");
        assert!(BaaLevel::new(42).is_none());
    }

    #[test]
    fn test_regression_output_is_clamped_low() {
        // A badly extrapolating model can return large negative values;
        // those must clamp to 0, never panic or wrap.
        assert_eq!(BaaLevel::from_regression_output(-3.7).value(), 0);
        assert_eq!(BaaLevel::from_regression_output(-0.4).value(), 0);
    }

    #[test]
    fn test_regression_output_is_clamped_high() {
        assert_eq!(BaaLevel::from_regression_output(4.5).value(), 4);
        assert_eq!(BaaLevel::from_regression_output(11.0).value(), 4);
    }

    #[test]
    fn test_regression_output_rounds_to_nearest_level() {
        assert_eq!(BaaLevel::from_regression_output(1.4).value(), 1);
        assert_eq!(BaaLevel::from_regression_output(2.6).value(), 3);
    }

    #[test]
    fn test_non_finite_regression_output_clamps_to_zero() {
        assert_eq!(BaaLevel::from_regression_output(f64::NAN).value(), 0);
        assert_eq!(BaaLevel::from_regression_output(f64::INFINITY).value(), 0);
    }

    #[test]
    fn test_every_level_has_distinct_status() {
        let mut seen = std::collections::HashSet::new();
        for info in &RISK_TABLE {
            assert!(
                seen.insert(info.status),
                "duplicate status text '{}' in RISK_TABLE",
                info.status
            );
        }
    }

    #[test]
    fn test_risk_info_lookup_matches_table_order() {
        let watch = BaaLevel::new(1).unwrap();
        assert_eq!(watch.risk_info().status, "Bleaching Watch");
        let critical = BaaLevel::new(4).unwrap();
        assert_eq!(critical.risk_info().status, "Critical Emergency");
    }
}
