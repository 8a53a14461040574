// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::DropoffError;
use crate::series::{Depth, MAX_DEPTH};

pub const DEFAULT_EARLY_MAX: Depth = 70;
pub const DEFAULT_Z_K: f64 = 1.5;
pub const DEFAULT_TAIL_MIN: Depth = 60;
pub const DEFAULT_N_POS: usize = 2;
pub const DEFAULT_MIN_GAP: Depth = 10;

/// Which row survives when several input rows share a depth.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Earliest row in input order wins.
    First,
    /// Latest row in input order wins.
    #[default]
    Last,
    /// Rates of all rows at the depth are averaged.
    Mean,
}

impl DuplicatePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Mean => "mean",
        }
    }
}

/// Configuration for the breakpoint detector.
///
/// Override a subset with struct update syntax:
///
/// ```
/// use dropoff_core::DetectorConfig;
///
/// let config = DetectorConfig {
///     n_pos: 3,
///     ..DetectorConfig::default()
/// };
/// assert_eq!(config.early_max, 70);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
    /// Inclusive upper depth bound of the early search window.
    pub early_max: Depth,
    /// Standard-deviation multiplier for the early anomaly threshold.
    pub z_k: f64,
    /// Inclusive lower depth bound of the late search window.
    pub tail_min: Depth,
    /// Consecutive positive deltas required to confirm a late uptrend.
    pub n_pos: usize,
    /// Minimum separation pushed between the two breakpoints on conflict.
    pub min_gap: Depth,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            early_max: DEFAULT_EARLY_MAX,
            z_k: DEFAULT_Z_K,
            tail_min: DEFAULT_TAIL_MIN,
            n_pos: DEFAULT_N_POS,
            min_gap: DEFAULT_MIN_GAP,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), DropoffError> {
        if !self.z_k.is_finite() {
            return Err(DropoffError::invalid_config(format!(
                "DetectorConfig.z_k must be finite; got {}",
                self.z_k
            )));
        }
        if self.early_max > MAX_DEPTH {
            return Err(DropoffError::invalid_config(format!(
                "DetectorConfig.early_max must be <= {MAX_DEPTH}; got {}",
                self.early_max
            )));
        }
        if self.tail_min > MAX_DEPTH {
            return Err(DropoffError::invalid_config(format!(
                "DetectorConfig.tail_min must be <= {MAX_DEPTH}; got {}",
                self.tail_min
            )));
        }
        if self.min_gap > MAX_DEPTH {
            return Err(DropoffError::invalid_config(format!(
                "DetectorConfig.min_gap must be <= {MAX_DEPTH}; got {}",
                self.min_gap
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DetectorConfig, DuplicatePolicy};

    #[test]
    fn defaults_match_documented_constants() {
        let config = DetectorConfig::default();
        assert_eq!(config.early_max, 70);
        assert_eq!(config.z_k, 1.5);
        assert_eq!(config.tail_min, 60);
        assert_eq!(config.n_pos, 2);
        assert_eq!(config.min_gap, 10);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Last);
        config.validate().expect("default config should be valid");
    }

    #[test]
    fn non_finite_z_k_is_rejected() {
        for z_k in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = DetectorConfig {
                z_k,
                ..DetectorConfig::default()
            }
            .validate()
            .expect_err("non-finite z_k must fail");
            assert!(err.to_string().contains("z_k"));
        }
    }

    #[test]
    fn bounds_outside_depth_domain_are_rejected() {
        let err = DetectorConfig {
            early_max: 101,
            ..DetectorConfig::default()
        }
        .validate()
        .expect_err("early_max > 100 must fail");
        assert!(err.to_string().contains("early_max"));

        let err = DetectorConfig {
            tail_min: 250,
            ..DetectorConfig::default()
        }
        .validate()
        .expect_err("tail_min > 100 must fail");
        assert!(err.to_string().contains("tail_min"));

        let err = DetectorConfig {
            min_gap: 101,
            ..DetectorConfig::default()
        }
        .validate()
        .expect_err("min_gap > 100 must fail");
        assert!(err.to_string().contains("min_gap"));
    }

    #[test]
    fn zero_n_pos_and_zero_gap_are_allowed() {
        DetectorConfig {
            n_pos: 0,
            min_gap: 0,
            z_k: -1.0,
            ..DetectorConfig::default()
        }
        .validate()
        .expect("zero counts are valid");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_overrides_keep_defaults() {
        let config: DetectorConfig = serde_json::from_str(r#"{"n_pos": 3, "duplicate_policy": "mean"}"#)
            .expect("partial config should deserialize");
        assert_eq!(config.n_pos, 3);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Mean);
        assert_eq!(config.early_max, 70);
        assert_eq!(config.min_gap, 10);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn negative_counts_fail_to_deserialize() {
        let err = serde_json::from_str::<DetectorConfig>(r#"{"n_pos": -1}"#)
            .expect_err("negative n_pos must be rejected");
        assert!(err.to_string().contains("invalid value"));

        serde_json::from_str::<DetectorConfig>(r#"{"min_gap": -5}"#)
            .expect_err("negative min_gap must be rejected");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn unknown_fields_are_rejected() {
        serde_json::from_str::<DetectorConfig>(r#"{"earlyMax": 50}"#)
            .expect_err("unknown keys must be rejected");
    }
}
