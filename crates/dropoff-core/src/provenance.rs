// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::series::Depth;

/// Detector that produced a breakpoint.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Detector {
    EarlyBottleneck,
    LateRecovery,
}

/// Position of a rule in its detector's decision chain.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Primary,
    Fallback,
    Absolute,
}

/// The rule that selected a breakpoint depth.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Largest positive, strictly local maximum of the delta in the early window.
    LocalPeak,
    /// Largest delta in the early window regardless of shape.
    MaxDelta,
    /// Early window was empty; first depth of the series.
    SeriesStart,
    /// First turn from non-increasing to increasing that stays positive.
    SustainedTurn,
    /// Lowest rate in the tail window.
    RateFloor,
    /// Tail window was empty; last depth of the series.
    SeriesEnd,
}

impl Rule {
    pub fn detector(self) -> Detector {
        match self {
            Self::LocalPeak | Self::MaxDelta | Self::SeriesStart => Detector::EarlyBottleneck,
            Self::SustainedTurn | Self::RateFloor | Self::SeriesEnd => Detector::LateRecovery,
        }
    }

    pub fn tier(self) -> Tier {
        match self {
            Self::LocalPeak | Self::SustainedTurn => Tier::Primary,
            Self::MaxDelta | Self::RateFloor => Tier::Fallback,
            Self::SeriesStart | Self::SeriesEnd => Tier::Absolute,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LocalPeak => "local_peak",
            Self::MaxDelta => "max_delta",
            Self::SeriesStart => "series_start",
            Self::SustainedTurn => "sustained_turn",
            Self::RateFloor => "rate_floor",
            Self::SeriesEnd => "series_end",
        }
    }
}

/// A detected depth plus the rule that chose it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Breakpoint {
    pub depth: Depth,
    pub rule: Rule,
}

impl Breakpoint {
    pub fn new(depth: Depth, rule: Rule) -> Self {
        Self { depth, rule }
    }

    pub fn detector(&self) -> Detector {
        self.rule.detector()
    }

    pub fn tier(&self) -> Tier {
        self.rule.tier()
    }
}
