// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::diagnostics::Diagnostics;
use crate::provenance::Breakpoint;
use crate::series::Depth;

/// Closed depth interval `[start, end]`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Zone {
    pub start: Depth,
    pub end: Depth,
}

impl Zone {
    pub fn width(&self) -> Depth {
        self.end.saturating_sub(self.start)
    }

    pub fn contains(&self, depth: Depth) -> bool {
        self.start <= depth && depth <= self.end
    }
}

/// The three contiguous shading regions `[xmin,b1]`, `[b1,b2]`, `[b2,xmax]`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Zones {
    pub bottleneck: Zone,
    pub middle: Zone,
    pub recovery: Zone,
}

impl Zones {
    pub fn new(xmin: Depth, b1: Depth, b2: Depth, xmax: Depth) -> Self {
        Self {
            bottleneck: Zone {
                start: xmin,
                end: b1,
            },
            middle: Zone { start: b1, end: b2 },
            recovery: Zone {
                start: b2,
                end: xmax,
            },
        }
    }

    pub fn as_array(&self) -> [Zone; 3] {
        [self.bottleneck, self.middle, self.recovery]
    }
}

/// Population statistics of the early-window deltas.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EarlyStats {
    pub mean: f64,
    pub std_dev: f64,
    /// `mean + z_k * std_dev`.
    pub threshold: f64,
    pub sample_count: usize,
}

/// Output of one detector run over one curve.
///
/// Every field is optional; an empty or fully invalid input yields
/// [`BreakpointResult::empty`]. Whenever both are present, `b1 <= b2`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct BreakpointResult {
    /// Reconciled end of the bottleneck zone.
    pub b1: Option<Depth>,
    /// Reconciled start of the recovery zone.
    pub b2: Option<Depth>,
    /// Early detector output before reconciliation.
    pub first: Option<Breakpoint>,
    /// Late detector output before reconciliation.
    pub second: Option<Breakpoint>,
    pub early_threshold: Option<f64>,
    pub early_mean: Option<f64>,
    pub early_std_dev: Option<f64>,
    pub xmin: Option<Depth>,
    pub xmax: Option<Depth>,
    pub zones: Option<Zones>,
    pub diagnostics: Diagnostics,
}

impl BreakpointResult {
    pub fn empty(diagnostics: Diagnostics) -> Self {
        Self {
            b1: None,
            b2: None,
            first: None,
            second: None,
            early_threshold: None,
            early_mean: None,
            early_std_dev: None,
            xmin: None,
            xmax: None,
            zones: None,
            diagnostics,
        }
    }

    pub fn first_depth(&self) -> Option<Depth> {
        self.first.map(|breakpoint| breakpoint.depth)
    }

    pub fn second_depth(&self) -> Option<Depth> {
        self.second.map(|breakpoint| breakpoint.depth)
    }

    pub fn is_empty(&self) -> bool {
        self.b1.is_none() && self.b2.is_none() && self.xmin.is_none() && self.xmax.is_none()
    }
}
