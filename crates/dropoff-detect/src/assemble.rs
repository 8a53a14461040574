// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::early::EarlyOutcome;
use crate::late::LateOutcome;
use crate::reconcile::Reconciled;
use dropoff_core::{BreakpointResult, Depth, Diagnostics, SearchStats, Zones};

/// Bounds of the normalized series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extent {
    pub xmin: Depth,
    pub xmax: Depth,
}

/// Packages detector outputs into a [`BreakpointResult`].
///
/// Zones are only built when both breakpoints and the extent are known.
pub fn assemble(
    extent: Option<Extent>,
    early: &EarlyOutcome,
    late: &LateOutcome,
    reconciled: Option<Reconciled>,
    mut diagnostics: Diagnostics,
) -> BreakpointResult {
    diagnostics.search = SearchStats {
        early_window_len: early.window_len,
        peaks_found: early.peaks_found,
        tail_window_len: late.window_len,
        turns_found: late.turns_found,
        turns_rejected: late.turns_rejected,
    };

    let (Some(extent), Some(reconciled)) = (extent, reconciled) else {
        return BreakpointResult::empty(diagnostics);
    };

    if let Some(first) = early.breakpoint {
        diagnostics
            .notes
            .push(format!("first={}@{}", first.rule.as_str(), first.depth));
    }
    if let Some(second) = late.breakpoint {
        diagnostics
            .notes
            .push(format!("second={}@{}", second.rule.as_str(), second.depth));
    }
    diagnostics.reconciled = reconciled.pushed;
    if reconciled.pushed {
        diagnostics.notes.push(format!(
            "reconciled: b2 moved to {} after b1={}",
            reconciled.b2, reconciled.b1
        ));
    }
    if !reconciled.gap_honored {
        diagnostics.warnings.push(format!(
            "min_gap not honored at right boundary: b1={}, b2={}, xmax={}",
            reconciled.b1, reconciled.b2, extent.xmax
        ));
    }

    BreakpointResult {
        b1: Some(reconciled.b1),
        b2: Some(reconciled.b2),
        first: early.breakpoint,
        second: late.breakpoint,
        early_threshold: early.stats.map(|stats| stats.threshold),
        early_mean: early.stats.map(|stats| stats.mean),
        early_std_dev: early.stats.map(|stats| stats.std_dev),
        xmin: Some(extent.xmin),
        xmax: Some(extent.xmax),
        zones: Some(Zones::new(
            extent.xmin,
            reconciled.b1,
            reconciled.b2,
            extent.xmax,
        )),
        diagnostics,
    }
}
