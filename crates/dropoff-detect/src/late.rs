// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::delta::DeltaSeries;
use dropoff_core::{Breakpoint, Depth, Rule, Series};

/// Output of the late recovery search.
#[derive(Clone, Debug, PartialEq)]
pub struct LateOutcome {
    pub breakpoint: Option<Breakpoint>,
    pub window_len: usize,
    pub turns_found: usize,
    pub turns_rejected: usize,
}

/// Indices `i >= 2` whose depth is at least `tail_min`.
fn tail_window(series: &Series, tail_min: Depth) -> Vec<usize> {
    (2..series.len())
        .filter(|&idx| series.depth(idx) >= tail_min)
        .collect()
}

/// Non-increasing step followed by an increasing one.
fn is_turn(deltas: &DeltaSeries, idx: usize) -> bool {
    deltas.at(idx - 1) <= 0.0 && deltas.at(idx) > 0.0
}

/// `n_pos` consecutive defined, positive deltas starting at `idx`.
fn is_sustained(deltas: &DeltaSeries, idx: usize, n_pos: usize) -> bool {
    (idx..idx.saturating_add(n_pos))
        .all(|k| deltas.defined(k).is_some_and(|delta| delta > 0.0))
}

/// Lowest rate in the window, first occurrence on ties.
fn rate_floor(series: &Series, window: &[usize]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for &idx in window {
        match best {
            Some(current) if series.rate(idx) >= series.rate(current) => {}
            _ => best = Some(idx),
        }
    }
    best
}

/// Finds where a sustained late rise in the drop-off rate begins.
///
/// Scans the tail window in depth order and stops at the first turn that
/// stays positive for `n_pos` steps. Without one, falls back to the lowest
/// rate in the tail, then to the last depth of the series.
pub fn detect_late(
    series: &Series,
    deltas: &DeltaSeries,
    tail_min: Depth,
    n_pos: usize,
) -> LateOutcome {
    let Some(xmax) = series.last_depth() else {
        return LateOutcome {
            breakpoint: None,
            window_len: 0,
            turns_found: 0,
            turns_rejected: 0,
        };
    };

    let window = tail_window(series, tail_min);
    let mut turns_found = 0usize;
    let mut turns_rejected = 0usize;
    let mut confirmed = None;

    for &idx in &window {
        if !is_turn(deltas, idx) {
            continue;
        }
        turns_found += 1;
        if is_sustained(deltas, idx, n_pos) {
            confirmed = Some(idx);
            break;
        }
        turns_rejected += 1;
    }

    let breakpoint = if let Some(idx) = confirmed {
        Breakpoint::new(series.depth(idx), Rule::SustainedTurn)
    } else if let Some(idx) = rate_floor(series, &window) {
        Breakpoint::new(series.depth(idx), Rule::RateFloor)
    } else {
        Breakpoint::new(xmax, Rule::SeriesEnd)
    };

    tracing::debug!(
        depth = breakpoint.depth,
        rule = breakpoint.rule.as_str(),
        window_len = window.len(),
        turns_found,
        turns_rejected,
        "late recovery selected"
    );

    LateOutcome {
        breakpoint: Some(breakpoint),
        window_len: window.len(),
        turns_found,
        turns_rejected,
    }
}
