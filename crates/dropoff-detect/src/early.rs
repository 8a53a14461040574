// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::delta::DeltaSeries;
use dropoff_core::{Breakpoint, Depth, EarlyStats, Rule, Series};

/// Output of the early bottleneck search.
#[derive(Clone, Debug, PartialEq)]
pub struct EarlyOutcome {
    pub breakpoint: Option<Breakpoint>,
    pub stats: Option<EarlyStats>,
    pub window_len: usize,
    pub peaks_found: usize,
}

#[derive(Clone, Copy, Debug)]
struct CandidateScore {
    idx: usize,
    delta: f64,
}

/// Indices `i >= 1` whose depth is at most `early_max`.
fn early_window(series: &Series, early_max: Depth) -> Vec<usize> {
    (1..series.len())
        .filter(|&idx| series.depth(idx) <= early_max)
        .collect()
}

fn population_stats(deltas: &DeltaSeries, window: &[usize], z_k: f64) -> Option<EarlyStats> {
    if window.len() < 2 {
        return None;
    }

    let count = window.len() as f64;
    let mean = window.iter().map(|&idx| deltas.at(idx)).sum::<f64>() / count;
    let variance = window
        .iter()
        .map(|&idx| {
            let centered = deltas.at(idx) - mean;
            centered * centered
        })
        .sum::<f64>()
        / count;
    let std_dev = variance.sqrt();

    Some(EarlyStats {
        mean,
        std_dev,
        threshold: mean + z_k * std_dev,
        sample_count: window.len(),
    })
}

/// Positive strict local maxima of the delta with both neighbours in range.
fn local_peaks(deltas: &DeltaSeries, window: &[usize], n: usize) -> Vec<CandidateScore> {
    window
        .iter()
        .copied()
        .filter(|&idx| idx >= 1 && idx + 1 < n)
        .filter_map(|idx| {
            let delta = deltas.at(idx);
            let is_peak =
                delta > 0.0 && delta > deltas.at(idx - 1) && delta > deltas.at(idx + 1);
            is_peak.then_some(CandidateScore { idx, delta })
        })
        .collect()
}

/// Largest delta, first occurrence on ties; NaN never wins.
fn strongest(candidates: impl IntoIterator<Item = CandidateScore>) -> Option<CandidateScore> {
    let mut best: Option<CandidateScore> = None;
    for candidate in candidates {
        let score = if candidate.delta.is_nan() {
            f64::NEG_INFINITY
        } else {
            candidate.delta
        };
        match best {
            Some(current) if score <= current.delta => {}
            _ => {
                best = Some(CandidateScore {
                    idx: candidate.idx,
                    delta: score,
                })
            }
        }
    }
    best
}

/// Finds the earliest abnormal acceleration in the drop-off rate.
///
/// Tries, in order: the strongest positive local peak of the delta inside the
/// early window, the strongest delta inside the window, and finally the first
/// depth of the series when the window is empty. The window statistics are
/// reported alongside but never gate the search.
pub fn detect_early(
    series: &Series,
    deltas: &DeltaSeries,
    early_max: Depth,
    z_k: f64,
) -> EarlyOutcome {
    let Some(xmin) = series.first_depth() else {
        return EarlyOutcome {
            breakpoint: None,
            stats: None,
            window_len: 0,
            peaks_found: 0,
        };
    };

    let window = early_window(series, early_max);
    let stats = population_stats(deltas, &window, z_k);
    let peaks = local_peaks(deltas, &window, series.len());

    let breakpoint = if let Some(peak) = strongest(peaks.iter().copied()) {
        Breakpoint::new(series.depth(peak.idx), Rule::LocalPeak)
    } else if let Some(max) = strongest(window.iter().map(|&idx| CandidateScore {
        idx,
        delta: deltas.at(idx),
    })) {
        Breakpoint::new(series.depth(max.idx), Rule::MaxDelta)
    } else {
        Breakpoint::new(xmin, Rule::SeriesStart)
    };

    tracing::debug!(
        depth = breakpoint.depth,
        rule = breakpoint.rule.as_str(),
        window_len = window.len(),
        peaks_found = peaks.len(),
        "early bottleneck selected"
    );

    EarlyOutcome {
        breakpoint: Some(breakpoint),
        stats,
        window_len: window.len(),
        peaks_found: peaks.len(),
    }
}
