// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::assemble::{Extent, assemble};
use crate::delta::DeltaSeries;
use crate::early::detect_early;
use crate::late::detect_late;
use crate::reconcile::reconcile;
use dropoff_core::{
    BreakpointResult, DetectorConfig, Diagnostics, DropoffError, RawPoint, Series,
};
use std::borrow::Cow;

const ALGORITHM_NAME: &str = "dropoff_breakpoints";

/// Two-breakpoint detector over a single drop-off curve.
///
/// The configuration is validated once in [`BreakpointDetector::new`];
/// [`BreakpointDetector::detect`] is then infallible for any input rows.
#[derive(Clone, Debug, Default)]
pub struct BreakpointDetector {
    config: DetectorConfig,
}

impl BreakpointDetector {
    pub fn new(config: DetectorConfig) -> Result<Self, DropoffError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn detect<I, P>(&self, rows: I) -> BreakpointResult
    where
        I: IntoIterator<Item = P>,
        P: Into<RawPoint>,
    {
        let (series, report) = Series::normalize(rows, self.config.duplicate_policy);
        let mut diagnostics = Diagnostics {
            algorithm: Cow::Borrowed(ALGORITHM_NAME),
            normalization: report,
            ..Diagnostics::default()
        };
        if report.rows_dropped() > 0 {
            diagnostics.warnings.push(format!(
                "dropped {} malformed row(s) of {}",
                report.rows_dropped(),
                report.rows_seen
            ));
        }
        if report.duplicates_merged > 0 {
            diagnostics.notes.push(format!(
                "merged {} duplicate depth row(s) with policy={}",
                report.duplicates_merged,
                self.config.duplicate_policy.as_str()
            ));
        }

        self.detect_series(&series, diagnostics)
    }

    /// Runs the detectors over an already normalized series.
    pub fn detect_series(&self, series: &Series, diagnostics: Diagnostics) -> BreakpointResult {
        let deltas = DeltaSeries::from_series(series);
        let early = detect_early(series, &deltas, self.config.early_max, self.config.z_k);
        let late = detect_late(series, &deltas, self.config.tail_min, self.config.n_pos);

        let extent = series
            .first_depth()
            .zip(series.last_depth())
            .map(|(xmin, xmax)| Extent { xmin, xmax });
        let reconciled = match (early.breakpoint, late.breakpoint, extent) {
            (Some(first), Some(second), Some(extent)) => Some(reconcile(
                first.depth,
                second.depth,
                self.config.min_gap,
                extent.xmax,
            )),
            _ => None,
        };

        let result = assemble(extent, &early, &late, reconciled, diagnostics);
        tracing::debug!(
            b1 = ?result.b1,
            b2 = ?result.b2,
            points = series.len(),
            reconciled = result.diagnostics.reconciled,
            "drop-off breakpoints computed"
        );
        result
    }
}

/// Validates `config` and locates the two breakpoints of one curve.
///
/// Fails only on a configuration contract violation. Malformed, unsorted, or
/// duplicated rows are tolerated; an empty or fully invalid input yields
/// [`BreakpointResult::empty`].
pub fn compute<I, P>(rows: I, config: &DetectorConfig) -> Result<BreakpointResult, DropoffError>
where
    I: IntoIterator<Item = P>,
    P: Into<RawPoint>,
{
    let detector = BreakpointDetector::new(config.clone())?;
    Ok(detector.detect(rows))
}
