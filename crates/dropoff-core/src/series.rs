// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::config::DuplicatePolicy;

/// Funnel or scroll depth, a percentage in `[0, 100]`.
pub type Depth = u32;

pub const MIN_DEPTH: Depth = 0;
pub const MAX_DEPTH: Depth = 100;

/// One uncoerced input cell.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RawValue {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl RawValue {
    /// Coerces the cell to a finite number, or `None` if it cannot be read.
    pub fn to_finite(&self) -> Option<f64> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
            Self::Missing => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for RawValue {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for RawValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

/// One input row as handed over by the data pipeline, before coercion.
///
/// With the `serde` feature this reads either `{"depth": .., "rate": ..}` or
/// a `[depth, rate]` pair; absent keys count as missing.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawPoint {
    #[cfg_attr(feature = "serde", serde(default))]
    pub depth: RawValue,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rate: RawValue,
}

impl<D: Into<RawValue>, R: Into<RawValue>> From<(D, R)> for RawPoint {
    fn from((depth, rate): (D, R)) -> Self {
        Self {
            depth: depth.into(),
            rate: rate.into(),
        }
    }
}

impl From<DepthPoint> for RawPoint {
    fn from(point: DepthPoint) -> Self {
        Self {
            depth: RawValue::from(point.depth),
            rate: RawValue::Number(point.rate),
        }
    }
}

/// A validated `(depth, rate)` sample.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthPoint {
    pub depth: Depth,
    pub rate: f64,
}

/// Counters describing what normalization did to the input rows.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    pub rows_seen: usize,
    pub rows_kept: usize,
    /// Rows where either field was missing, unparsable, or non-finite.
    pub dropped_unparsable: usize,
    /// Rows whose depth parsed but was fractional or outside `[0, 100]`.
    pub dropped_out_of_range: usize,
    /// Rows folded into another row at the same depth.
    pub duplicates_merged: usize,
}

impl NormalizationReport {
    pub fn rows_dropped(&self) -> usize {
        self.dropped_unparsable + self.dropped_out_of_range
    }
}

/// Depth-sorted curve with strictly increasing, unique depths.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    points: Vec<DepthPoint>,
}

enum Coerced {
    Kept(DepthPoint),
    Unparsable,
    OutOfRange,
}

fn coerce_depth(raw: f64) -> Option<Depth> {
    if raw.fract() != 0.0 || raw < f64::from(MIN_DEPTH) || raw > f64::from(MAX_DEPTH) {
        return None;
    }
    Some(raw as Depth)
}

fn coerce_row(row: &RawPoint) -> Coerced {
    let (Some(depth), Some(rate)) = (row.depth.to_finite(), row.rate.to_finite()) else {
        return Coerced::Unparsable;
    };
    match coerce_depth(depth) {
        Some(depth) => Coerced::Kept(DepthPoint { depth, rate }),
        None => Coerced::OutOfRange,
    }
}

fn merge_group(group: &[DepthPoint], policy: DuplicatePolicy) -> DepthPoint {
    debug_assert!(!group.is_empty());
    match policy {
        DuplicatePolicy::First => group[0],
        DuplicatePolicy::Last => group[group.len() - 1],
        DuplicatePolicy::Mean => {
            // Dividing before summing keeps the mean finite for finite inputs.
            let count = group.len() as f64;
            DepthPoint {
                depth: group[0].depth,
                rate: group.iter().map(|point| point.rate / count).sum(),
            }
        }
    }
}

impl Series {
    /// Coerces, sorts, and de-duplicates raw rows into a series.
    ///
    /// Never fails: rows that cannot be coerced are dropped and counted in the
    /// returned report.
    pub fn normalize<I, P>(rows: I, policy: DuplicatePolicy) -> (Self, NormalizationReport)
    where
        I: IntoIterator<Item = P>,
        P: Into<RawPoint>,
    {
        let mut report = NormalizationReport::default();
        let mut kept = Vec::new();

        for row in rows {
            report.rows_seen += 1;
            match coerce_row(&row.into()) {
                Coerced::Kept(point) => kept.push(point),
                Coerced::Unparsable => report.dropped_unparsable += 1,
                Coerced::OutOfRange => report.dropped_out_of_range += 1,
            }
        }

        // Stable sort keeps input order within a depth for First/Last.
        kept.sort_by_key(|point| point.depth);

        let mut points = Vec::with_capacity(kept.len());
        for group in kept.chunk_by(|left, right| left.depth == right.depth) {
            report.duplicates_merged += group.len() - 1;
            points.push(merge_group(group, policy));
        }
        report.rows_kept = points.len();

        if report.rows_dropped() > 0 || report.duplicates_merged > 0 {
            tracing::debug!(
                rows_seen = report.rows_seen,
                dropped_unparsable = report.dropped_unparsable,
                dropped_out_of_range = report.dropped_out_of_range,
                duplicates_merged = report.duplicates_merged,
                policy = policy.as_str(),
                "normalized drop-off series"
            );
        }

        (Self { points }, report)
    }

    pub fn points(&self) -> &[DepthPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn depth(&self, idx: usize) -> Depth {
        self.points[idx].depth
    }

    pub fn rate(&self, idx: usize) -> f64 {
        self.points[idx].rate
    }

    /// First depth (`xmin`), if any.
    pub fn first_depth(&self) -> Option<Depth> {
        self.points.first().map(|point| point.depth)
    }

    /// Last depth (`xmax`), if any.
    pub fn last_depth(&self) -> Option<Depth> {
        self.points.last().map(|point| point.depth)
    }
}
