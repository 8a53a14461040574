// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use dropoff_core::Series;

/// First difference of the rate, aligned with the series by index.
///
/// Index 0 has no predecessor and holds NaN, as does any index past the end.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeltaSeries {
    values: Vec<f64>,
}

impl DeltaSeries {
    pub fn from_series(series: &Series) -> Self {
        let points = series.points();
        let mut values = Vec::with_capacity(points.len());
        if !points.is_empty() {
            values.push(f64::NAN);
        }
        values.extend(points.windows(2).map(|pair| pair[1].rate - pair[0].rate));
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Delta at `idx`, NaN when undefined or out of range.
    ///
    /// Comparisons against NaN are false, which is how the detectors treat
    /// missing neighbours.
    pub fn at(&self, idx: usize) -> f64 {
        self.values.get(idx).copied().unwrap_or(f64::NAN)
    }

    /// Delta at `idx` when defined.
    pub fn defined(&self, idx: usize) -> Option<f64> {
        self.values.get(idx).copied().filter(|value| !value.is_nan())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}
