// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::series::NormalizationReport;
use std::borrow::Cow;

/// Diagnostics schema version for breakpoint run metadata.
pub const DIAGNOSTICS_SCHEMA_VERSION: u32 = 1;

/// Counters describing how much of the curve each detector looked at.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub early_window_len: usize,
    pub peaks_found: usize,
    pub tail_window_len: usize,
    pub turns_found: usize,
    pub turns_rejected: usize,
}

/// Structured diagnostics captured from a detector execution.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostics {
    pub schema_version: u32,
    pub engine_version: Option<String>,
    pub algorithm: Cow<'static, str>,
    pub normalization: NormalizationReport,
    pub search: SearchStats,
    /// Whether the reconciler moved the second breakpoint.
    pub reconciled: bool,
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            schema_version: DIAGNOSTICS_SCHEMA_VERSION,
            engine_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            algorithm: Cow::Borrowed(""),
            normalization: NormalizationReport::default(),
            search: SearchStats::default(),
            reconciled: false,
            notes: vec![],
            warnings: vec![],
        }
    }
}
