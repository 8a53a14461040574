// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Core shared types for drop-off breakpoint detection.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod provenance;
pub mod result;
pub mod series;

pub use config::{
    DEFAULT_EARLY_MAX, DEFAULT_MIN_GAP, DEFAULT_N_POS, DEFAULT_TAIL_MIN, DEFAULT_Z_K,
    DetectorConfig, DuplicatePolicy,
};
pub use diagnostics::{DIAGNOSTICS_SCHEMA_VERSION, Diagnostics, SearchStats};
pub use error::DropoffError;
pub use provenance::{Breakpoint, Detector, Rule, Tier};
pub use result::{BreakpointResult, EarlyStats, Zone, Zones};
pub use series::{
    Depth, DepthPoint, MAX_DEPTH, MIN_DEPTH, NormalizationReport, RawPoint, RawValue, Series,
};
