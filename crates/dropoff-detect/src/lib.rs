// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Early-bottleneck / late-recovery breakpoint detection for drop-off curves.
//!
//! ```
//! use dropoff_core::DetectorConfig;
//! use dropoff_detect::compute;
//!
//! let rows = [(0, 2.0), (10, 3.0), (20, 20.0), (30, 22.0), (40, 21.0), (50, 19.0),
//!             (60, 17.0), (70, 15.0), (80, 18.0), (90, 22.0), (100, 27.0)];
//! let result = compute(rows, &DetectorConfig::default()).expect("default config is valid");
//! assert_eq!((result.b1, result.b2), (Some(20), Some(80)));
//! ```

pub mod assemble;
pub mod delta;
pub mod detector;
pub mod early;
pub mod late;
pub mod reconcile;

pub use assemble::{Extent, assemble};
pub use delta::DeltaSeries;
pub use detector::{BreakpointDetector, compute};
pub use early::{EarlyOutcome, detect_early};
pub use late::{LateOutcome, detect_late};
pub use reconcile::{Reconciled, reconcile};
