// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use thiserror::Error;

/// Errors surfaced at the detector boundary.
///
/// Bad data never produces an error; malformed rows are dropped and
/// degenerate curves take a fallback path. Only contract violations in the
/// caller-supplied configuration fail.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DropoffError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl DropoffError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Stable machine-readable code for structured error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}
