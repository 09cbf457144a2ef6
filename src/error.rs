//! Error types for the planning core
//!
//! The engines themselves never fail on out-of-range business values; they
//! degrade to zero or to a non-viable result. The only engine-level rejection
//! is a projection horizon that does not move forward in time. Everything else
//! here comes from loading profiles and schedules off disk.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the planning core and its loaders
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Retirement age is not after the current age
    #[error("retirement age {target_age} must be after current age {current_age}")]
    InvalidHorizon { current_age: u32, target_age: u32 },

    /// Reading a profile or schedule file failed
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A schedule table could not be parsed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A profile or assumption file could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A schedule table parsed but is not usable (empty, overlapping bands, ...)
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    /// An input record carries a value the loader does not recognise
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl PlannerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlannerError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_horizon_message() {
        let err = PlannerError::InvalidHorizon {
            current_age: 67,
            target_age: 65,
        };
        assert_eq!(
            err.to_string(),
            "retirement age 65 must be after current age 67"
        );
    }
}
