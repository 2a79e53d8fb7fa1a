use crate::timeseries::{FloatValue, Time};
use thiserror::Error;

/// Error type for invalid operations.
///
/// None of these errors are recovered from inside the crate.
/// Each carries enough state to reproduce the failure so that the caller can decide
/// whether to adjust tolerances, step bounds or parameters and start a fresh run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RSEBMError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Integration failed at t={time} s: {reason}")]
    Integration {
        reason: String,
        time: Time,
        last_state: Vec<FloatValue>,
    },
    #[error("Temperature of zone {zone} left the physical domain at t={time} s (T={temperature} K)")]
    DomainViolation {
        time: Time,
        zone: usize,
        temperature: FloatValue,
        state: Vec<FloatValue>,
    },
    #[error("Integration cancelled at t={time} s")]
    Cancelled {
        time: Time,
        last_state: Vec<FloatValue>,
    },
    #[error("Could not parse configuration: {0}")]
    Parse(String),
    #[error("Run has already been started. Construct a new run to integrate again")]
    RunAlreadyStarted,
}

/// Convenience type for `Result<T, RSEBMError>`.
pub type RSEBMResult<T> = Result<T, RSEBMError>;
