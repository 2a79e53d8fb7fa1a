//! Options for the adaptive Runge-Kutta solver

use crate::errors::{RSEBMError, RSEBMResult};
use crate::timeseries::{days_to_seconds, FloatValue, Time};
use serde::{Deserialize, Serialize};

/// Solver options for the ODE integration
///
/// These map directly onto the controls of the DOP853 integrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Upper bound on the step size.
    /// Prevents the solver from stepping over slow changes in forcing.
    /// unit: s
    /// Default: 276 days
    pub max_step: Time,

    /// Absolute error tolerance.
    /// unit: K
    /// Default: 1e-6
    pub tolerance_abs: FloatValue,

    /// Relative error tolerance.
    /// Default: 1e-3
    pub tolerance_rel: FloatValue,

    /// Maximum number of internal steps before the run fails.
    /// Default: 500 000
    pub max_steps: u32,

    /// First trial step size.
    /// `0.0` lets the solver pick one from the initial derivative.
    /// unit: s
    /// Default: 0.0
    pub initial_step: Time,

    /// Number of accepted steps between stiffness tests.
    /// `None` disables stiffness detection.
    /// Default: None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stiffness_check_interval: Option<u32>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_step: days_to_seconds(276.0),
            tolerance_abs: 1e-6,
            tolerance_rel: 1e-3,
            max_steps: 500_000,
            initial_step: 0.0,
            stiffness_check_interval: None,
        }
    }
}

impl SolverOptions {
    pub fn with_max_step(self, max_step: Time) -> Self {
        Self { max_step, ..self }
    }

    pub fn with_tolerances(self, tolerance_abs: FloatValue, tolerance_rel: FloatValue) -> Self {
        Self {
            tolerance_abs,
            tolerance_rel,
            ..self
        }
    }

    pub fn with_max_steps(self, max_steps: u32) -> Self {
        Self { max_steps, ..self }
    }

    /// Value handed to the solver for its stiffness test interval
    pub(crate) fn stiffness_interval(&self) -> u32 {
        // The test runs when the accepted step count is a multiple of this value, so
        // u32::MAX is never reached in practice
        self.stiffness_check_interval.unwrap_or(u32::MAX)
    }

    pub fn validate(&self) -> RSEBMResult<()> {
        if !(self.max_step.is_finite() && self.max_step > 0.0) {
            return Err(RSEBMError::Configuration(format!(
                "max_step must be positive, got {}",
                self.max_step
            )));
        }
        if !(self.tolerance_abs.is_finite() && self.tolerance_abs > 0.0) {
            return Err(RSEBMError::Configuration(format!(
                "tolerance_abs must be positive, got {}",
                self.tolerance_abs
            )));
        }
        if !(self.tolerance_rel.is_finite() && self.tolerance_rel > 0.0) {
            return Err(RSEBMError::Configuration(format!(
                "tolerance_rel must be positive, got {}",
                self.tolerance_rel
            )));
        }
        if self.max_steps == 0 {
            return Err(RSEBMError::Configuration(
                "max_steps must be at least 1".to_string(),
            ));
        }
        if !(self.initial_step.is_finite() && self.initial_step >= 0.0) {
            return Err(RSEBMError::Configuration(format!(
                "initial_step must be non-negative, got {}",
                self.initial_step
            )));
        }
        if self.stiffness_check_interval == Some(0) {
            return Err(RSEBMError::Configuration(
                "stiffness_check_interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
