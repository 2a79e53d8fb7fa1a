//! Solar forcing schedules
//!
//! The solar constant seen by the model is a function of simulation time.
//! Schedules implement [`SolarForcing`] and are injected into a model so that alternative
//! schedules can be substituted without touching the integrator.
//!
//! All schedules are expressed relative to a baseline solar constant $S_0$
//! which is owned by the model's physical constants.

use crate::errors::{RSEBMError, RSEBMResult};
use crate::timeseries::{FloatValue, Time};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A prescribed, time-dependent solar constant
///
/// Implementations must be pure functions of their inputs.
#[typetag::serde(tag = "type")]
pub trait SolarForcing: Debug + Send + Sync {
    /// Solar constant at time `t` (s) in W/m^2, given the baseline solar constant `s0`
    fn solar_constant(&self, t: Time, s0: FloatValue) -> FloatValue;

    /// Check the schedule's own parameters
    fn validate(&self) -> RSEBMResult<()> {
        Ok(())
    }
}

/// Linear increase of the solar constant over a fixed horizon
///
/// $$ S(t) = S_0 \left(f_{start} + (f_{end} - f_{start}) \frac{t - t_{start}}{t_{horizon}}\right) $$
///
/// The default fractions (0.75 to 1.0) describe a slow secular brightening
/// of the star from three quarters of its present output.
/// The ramp is not clamped outside of $[t_{start}, t_{start} + t_{horizon}]$.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRamp {
    /// Fraction of $S_0$ at $t = t_{start}$
    pub start_fraction: FloatValue,
    /// Fraction of $S_0$ at $t = t_{start} + t_{horizon}$
    pub end_fraction: FloatValue,
    /// Time at which the ramp begins
    /// unit: s
    /// Default: 0
    #[serde(default)]
    pub start: Time,
    /// Length of the ramp
    /// unit: s
    pub horizon: Time,
}

impl LinearRamp {
    /// Ramp from 75% to 100% of the baseline over `horizon` seconds, starting at `t = 0`
    pub fn new(horizon: Time) -> Self {
        Self::with_fractions(0.75, 1.0, horizon)
    }

    /// Ramp from 75% to 100% of the baseline, reaching 75% at `start` and 100% at `end`
    pub fn between(start: Time, end: Time) -> Self {
        Self {
            start,
            ..Self::new(end - start)
        }
    }

    pub fn with_fractions(start_fraction: FloatValue, end_fraction: FloatValue, horizon: Time) -> Self {
        Self {
            start_fraction,
            end_fraction,
            start: 0.0,
            horizon,
        }
    }
}

#[typetag::serde]
impl SolarForcing for LinearRamp {
    fn solar_constant(&self, t: Time, s0: FloatValue) -> FloatValue {
        let elapsed = t - self.start;
        s0 * (self.start_fraction
            + (self.end_fraction - self.start_fraction) * elapsed / self.horizon)
    }

    fn validate(&self) -> RSEBMResult<()> {
        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return Err(RSEBMError::Configuration(format!(
                "Forcing horizon must be positive, got {}",
                self.horizon
            )));
        }
        if !(self.start_fraction.is_finite() && self.end_fraction.is_finite()) {
            return Err(RSEBMError::Configuration(
                "Forcing fractions must be finite".to_string(),
            ));
        }
        if !self.start.is_finite() {
            return Err(RSEBMError::Configuration(format!(
                "Forcing start must be finite, got {}",
                self.start
            )));
        }
        Ok(())
    }
}

/// Time-invariant solar constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantForcing {
    /// Fraction of $S_0$ applied at all times
    pub fraction: FloatValue,
}

impl Default for ConstantForcing {
    fn default() -> Self {
        Self { fraction: 1.0 }
    }
}

#[typetag::serde]
impl SolarForcing for ConstantForcing {
    fn solar_constant(&self, _t: Time, s0: FloatValue) -> FloatValue {
        s0 * self.fraction
    }

    fn validate(&self) -> RSEBMResult<()> {
        if !self.fraction.is_finite() || self.fraction < 0.0 {
            return Err(RSEBMError::Configuration(format!(
                "Forcing fraction must be finite and non-negative, got {}",
                self.fraction
            )));
        }
        Ok(())
    }
}

/// Solar forcing schedule defined by a table of (time, fraction of $S_0$) points
///
/// Values are linearly interpolated between points and held constant
/// before the first and after the last point.
///
/// The table is checked whenever it is created, including when it is deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PiecewiseTable")]
pub struct PiecewiseLinearForcing {
    /// unit: s
    times: Vec<Time>,
    fractions: Vec<FloatValue>,
}

/// Unchecked form of [`PiecewiseLinearForcing`] as it appears in configuration
#[derive(Deserialize)]
struct PiecewiseTable {
    times: Vec<Time>,
    fractions: Vec<FloatValue>,
}

impl TryFrom<PiecewiseTable> for PiecewiseLinearForcing {
    type Error = RSEBMError;

    fn try_from(table: PiecewiseTable) -> RSEBMResult<Self> {
        Self::new(table.times, table.fractions)
    }
}

impl PiecewiseLinearForcing {
    pub fn new(times: Vec<Time>, fractions: Vec<FloatValue>) -> RSEBMResult<Self> {
        let forcing = Self { times, fractions };
        forcing.validate()?;
        Ok(forcing)
    }

    pub fn times(&self) -> &[Time] {
        &self.times
    }

    pub fn fractions(&self) -> &[FloatValue] {
        &self.fractions
    }

    fn fraction_at(&self, t: Time) -> FloatValue {
        let n = self.times.len();
        if t <= self.times[0] {
            return self.fractions[0];
        }
        if t >= self.times[n - 1] {
            return self.fractions[n - 1];
        }
        // First point strictly after t; guaranteed to be in 1..n by the checks above
        let upper = self.times.partition_point(|x| *x <= t);
        let lower = upper - 1;
        let (t0, t1) = (self.times[lower], self.times[upper]);
        let (f0, f1) = (self.fractions[lower], self.fractions[upper]);
        f0 + (f1 - f0) * (t - t0) / (t1 - t0)
    }
}

#[typetag::serde]
impl SolarForcing for PiecewiseLinearForcing {
    fn solar_constant(&self, t: Time, s0: FloatValue) -> FloatValue {
        s0 * self.fraction_at(t)
    }

    fn validate(&self) -> RSEBMResult<()> {
        if self.times.is_empty() {
            return Err(RSEBMError::Configuration(
                "Piecewise forcing needs at least one point".to_string(),
            ));
        }
        if self.times.len() != self.fractions.len() {
            return Err(RSEBMError::Configuration(format!(
                "Piecewise forcing has {} times but {} fractions",
                self.times.len(),
                self.fractions.len()
            )));
        }
        if self.times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(RSEBMError::Configuration(
                "Piecewise forcing times must be strictly increasing".to_string(),
            ));
        }
        if self
            .times
            .iter()
            .chain(self.fractions.iter())
            .any(|v| !v.is_finite())
        {
            return Err(RSEBMError::Configuration(
                "Piecewise forcing contains non-finite values".to_string(),
            ));
        }
        Ok(())
    }
}
