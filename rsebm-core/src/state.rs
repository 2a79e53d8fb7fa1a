use crate::errors::{RSEBMError, RSEBMResult};
use crate::timeseries::{FloatValue, Time};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Zone temperatures at a single instant
///
/// Temperatures are in Kelvin and ordered by zone index (zone 1 first).
/// A state is never modified after creation; each integration step produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClimateState {
    temperatures: Vec<FloatValue>,
}

impl ClimateState {
    pub fn new(temperatures: Vec<FloatValue>) -> Self {
        Self { temperatures }
    }

    /// Create a state with every zone at the same temperature
    pub fn uniform(n_zones: usize, temperature: FloatValue) -> Self {
        Self::new(vec![temperature; n_zones])
    }

    pub fn temperatures(&self) -> &[FloatValue] {
        &self.temperatures
    }

    /// Temperature of a zone (0-indexed)
    pub fn temperature(&self, zone: usize) -> Option<FloatValue> {
        self.temperatures.get(zone).copied()
    }

    pub fn len(&self) -> usize {
        self.temperatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty()
    }

    /// Check that every temperature is finite and strictly positive.
    ///
    /// `time` is only used to annotate the error.
    pub fn validate(&self, time: Time) -> RSEBMResult<()> {
        check_domain(time, &self.temperatures)
    }

    pub fn to_model_state(&self) -> DVector<FloatValue> {
        DVector::from_column_slice(&self.temperatures)
    }

    pub fn from_model_state(y: &DVector<FloatValue>) -> Self {
        Self::new(y.iter().copied().collect())
    }
}

impl From<Vec<FloatValue>> for ClimateState {
    fn from(temperatures: Vec<FloatValue>) -> Self {
        Self::new(temperatures)
    }
}

/// Returns a `DomainViolation` for the first zone whose temperature is non-finite or not
/// strictly positive.
pub fn check_domain(time: Time, temperatures: &[FloatValue]) -> RSEBMResult<()> {
    match temperatures
        .iter()
        .position(|t| !t.is_finite() || *t <= 0.0)
    {
        Some(zone) => Err(RSEBMError::DomainViolation {
            time,
            zone,
            temperature: temperatures[zone],
            state: temperatures.to_vec(),
        }),
        None => Ok(()),
    }
}
