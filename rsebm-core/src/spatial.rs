//! Latitudinal zone grid used to aggregate zonal values
//!
//! A [`ZonalGrid`] describes a set of latitude bands and the fraction of the
//! planet's surface covered by each band.
//! The area fractions are used as weights when reducing zonal values
//! (for example temperatures) to a single global value.
//!
//! # Examples
//!
//! ```rust
//! use rsebm_core::spatial::ZonalGrid;
//!
//! let grid = ZonalGrid::equal_weights(2);
//! assert_eq!(grid.size(), 2);
//!
//! let global = grid.aggregate_global(&[250.0, 270.0]);
//! assert_eq!(global, 260.0);
//! ```

use crate::errors::{RSEBMError, RSEBMResult};
use crate::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Tolerance used when checking that weights sum to one
const WEIGHT_TOLERANCE: FloatValue = 1e-6;

/// A set of latitude bands with area-based weights
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZonalGrid {
    region_names: Vec<String>,
    weights: Vec<FloatValue>,
}

impl ZonalGrid {
    /// Create a grid with custom area weights
    ///
    /// Weights must be non-negative and sum to 1.0.
    pub fn with_weights(region_names: Vec<String>, weights: Vec<FloatValue>) -> RSEBMResult<Self> {
        if region_names.len() != weights.len() {
            return Err(RSEBMError::Configuration(format!(
                "Grid has {} region names but {} weights",
                region_names.len(),
                weights.len()
            )));
        }
        if weights.is_empty() {
            return Err(RSEBMError::Configuration(
                "Grid must contain at least one region".to_string(),
            ));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(RSEBMError::Configuration(format!(
                "Grid weights must be finite and non-negative, got {:?}",
                weights
            )));
        }
        let total: FloatValue = weights.iter().sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(RSEBMError::Configuration(format!(
                "Grid weights must sum to 1.0, got {}",
                total
            )));
        }

        Ok(Self {
            region_names,
            weights,
        })
    }

    /// Grid with `n` zones of identical area
    pub fn equal_weights(n: usize) -> Self {
        let n = n.max(1);
        Self {
            region_names: (1..=n).map(|i| format!("Zone {}", i)).collect(),
            weights: vec![1.0 / n as FloatValue; n],
        }
    }

    pub fn size(&self) -> usize {
        self.weights.len()
    }

    pub fn region_names(&self) -> &[String] {
        &self.region_names
    }

    pub fn weights(&self) -> &[FloatValue] {
        &self.weights
    }

    /// Area-weighted mean of the zonal values
    ///
    /// # Panics
    ///
    /// Panics if `values.len()` does not match `self.size()`
    pub fn aggregate_global(&self, values: &[FloatValue]) -> FloatValue {
        assert_eq!(
            values.len(),
            self.size(),
            "Value length {} does not match grid size {}",
            values.len(),
            self.size()
        );
        values
            .iter()
            .zip(self.weights.iter())
            .map(|(v, w)| v * w)
            .sum()
    }
}
