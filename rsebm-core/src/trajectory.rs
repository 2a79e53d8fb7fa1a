use crate::errors::{RSEBMError, RSEBMResult};
use crate::spatial::ZonalGrid;
use crate::state::ClimateState;
use crate::timeseries::{FloatValue, Time};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub time: Time,
    pub state: ClimateState,
}

/// The recorded history of zone temperatures produced by one integration run.
///
/// Points are ordered by strictly increasing time.
/// A trajectory can only be appended to while a run is in progress;
/// callers only ever receive shared references to a finished trajectory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Start a trajectory from the initial condition of a run
    pub fn with_initial(time: Time, state: ClimateState) -> Self {
        Self {
            points: vec![TrajectoryPoint { time, state }],
        }
    }

    /// Append a point
    ///
    /// The time must be later than the last recorded time and the state must have the same
    /// number of zones as the rest of the trajectory.
    pub(crate) fn push(&mut self, time: Time, state: ClimateState) -> RSEBMResult<()> {
        if let Some(last) = self.points.last() {
            if time <= last.time {
                return Err(RSEBMError::Integration {
                    reason: format!(
                        "Trajectory times must be strictly increasing ({} after {})",
                        time, last.time
                    ),
                    time: last.time,
                    last_state: last.state.temperatures().to_vec(),
                });
            }
            if state.len() != last.state.len() {
                return Err(RSEBMError::Integration {
                    reason: format!(
                        "State has {} zones, expected {}",
                        state.len(),
                        last.state.len()
                    ),
                    time,
                    last_state: last.state.temperatures().to_vec(),
                });
            }
        }
        self.points.push(TrajectoryPoint { time, state });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrajectoryPoint> {
        self.points.iter()
    }

    pub fn first(&self) -> Option<&TrajectoryPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TrajectoryPoint> {
        self.points.last()
    }

    /// Number of zones in each recorded state
    pub fn n_zones(&self) -> usize {
        self.points.first().map(|p| p.state.len()).unwrap_or(0)
    }

    pub fn times(&self) -> Array1<Time> {
        self.points.iter().map(|p| p.time).collect()
    }

    /// Temperature history of a single zone (0-indexed)
    pub fn zone_series(&self, zone: usize) -> Option<Array1<FloatValue>> {
        if zone >= self.n_zones() {
            return None;
        }
        Some(
            self.points
                .iter()
                .map(|p| p.state.temperatures()[zone])
                .collect(),
        )
    }

    /// Temperatures as a `(n_points, n_zones)` array
    pub fn to_array(&self) -> Array2<FloatValue> {
        Array2::from_shape_fn((self.len(), self.n_zones()), |(i, j)| {
            self.points[i].state.temperatures()[j]
        })
    }

    /// Area-weighted global mean temperature at each recorded time
    pub fn global_mean_series(&self, grid: &ZonalGrid) -> Array1<FloatValue> {
        self.points
            .iter()
            .map(|p| grid.aggregate_global(p.state.temperatures()))
            .collect()
    }

    /// State at an arbitrary time, linearly interpolated between recorded points
    ///
    /// Returns `None` if `time` lies outside of the recorded range.
    pub fn at_time(&self, time: Time) -> Option<ClimateState> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        if time < first.time || time > last.time {
            return None;
        }

        let upper = self.points.partition_point(|p| p.time < time);
        let after = &self.points[upper];
        if after.time == time || upper == 0 {
            return Some(after.state.clone());
        }
        let before = &self.points[upper - 1];
        let weight = (time - before.time) / (after.time - before.time);

        Some(ClimateState::new(
            before
                .state
                .temperatures()
                .iter()
                .zip(after.state.temperatures())
                .map(|(t0, t1)| t0 + weight * (t1 - t0))
                .collect(),
        ))
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectoryPoint;
    type IntoIter = std::slice::Iter<'a, TrajectoryPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
