//! Latitudinal energy balance climate model
//!
//! The workspace is split into:
//!
//! - [`rsebm_core`]: solver plumbing, states, trajectories and forcing schedules
//! - [`rsebm_components`]: the parameter store and the zonal energy balance model
//! - this crate: scenario configuration tying the two together
//!
//! ```no_run
//! use rsebm::Scenario;
//!
//! let scenario = Scenario::reference().unwrap();
//! let trajectory = scenario.run().unwrap();
//! assert!(!trajectory.is_empty());
//! ```

pub mod scenario;

pub use rsebm_components;
pub use rsebm_core;
pub use scenario::{Scenario, ScenarioConfig, SimulationOptions};
