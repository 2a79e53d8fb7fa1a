//! Scenario configuration
//!
//! A scenario bundles everything needed for one integration: the model parameters, the
//! forcing schedule, the initial condition and the solver controls.
//! The whole payload can be written as TOML:
//!
//! ```toml
//! [simulation]
//! t0 = 0.0
//! t_end = 126230400000.0
//! initial_state = [244.3, 256.9, 264.5, 262.2, 259.2, 247.2]
//! max_step = 23846400.0
//!
//! [forcing]
//! type = "ConstantForcing"
//! fraction = 1.0
//!
//! [parameters.constants]
//! solar_constant = 1361.0
//! ```
//!
//! Omitted values are filled in from the reference six-zone configuration.
//! Without a `[forcing]` table the solar constant ramps from 75% to 100% of its baseline
//! between `t0` and `t_end`.

use log::info;
use rsebm_components::components::{
    ZonalEnergyBalance, REFERENCE_HORIZON_YEARS, REFERENCE_INITIAL_TEMPERATURES,
};
use rsebm_components::parameters::{ModelParameters, ParameterStore};
use rsebm_core::errors::{RSEBMError, RSEBMResult};
use rsebm_core::forcing::{LinearRamp, SolarForcing};
use rsebm_core::run::IntegrationRun;
use rsebm_core::solver::SolverOptions;
use rsebm_core::state::ClimateState;
use rsebm_core::timeseries::{years_to_seconds, Time};
use rsebm_core::trajectory::Trajectory;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Time span, initial condition and solver controls of a simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    /// Start time.
    /// unit: s
    /// Default: 0
    pub t0: Time,

    /// End time.
    /// unit: s
    /// Default: 4000 years
    pub t_end: Time,

    /// Zone temperatures at `t0`.
    /// unit: K
    pub initial_state: ClimateState,

    #[serde(flatten)]
    pub solver: SolverOptions,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            t0: 0.0,
            t_end: years_to_seconds(REFERENCE_HORIZON_YEARS),
            initial_state: ClimateState::new(REFERENCE_INITIAL_TEMPERATURES.to_vec()),
            solver: SolverOptions::default(),
        }
    }
}

/// Configuration payload for a [`Scenario`]
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub simulation: SimulationOptions,

    /// Solar forcing schedule.
    /// Defaults to a [`LinearRamp`] over `[t0, t_end]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forcing: Option<Box<dyn SolarForcing>>,

    pub parameters: ModelParameters,
}

impl ScenarioConfig {
    pub fn from_toml_str(content: &str) -> RSEBMResult<Self> {
        toml::from_str(content).map_err(|e| RSEBMError::Parse(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> RSEBMResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RSEBMError::Parse(format!("Could not read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> RSEBMResult<String> {
        toml::to_string(self).map_err(|e| RSEBMError::Parse(e.to_string()))
    }
}

/// A validated, ready to run scenario
///
/// Each scenario owns its own parameter store and forcing schedule,
/// so any number of scenarios can be run side by side.
#[derive(Debug, Clone)]
pub struct Scenario {
    model: ZonalEnergyBalance,
    simulation: SimulationOptions,
}

impl Scenario {
    pub fn new(config: ScenarioConfig) -> RSEBMResult<Self> {
        let ScenarioConfig {
            simulation,
            forcing,
            parameters,
        } = config;

        let store = Arc::new(ParameterStore::new(parameters)?);
        let forcing: Arc<dyn SolarForcing> = match forcing {
            Some(forcing) => Arc::from(forcing),
            None => Arc::new(LinearRamp::between(simulation.t0, simulation.t_end)),
        };
        let model = ZonalEnergyBalance::new(store, forcing)?;

        if simulation.initial_state.len() != model.n_zones() {
            return Err(RSEBMError::Configuration(format!(
                "Expected {} initial temperatures, got {}",
                model.n_zones(),
                simulation.initial_state.len()
            )));
        }
        simulation.solver.validate()?;

        Ok(Self { model, simulation })
    }

    /// The reference six-zone scenario
    pub fn reference() -> RSEBMResult<Self> {
        Self::new(ScenarioConfig::default())
    }

    pub fn from_toml_str(content: &str) -> RSEBMResult<Self> {
        Self::new(ScenarioConfig::from_toml_str(content)?)
    }

    pub fn model(&self) -> &ZonalEnergyBalance {
        &self.model
    }

    pub fn simulation(&self) -> &SimulationOptions {
        &self.simulation
    }

    /// Create a fresh, not yet started, run of this scenario
    pub fn to_run(&self) -> RSEBMResult<IntegrationRun<ZonalEnergyBalance>> {
        self.model.clone().into_run(
            self.simulation.initial_state.clone(),
            self.simulation.t0,
            self.simulation.t_end,
            self.simulation.solver.clone(),
        )
    }

    /// Integrate the scenario to completion
    pub fn run(&self) -> RSEBMResult<Trajectory> {
        info!(
            "Running scenario with {} zones and forcing {:?}",
            self.model.n_zones(),
            self.model.forcing()
        );
        let mut run = self.to_run()?;
        run.run()?;
        run.into_result()
    }
}
