//! Latitudinal energy balance model
//!
//! Each zone gains energy by absorbing sunlight, loses it by emitting longwave radiation to
//! space and exchanges it with its neighbours in proportion to their temperature difference.
//!
//! For zone $i$ with temperature $T_i$:
//!
//! $$ R_i = \gamma_i (1 - \alpha_{sky}) (1 - \alpha_i) S(t) - \epsilon \tau \sigma T_i^4 $$
//! $$ \frac{dT_i}{dt} = \frac{R_i + Q_i / A_i}{\rho_i c_i z_i} $$
//!
//! where $Q_i$ is the net heat flow (W) into the zone across its boundaries.
//! A boundary $b$ joins zones $b$ and $b + 1$ and carries
//! $q_b = L_b k_b (T_{b+1} - T_b)$ into zone $b$ and out of zone $b + 1$,
//! so conduction only moves energy around.

use crate::parameters::ParameterStore;
use rsebm_core::errors::{RSEBMError, RSEBMResult};
use rsebm_core::forcing::{LinearRamp, SolarForcing};
use rsebm_core::ivp::{ModelState, IVP};
use rsebm_core::run::IntegrationRun;
use rsebm_core::solver::SolverOptions;
use rsebm_core::spatial::ZonalGrid;
use rsebm_core::state::ClimateState;
use rsebm_core::timeseries::{FloatValue, Time};
use std::sync::Arc;

/// Zone temperatures (K), north to south, at the start of the reference run
pub const REFERENCE_INITIAL_TEMPERATURES: [FloatValue; 6] = [
    244.31043415,
    256.9900539,
    264.49181217,
    262.18171593,
    259.17096089,
    247.23991597,
];

/// Length of the reference run
pub const REFERENCE_HORIZON_YEARS: FloatValue = 4000.0;

/// Largest step taken during the reference run
pub const REFERENCE_MAX_STEP_DAYS: FloatValue = 276.0;

/// Zonal energy balance model
///
/// The model itself holds no state; everything it needs to evaluate the temperature
/// tendencies is read from the parameter store and the forcing schedule.
#[derive(Debug, Clone)]
pub struct ZonalEnergyBalance {
    store: Arc<ParameterStore>,
    forcing: Arc<dyn SolarForcing>,
}

impl ZonalEnergyBalance {
    pub fn new(store: Arc<ParameterStore>, forcing: Arc<dyn SolarForcing>) -> RSEBMResult<Self> {
        forcing.validate()?;
        Ok(Self { store, forcing })
    }

    /// Model driven by the default brightening ramp over `horizon` seconds
    pub fn with_linear_ramp(store: Arc<ParameterStore>, horizon: Time) -> RSEBMResult<Self> {
        Self::new(store, Arc::new(LinearRamp::new(horizon)))
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn forcing(&self) -> &dyn SolarForcing {
        self.forcing.as_ref()
    }

    pub fn n_zones(&self) -> usize {
        self.store.n_zones()
    }

    /// Area-fraction weighted grid over the zones
    pub fn grid(&self) -> RSEBMResult<ZonalGrid> {
        self.store.grid()
    }

    /// Solar constant $S(t)$ (W/m^2)
    pub fn solar_constant(&self, t: Time) -> FloatValue {
        self.forcing
            .solar_constant(t, self.store.constants().solar_constant)
    }

    /// Shortwave radiation absorbed by the surface of a zone (W/m^2)
    ///
    /// Panics if `zone` is out of range.
    pub fn absorbed_solar(&self, zone: usize, t: Time) -> FloatValue {
        self.absorbed(zone, self.solar_constant(t))
    }

    /// Longwave radiation lost to space by a surface at `temperature` (W/m^2)
    pub fn outgoing_longwave(&self, temperature: FloatValue) -> FloatValue {
        let c = self.store.constants();
        c.emissivity * c.transmissivity * c.stefan_boltzmann * temperature.powi(4)
    }

    /// Net heat flow (W) into each zone across its boundaries
    ///
    /// Positive values warm the zone.
    pub fn conductive_fluxes(&self, temperatures: &[FloatValue]) -> Vec<FloatValue> {
        let mut fluxes = vec![0.0; self.n_zones()];
        self.accumulate_conduction(temperatures, &mut fluxes);
        fluxes
    }

    /// Evaluate the temperature tendencies (K/s) of every zone
    ///
    /// `temperatures` and `dt_dt` must both have one element per zone.
    /// Temperatures are expected to be positive and finite; this is checked by the integrator,
    /// not here.
    pub fn derivative(&self, t: Time, temperatures: &[FloatValue], dt_dt: &mut [FloatValue]) {
        debug_assert_eq!(temperatures.len(), self.n_zones());
        debug_assert_eq!(dt_dt.len(), self.n_zones());

        let solar_constant = self.solar_constant(t);

        // dt_dt holds the conductive heat flow until it is converted below
        self.accumulate_conduction(temperatures, dt_dt);

        let areas = self.store.zone_areas();
        for (i, zone) in self.store.zones().iter().enumerate() {
            let net_radiative =
                self.absorbed(i, solar_constant) - self.outgoing_longwave(temperatures[i]);
            dt_dt[i] = (net_radiative + dt_dt[i] / areas[i]) / zone.column_heat_capacity();
        }
    }

    /// Area-weighted mean of the net radiative flux at the top of the zones (W/m^2)
    ///
    /// Positive values mean the planet as a whole is gaining energy.
    pub fn global_energy_imbalance(&self, t: Time, state: &ClimateState) -> FloatValue {
        let solar_constant = self.solar_constant(t);
        self.store
            .zones()
            .iter()
            .zip(state.temperatures())
            .enumerate()
            .map(|(i, (zone, temperature))| {
                zone.area_fraction
                    * (self.absorbed(i, solar_constant) - self.outgoing_longwave(*temperature))
            })
            .sum()
    }

    /// Temperature at which a zone would be in radiative balance, ignoring its neighbours
    ///
    /// $$ T_{eq} = \left( \frac{\gamma_i (1 - \alpha_{sky}) (1 - \alpha_i) S(t)}{\epsilon \tau \sigma} \right)^{1/4} $$
    pub fn radiative_equilibrium_temperature(&self, zone: usize, t: Time) -> Option<FloatValue> {
        if zone >= self.n_zones() {
            return None;
        }
        let c = self.store.constants();
        let absorbed = self.absorbed_solar(zone, t);
        Some((absorbed / (c.emissivity * c.transmissivity * c.stefan_boltzmann)).powf(0.25))
    }

    /// Set up an integration of this model
    pub fn into_run(
        self,
        initial_state: ClimateState,
        t0: Time,
        t_end: Time,
        options: SolverOptions,
    ) -> RSEBMResult<IntegrationRun<Self>> {
        if initial_state.len() != self.n_zones() {
            return Err(RSEBMError::Configuration(format!(
                "Expected {} initial temperatures, got {}",
                self.n_zones(),
                initial_state.len()
            )));
        }
        IntegrationRun::new(Arc::new(self), initial_state, t0, t_end, options)
    }

    fn absorbed(&self, zone: usize, solar_constant: FloatValue) -> FloatValue {
        let c = self.store.constants();
        let z = &self.store.zones()[zone];
        z.gamma * (1.0 - c.sky_albedo) * (1.0 - z.albedo) * solar_constant
    }

    /// Overwrites `fluxes` with the net heat flow into each zone
    fn accumulate_conduction(&self, temperatures: &[FloatValue], fluxes: &mut [FloatValue]) {
        fluxes.fill(0.0);
        for boundary in self.store.boundaries() {
            let [lower, upper] = boundary.between;
            let q = boundary.heat_flow(temperatures[lower], temperatures[upper]);
            fluxes[lower] += q;
            fluxes[upper] -= q;
        }
    }
}

impl IVP<Time, ModelState> for ZonalEnergyBalance {
    fn state_size(&self) -> usize {
        self.n_zones()
    }

    fn calculate_dy_dt(&self, t: Time, y: &ModelState, dy_dt: &mut ModelState) {
        self.derivative(t, y.as_slice(), dy_dt.as_mut_slice())
    }
}
