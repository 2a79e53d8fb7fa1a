//! A model driven by an injected forcing schedule.
//!
//! The same integrator is reused with different horizons and forcing profiles.

use approx::assert_relative_eq;
use rsebm_core::forcing::{ConstantForcing, LinearRamp, PiecewiseLinearForcing, SolarForcing};
use rsebm_core::ivp::{ModelState, IVP};
use rsebm_core::run::{IntegrationRun, RunStatus};
use rsebm_core::solver::SolverOptions;
use rsebm_core::state::ClimateState;
use rsebm_core::timeseries::{FloatValue, Time};
use std::sync::Arc;

/// A single slab absorbing a fraction of the solar constant and losing heat linearly
#[derive(Debug)]
struct Slab {
    forcing: Box<dyn SolarForcing>,
    s0: FloatValue,
    /// W / m^2 / K
    feedback: FloatValue,
    /// J / m^2 / K
    heat_capacity: FloatValue,
}

impl IVP<Time, ModelState> for Slab {
    fn state_size(&self) -> usize {
        1
    }

    fn calculate_dy_dt(&self, t: Time, y: &ModelState, dy_dt: &mut ModelState) {
        let absorbed = 0.25 * self.forcing.solar_constant(t, self.s0);
        dy_dt[0] = (absorbed - self.feedback * y[0]) / self.heat_capacity;
    }
}

fn slab(forcing: Box<dyn SolarForcing>) -> Arc<Slab> {
    Arc::new(Slab {
        forcing,
        s0: 1368.0,
        feedback: 1.0,
        heat_capacity: 10.0,
    })
}

fn run_to_end(model: Arc<Slab>, t_end: Time) -> FloatValue {
    let options = SolverOptions::default()
        .with_max_step(1.0)
        .with_tolerances(1e-9, 1e-9);
    let mut run =
        IntegrationRun::new(model, ClimateState::new(vec![342.0]), 0.0, t_end, options).unwrap();
    let trajectory = run.run().unwrap();
    let value = trajectory.last().unwrap().state.temperatures()[0];
    assert_eq!(run.status(), RunStatus::Completed);
    value
}

#[test]
fn constant_forcing_stays_in_equilibrium() {
    // Equilibrium: 0.25 * 1368 / 1.0 = 342
    let value = run_to_end(slab(Box::new(ConstantForcing::default())), 200.0);
    assert_relative_eq!(value, 342.0, epsilon = 1e-6);
}

#[test]
fn brighter_schedule_warms() {
    let ramp = run_to_end(slab(Box::new(LinearRamp::with_fractions(1.0, 1.2, 200.0))), 200.0);
    let constant = run_to_end(slab(Box::new(ConstantForcing::default())), 200.0);
    assert!(ramp > constant);
}

#[test]
fn piecewise_schedule_can_be_substituted() {
    let forcing = PiecewiseLinearForcing::new(vec![0.0, 50.0], vec![1.0, 0.5]).unwrap();
    let value = run_to_end(slab(Box::new(forcing)), 500.0);
    // Long after the step-down the slab relaxes to half its starting equilibrium
    assert_relative_eq!(value, 171.0, epsilon = 1e-3);
}
