//! End-to-end runs of the reference six-zone scenario.

use approx::assert_relative_eq;
use is_close::is_close;
use rsebm::rsebm_core::errors::RSEBMError;
use rsebm::rsebm_core::forcing::PiecewiseLinearForcing;
use rsebm::rsebm_core::run::RunStatus;
use rsebm::rsebm_core::timeseries::years_to_seconds;
use rsebm::{Scenario, ScenarioConfig};

#[test]
fn reference_run_completes() {
    let scenario = Scenario::reference().unwrap();
    let simulation = scenario.simulation().clone();

    let mut run = scenario.to_run().unwrap();
    run.run().unwrap();
    assert_eq!(run.status(), RunStatus::Completed);
    assert!(run.error().is_none());

    let statistics = run.statistics().unwrap();
    assert!(statistics.accepted_steps > 0);
    assert!(statistics.accepted_steps <= simulation.solver.max_steps);

    let trajectory = run.trajectory().unwrap();
    let times = trajectory.times().to_vec();

    assert_eq!(times[0], 0.0);
    assert!(is_close!(times[times.len() - 1], simulation.t_end));
    assert_eq!(
        trajectory.first().unwrap().state,
        simulation.initial_state
    );

    for pair in times.windows(2) {
        assert!(pair[1] > pair[0], "Times must be strictly increasing");
        assert!(pair[1] - pair[0] <= simulation.solver.max_step * (1.0 + 1e-9));
    }

    for point in trajectory {
        assert_eq!(point.state.len(), 6);
        assert!(point
            .state
            .temperatures()
            .iter()
            .all(|t| t.is_finite() && *t > 0.0));
    }

    // The star brightens by a third over the run
    let grid = scenario.model().grid().unwrap();
    let global_mean = trajectory.global_mean_series(&grid);
    assert!(global_mean[global_mean.len() - 1] > global_mean[0]);

    // Interpolating at a recorded time returns the recorded state
    let middle = &trajectory.points()[trajectory.len() / 2];
    let interpolated = trajectory.at_time(middle.time).unwrap();
    for (a, b) in interpolated.temperatures().iter().zip(middle.state.temperatures()) {
        assert_relative_eq!(*a, *b, max_relative = 1e-12);
    }
}

#[test]
fn exhausted_step_budget_fails_with_partial_output() {
    let mut config = ScenarioConfig::default();
    config.simulation.solver.max_steps = 50;
    let scenario = Scenario::new(config).unwrap();

    let mut run = scenario.to_run().unwrap();
    let result = run.run();
    assert!(matches!(result, Err(RSEBMError::Integration { .. })));
    assert_eq!(run.status(), RunStatus::Failed);
    assert!(run.trajectory().is_none());

    let partial = run.partial_trajectory().unwrap();
    let last = partial.last().unwrap();
    assert!(last.time < scenario.simulation().t_end);

    match run.error() {
        Some(RSEBMError::Integration {
            time, last_state, ..
        }) => {
            assert_eq!(*time, last.time);
            assert_eq!(last_state.as_slice(), last.state.temperatures());
        }
        other => panic!("Unexpected error {:?}", other),
    }
}

#[test]
fn alternative_forcing_from_toml() {
    let scenario = Scenario::from_toml_str(
        r#"
[simulation]
t_end = 3155760000.0

[forcing]
type = "PiecewiseLinearForcing"
times = [0.0, 1577880000.0]
fractions = [1.0, 0.5]
"#,
    )
    .unwrap();

    let t_end = scenario.simulation().t_end;
    assert_eq!(t_end, years_to_seconds(100.0));
    assert_eq!(scenario.model().solar_constant(t_end), 0.5 * 1368.0);

    let trajectory = scenario.run().unwrap();
    assert!(is_close!(trajectory.last().unwrap().time, t_end));

    // Dimming the star cools every zone
    let first = &trajectory.first().unwrap().state;
    let last = &trajectory.last().unwrap().state;
    for (before, after) in first.temperatures().iter().zip(last.temperatures()) {
        assert!(after < before);
    }
}

#[test]
fn reference_scenario_toml_round_trip() {
    let mut config = ScenarioConfig::default();
    config.forcing = Some(Box::new(
        PiecewiseLinearForcing::new(vec![0.0, 1.0e10], vec![0.8, 1.1]).unwrap(),
    ));

    let serialised = config.to_toml_string().unwrap();
    let parsed = ScenarioConfig::from_toml_str(&serialised).unwrap();

    assert_eq!(parsed.simulation, config.simulation);
    assert_eq!(parsed.parameters, config.parameters);
    assert_eq!(parsed.to_toml_string().unwrap(), serialised);

    let forcing = parsed.forcing.unwrap();
    assert_eq!(forcing.solar_constant(0.0, 1000.0), 800.0);
    assert_eq!(forcing.solar_constant(2.0e10, 1000.0), 1100.0);
}

#[test]
fn scenario_from_file() {
    let path = std::env::temp_dir().join("rsebm_scenario_from_file.toml");
    std::fs::write(&path, "[parameters.constants]\nsolar_constant = 1361.0\n").unwrap();

    let config = ScenarioConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.parameters.constants.solar_constant, 1361.0);
    assert!(Scenario::new(config).is_ok());
}
