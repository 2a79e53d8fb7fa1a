//! Integration driver
//!
//! An [`IntegrationRun`] owns everything that is needed to integrate a model from an initial
//! condition over a fixed time span:
//!
//! ```text
//! Uninitialized --run()--> Running --+--> Completed (trajectory available)
//!                                    +--> Failed    (error + partial trajectory)
//! ```
//!
//! Both `Completed` and `Failed` are terminal.
//! Nothing is retried automatically; a caller that wants different tolerances or step bounds
//! constructs a new run.

use crate::errors::{RSEBMError, RSEBMResult};
use crate::ivp::{accepted_steps, CancellationToken, IVPBuilder, ModelState, StepMonitor, IVP};
use crate::solver::SolverOptions;
use crate::state::ClimateState;
use crate::timeseries::{seconds_to_years, Time};
use crate::trajectory::Trajectory;
use is_close::is_close;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Counters reported by the solver for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverStatistics {
    pub function_evaluations: u32,
    pub accepted_steps: u32,
    pub rejected_steps: u32,
}

/// Lifecycle of a run without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Uninitialized,
    Running,
    Completed,
    Failed,
}

#[derive(Debug)]
enum RunState {
    Uninitialized,
    Running,
    Completed(Trajectory),
    Failed {
        error: RSEBMError,
        partial: Trajectory,
    },
}

/// A single integration of a model over `[t0, t_end]`
#[derive(Debug)]
pub struct IntegrationRun<C> {
    component: Arc<C>,
    initial_state: ClimateState,
    t0: Time,
    t_end: Time,
    options: SolverOptions,
    cancellation: Option<CancellationToken>,
    statistics: Option<SolverStatistics>,
    state: RunState,
}

impl<C> IntegrationRun<C>
where
    C: IVP<Time, ModelState>,
{
    /// Create a new run
    ///
    /// The time span, solver options and initial condition are validated here so that
    /// a run which would fail before taking a single step is never constructed.
    pub fn new(
        component: Arc<C>,
        initial_state: ClimateState,
        t0: Time,
        t_end: Time,
        options: SolverOptions,
    ) -> RSEBMResult<Self> {
        if !(t0.is_finite() && t_end.is_finite()) {
            return Err(RSEBMError::Configuration(format!(
                "Time span must be finite, got [{}, {}]",
                t0, t_end
            )));
        }
        if t_end <= t0 {
            return Err(RSEBMError::Configuration(format!(
                "t_end ({}) must be after t0 ({})",
                t_end, t0
            )));
        }
        options.validate()?;
        if initial_state.len() != component.state_size() {
            return Err(RSEBMError::Configuration(format!(
                "Initial state has {} zones but the model has {}",
                initial_state.len(),
                component.state_size()
            )));
        }
        initial_state.validate(t0)?;

        Ok(Self {
            component,
            initial_state,
            t0,
            t_end,
            options,
            cancellation: None,
            statistics: None,
            state: RunState::Uninitialized,
        })
    }

    /// Allow the run to be cancelled from elsewhere.
    ///
    /// The token is checked after every accepted step.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn status(&self) -> RunStatus {
        match self.state {
            RunState::Uninitialized => RunStatus::Uninitialized,
            RunState::Running => RunStatus::Running,
            RunState::Completed(_) => RunStatus::Completed,
            RunState::Failed { .. } => RunStatus::Failed,
        }
    }

    /// The complete trajectory of a successful run
    pub fn trajectory(&self) -> Option<&Trajectory> {
        match &self.state {
            RunState::Completed(trajectory) => Some(trajectory),
            _ => None,
        }
    }

    /// Steps recorded by a failed run before it stopped
    pub fn partial_trajectory(&self) -> Option<&Trajectory> {
        match &self.state {
            RunState::Failed { partial, .. } => Some(partial),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RSEBMError> {
        match &self.state {
            RunState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn statistics(&self) -> Option<SolverStatistics> {
        self.statistics
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Consume the run, returning the trajectory of a successful run or the error of a
    /// failed one
    pub fn into_result(self) -> RSEBMResult<Trajectory> {
        match self.state {
            RunState::Completed(trajectory) => Ok(trajectory),
            RunState::Failed { error, .. } => Err(error),
            RunState::Uninitialized | RunState::Running => Err(RSEBMError::Configuration(
                "Run has not been executed".to_string(),
            )),
        }
    }

    /// Integrate the model over the whole time span
    ///
    /// Can only be called once.
    pub fn run(&mut self) -> RSEBMResult<&Trajectory> {
        if !matches!(self.state, RunState::Uninitialized) {
            return Err(RSEBMError::RunAlreadyStarted);
        }
        self.state = RunState::Running;
        info!(
            "Integrating {} zones over {} years",
            self.initial_state.len(),
            seconds_to_years(self.t_end - self.t0)
        );

        let (result, trajectory) = self.integrate();

        match result {
            Ok(()) => {
                info!("Integration completed with {} points", trajectory.len());
                self.state = RunState::Completed(trajectory);
                self.trajectory().ok_or_else(|| {
                    RSEBMError::Configuration("Completed run has no trajectory".to_string())
                })
            }
            Err(error) => {
                warn!("Integration failed: {}", error);
                self.state = RunState::Failed {
                    error: error.clone(),
                    partial: trajectory,
                };
                Err(error)
            }
        }
    }

    fn integrate(&mut self) -> (RSEBMResult<()>, Trajectory) {
        let mut trajectory = Trajectory::with_initial(self.t0, self.initial_state.clone());
        let monitor = StepMonitor::new(self.cancellation.clone());

        let builder = IVPBuilder::new(
            Arc::clone(&self.component),
            &monitor,
            self.initial_state.to_model_state(),
        );
        let mut solver = builder.to_dop853(self.t0, self.t_end, &self.options);
        let outcome = solver.integrate();

        // Accepted steps are recorded as they happen. If the solver stops early the
        // trajectory still describes everything up to that point.
        let times = monitor.take_times();
        let (_, states) = solver.results().get();
        for (t, y) in accepted_steps(&times, states) {
            if t <= trajectory.last().map(|p| p.time).unwrap_or(self.t0) {
                continue;
            }
            if let Err(e) = trajectory.push(t, ClimateState::from_model_state(y)) {
                return (Err(e), trajectory);
            }
        }

        if let Some(violation) = monitor.violation() {
            return (Err(violation), trajectory);
        }

        let (time, last_state) = match trajectory.last() {
            Some(p) => (p.time, p.state.temperatures().to_vec()),
            None => (self.t0, self.initial_state.temperatures().to_vec()),
        };

        if let Some(t) = monitor.cancelled_at() {
            return (
                Err(RSEBMError::Cancelled {
                    time: t,
                    last_state,
                }),
                trajectory,
            );
        }

        match outcome {
            Ok(stats) => {
                let statistics = SolverStatistics {
                    function_evaluations: stats.num_eval,
                    accepted_steps: stats.accepted_steps,
                    rejected_steps: stats.rejected_steps,
                };
                debug!("Solver statistics: {:?}", statistics);
                self.statistics = Some(statistics);
            }
            Err(e) => {
                return (
                    Err(RSEBMError::Integration {
                        reason: format!("{:?}", e),
                        time,
                        last_state,
                    }),
                    trajectory,
                )
            }
        }

        if !is_close!(time, self.t_end) {
            return (
                Err(RSEBMError::Integration {
                    reason: format!("Solver stopped before reaching t_end={}", self.t_end),
                    time,
                    last_state,
                }),
                trajectory,
            );
        }

        (Ok(()), trajectory)
    }
}
