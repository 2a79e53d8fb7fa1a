//! Bridge between models and the `ode_solvers` integrators
//!
//! A model describes its system of ODEs by implementing [`IVP`].
//! [`IVPBuilder`] wraps the model as an [`ode_solvers::System`], adding the
//! checks that are needed between and during solver steps:
//!
//! - every evaluated state is checked for non-physical temperatures
//! - the time of every accepted step is recorded
//! - a [`CancellationToken`] is polled after each accepted step
//!
//! States of accepted steps are not copied. The solver keeps them in its own output
//! (`OutputType::Sparse`) and [`accepted_steps`] pairs them with the recorded times.

use crate::errors::RSEBMError;
use crate::solver::SolverOptions;
use crate::state::check_domain;
use crate::timeseries::{FloatValue, Time};
use nalgebra::DVector;
use ode_solvers::dop_shared::OutputType;
use ode_solvers::{Dop853, System};
use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// State vector handed to the solver
pub type ModelState = DVector<FloatValue>;

/// An initial value problem $\frac{dy}{dt} = f(t, y)$
pub trait IVP<T, S> {
    /// Number of elements in the state vector
    fn state_size(&self) -> usize;

    /// Evaluate $f(t, y)$ into `dy_dt`
    ///
    /// Implementations must be pure: identical inputs give identical outputs.
    fn calculate_dy_dt(&self, t: T, y: &S, dy_dt: &mut S);
}

/// Shared flag used to request that a run stops between two steps
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Records what happened while the solver was stepping
///
/// The solver takes ownership of the system it integrates, so anything that needs to be
/// inspected afterwards lives here and is borrowed by the [`IVPBuilder`].
#[derive(Debug, Default)]
pub struct StepMonitor {
    cancellation: Option<CancellationToken>,
    times: RefCell<Vec<Time>>,
    violation: RefCell<Option<RSEBMError>>,
    cancelled_at: Cell<Option<Time>>,
}

impl StepMonitor {
    pub fn new(cancellation: Option<CancellationToken>) -> Self {
        Self {
            cancellation,
            ..Default::default()
        }
    }

    fn record_step(&self, t: Time) {
        self.times.borrow_mut().push(t);
    }

    /// Keeps the first violation only
    fn record_violation(&self, error: RSEBMError) {
        let mut violation = self.violation.borrow_mut();
        if violation.is_none() {
            *violation = Some(error);
        }
    }

    fn should_stop(&self, t: Time) -> bool {
        if self.violation.borrow().is_some() {
            return true;
        }
        match &self.cancellation {
            Some(token) if token.is_cancelled() => {
                self.cancelled_at.set(Some(t));
                true
            }
            _ => false,
        }
    }

    /// Times of the accepted steps in the order they were taken
    pub fn take_times(&self) -> Vec<Time> {
        self.times.take()
    }

    pub fn violation(&self) -> Option<RSEBMError> {
        self.violation.borrow().clone()
    }

    /// Time of the step after which cancellation was observed
    pub fn cancelled_at(&self) -> Option<Time> {
        self.cancelled_at.get()
    }
}

pub struct IVPBuilder<'a, C, S> {
    component: Arc<C>,
    monitor: &'a StepMonitor,
    pub y0: S,
}

impl<C> System<Time, ModelState> for IVPBuilder<'_, C, ModelState>
where
    C: IVP<Time, ModelState>,
{
    fn system(&self, t: Time, y: &ModelState, dy: &mut ModelState) {
        if let Err(err) = check_domain(t, y.as_slice()) {
            // The solver has no error channel. Stop contributing and let the next accepted
            // step end the integration.
            self.monitor.record_violation(err);
            dy.fill(0.0);
            return;
        }
        self.component.calculate_dy_dt(t, y, dy)
    }

    fn solout(&mut self, t: Time, y: &ModelState, _dy: &ModelState) -> bool {
        if let Err(err) = check_domain(t, y.as_slice()) {
            self.monitor.record_violation(err);
        }
        self.monitor.record_step(t);
        self.monitor.should_stop(t)
    }
}

impl<'a, C, S> IVPBuilder<'a, C, S>
where
    S: Clone,
{
    pub fn new(component: Arc<C>, monitor: &'a StepMonitor, y0: S) -> Self {
        Self {
            component,
            monitor,
            y0,
        }
    }
}

impl<'a, C> IVPBuilder<'a, C, ModelState>
where
    C: IVP<Time, ModelState>,
{
    /// Create an adaptive 8th order Dormand-Prince solver for the interval `[t0, t1]`
    pub fn to_dop853(
        self,
        t0: Time,
        t1: Time,
        options: &SolverOptions,
    ) -> Dop853<Time, ModelState, Self> {
        let y0 = self.y0.clone();
        Dop853::from_param(
            self,
            t0,
            t1,
            options.max_step,
            y0,
            options.tolerance_rel,
            options.tolerance_abs,
            0.9,
            0.0,
            0.333,
            6.0,
            options.max_step,
            options.initial_step,
            options.max_steps,
            options.stiffness_interval(),
            OutputType::Sparse,
        )
    }
}

/// Pair the recorded step times with the states in the solver's sparse output
///
/// Sparse output holds the initial state followed by one state per accepted step, in the
/// same order as the calls to `solout`. The times it stores alongside are not used.
pub fn accepted_steps<'a, S>(
    times: &'a [Time],
    states: &'a [S],
) -> impl Iterator<Item = (Time, &'a S)> + 'a {
    times.iter().copied().zip(states.iter().skip(1))
}
