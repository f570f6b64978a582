pub mod bounded_newton;
pub use bounded_newton::*;

use argmin::core::{ArgminFloat, Executor, State, TerminationReason, TerminationStatus};
use nalgebra::DVector;

use crate::{
    function::{BlendFunction, BlendSystem},
    misc::FloatingPoint,
};

/// Root finder for the nonlinear system of a blend function at its current guide parameter.
pub trait RootSolver<T: FloatingPoint> {
    /// Solve the system from `initial` with the unknowns constrained to `[lower, upper]`.
    /// Returns `None` if the solver did not converge.
    fn solve<F: BlendFunction<T>>(
        &mut self,
        function: &F,
        initial: &DVector<T>,
        tolerance: &DVector<T>,
        lower: &DVector<T>,
        upper: &DVector<T>,
    ) -> Option<DVector<T>>;
}

/// Root solver running [`BoundedNewton`] iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewtonRootSolver {
    max_iters: u64,
}

impl Default for NewtonRootSolver {
    fn default() -> Self {
        Self { max_iters: 30 }
    }
}

impl NewtonRootSolver {
    pub fn new(max_iters: u64) -> Self {
        Self { max_iters }
    }

    pub fn max_iters(&self) -> u64 {
        self.max_iters
    }

    pub fn with_max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }
}

impl<T: FloatingPoint + ArgminFloat> RootSolver<T> for NewtonRootSolver {
    fn solve<F: BlendFunction<T>>(
        &mut self,
        function: &F,
        initial: &DVector<T>,
        tolerance: &DVector<T>,
        lower: &DVector<T>,
        upper: &DVector<T>,
    ) -> Option<DVector<T>> {
        let problem = BlendSystem::new(function);
        let solver = BoundedNewton::new(tolerance.clone(), lower.clone(), upper.clone());

        let res = Executor::new(problem, solver)
            .configure(|state| state.param(initial.clone()).max_iters(self.max_iters))
            .run();

        match res {
            Ok(r) => {
                let state = r.state();
                match state.get_termination_status() {
                    TerminationStatus::Terminated(TerminationReason::SolverConverged) => {
                        state.get_param().cloned()
                    }
                    _ => None,
                }
            }
            Err(_e) => None,
        }
    }
}
