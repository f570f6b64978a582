use argmin::{argmin_error_closure, core::*};
use nalgebra::{DMatrix, DVector};

use crate::misc::FloatingPoint;

/// Newton's method for nonlinear systems `F(x) = 0` with box constraints on the unknowns.
/// Square systems are solved by LU decomposition, the others in the least squares sense.
/// Converges when every component of the last update is below its tolerance.
/// Original source: https://argmin-rs.github.io/argmin/argmin/solver/newton/struct.Newton.html
#[derive(Clone, Debug)]
pub struct BoundedNewton<F: FloatingPoint> {
    /// per-variable convergence tolerance
    tolerance: DVector<F>,
    /// lower bounds of the unknowns
    lower: DVector<F>,
    /// upper bounds of the unknowns
    upper: DVector<F>,
    last_update: Option<DVector<F>>,
}

impl<F: FloatingPoint> BoundedNewton<F> {
    pub fn new(tolerance: DVector<F>, lower: DVector<F>, upper: DVector<F>) -> Self {
        Self {
            tolerance,
            lower,
            upper,
            last_update: None,
        }
    }

    fn constrain(&self, mut x: DVector<F>) -> DVector<F> {
        for i in 0..x.len() {
            if x[i] < self.lower[i] {
                x[i] = self.lower[i];
            } else if x[i] > self.upper[i] {
                x[i] = self.upper[i];
            }
        }
        x
    }

    fn has_converged(&self) -> bool {
        match &self.last_update {
            Some(update) => update
                .iter()
                .zip(self.tolerance.iter())
                .all(|(d, tol)| *d <= *tol && -*d <= *tol),
            None => false,
        }
    }
}

impl<O, F> Solver<O, IterState<DVector<F>, (), (), (), (), F>> for BoundedNewton<F>
where
    O: Operator<Param = DVector<F>, Output = DVector<F>>
        + Jacobian<Param = DVector<F>, Jacobian = DMatrix<F>>,
    F: FloatingPoint + ArgminFloat,
{
    const NAME: &'static str = "Bounded newton method";

    fn init(
        &mut self,
        problem: &mut Problem<O>,
        state: IterState<DVector<F>, (), (), (), (), F>,
    ) -> Result<(IterState<DVector<F>, (), (), (), (), F>, Option<KV>), Error> {
        let x0 = state.get_param().ok_or_else(argmin_error_closure!(
            NotInitialized,
            concat!(
                "`BoundedNewton` requires an initial parameter vector. ",
                "Please provide an initial guess via `Executor`s `configure` method."
            )
        ))?;
        let residual = problem.apply(x0)?;
        self.last_update = None;
        Ok((state.cost(residual.norm()), None))
    }

    fn next_iter(
        &mut self,
        problem: &mut Problem<O>,
        state: IterState<DVector<F>, (), (), (), (), F>,
    ) -> Result<(IterState<DVector<F>, (), (), (), (), F>, Option<KV>), Error> {
        let param = state
            .get_param()
            .ok_or_else(argmin_error_closure!(
                NotInitialized,
                "`BoundedNewton` requires an initial parameter vector."
            ))?
            .clone();

        let residual = problem.apply(&param)?;
        let jacobian = problem.jacobian(&param)?;
        let rhs = -residual;

        let delta = if jacobian.is_square() {
            jacobian.lu().solve(&rhs)
        } else {
            jacobian.svd(true, true).solve(&rhs, F::default_epsilon()).ok()
        }
        .ok_or(anyhow::anyhow!("Singular jacobian"))?;

        let next = self.constrain(&param + delta);
        let cost = problem.apply(&next)?.norm();
        if !<F as nalgebra::ComplexField>::is_finite(&cost) {
            return Err(anyhow::anyhow!("Residual is not finite"));
        }
        self.last_update = Some(&next - &param);

        Ok((state.param(next).cost(cost), None))
    }

    fn terminate(&mut self, _state: &IterState<DVector<F>, (), (), (), (), F>) -> TerminationStatus {
        if self.has_converged() {
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        } else {
            TerminationStatus::NotTerminated
        }
    }
}
