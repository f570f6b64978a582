use argmin::core::{Jacobian, Operator};
use nalgebra::{DMatrix, DVector};

use crate::misc::FloatingPoint;

use super::BlendFunction;

/// Residual & Jacobian provider for solving a blend function at its current guide parameter.
pub struct BlendSystem<'a, T: FloatingPoint, F: BlendFunction<T>> {
    function: &'a F,
    phantom: std::marker::PhantomData<T>,
}

impl<'a, T: FloatingPoint, F: BlendFunction<T>> BlendSystem<'a, T, F> {
    pub fn new(function: &'a F) -> Self {
        BlendSystem {
            function,
            phantom: Default::default(),
        }
    }
}

impl<'a, T: FloatingPoint, F: BlendFunction<T>> Operator for BlendSystem<'a, T, F> {
    type Param = DVector<T>;
    type Output = DVector<T>;

    fn apply(&self, param: &Self::Param) -> Result<Self::Output, anyhow::Error> {
        self.function.values(param)
    }
}

impl<'a, T: FloatingPoint, F: BlendFunction<T>> Jacobian for BlendSystem<'a, T, F> {
    type Param = DVector<T>;
    type Jacobian = DMatrix<T>;

    fn jacobian(&self, param: &Self::Param) -> Result<Self::Jacobian, anyhow::Error> {
        self.function.derivatives(param)
    }
}
