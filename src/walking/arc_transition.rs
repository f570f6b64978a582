use nalgebra::Vector3;

use crate::{
    domain::Restriction,
    misc::{make_transition, FloatingPoint, Transition},
    surface::ParametricSurface,
};

/// Transitions at the crossing of a traced line and a restriction of the surface domain.
/// `tangent` is the 3D tangent of the line at the crossing & `parameter` the crossing on the restriction.
/// Returns `(transition of the line, transition of the restriction)`.
pub fn arc_transition<T, S, R>(
    surface: &S,
    restriction: &R,
    parameter: T,
    tangent: &Vector3<T>,
) -> (Transition, Transition)
where
    T: FloatingPoint,
    S: ParametricSurface<T>,
    R: Restriction<T>,
{
    let (p2d, dp2d) = restriction.derivative_at(parameter);
    let (_, d1u, d1v) = surface.derivatives_at(p2d.x, p2d.y);
    let tangent_restriction = d1u * dp2d.x + d1v * dp2d.y;
    let normal = d1u.cross(&d1v);
    make_transition(tangent, &tangent_restriction, &normal)
}
