pub mod blend_system;
pub use blend_system::*;

use nalgebra::{DMatrix, DVector, Point2, Point3, Vector2, Vector3};

use crate::misc::FloatingPoint;

/// The blending constraint between a moving cross-section curve and a fixed surface.
///
/// For a given guide parameter (see [`BlendFunction::set`]) the function is a nonlinear system
/// whose unknowns are the surface parameters `(u, v)` followed by the curve parameter `w`
/// (or an equivalent set of unknowns where the two first ones are the surface parameters).
///
/// [`BlendFunction::is_solution`] caches the geometric state of the tested solution:
/// the point & tangent accessors describe the last vector accepted by it.
pub trait BlendFunction<T: FloatingPoint> {
    /// Number of unknowns of the system
    fn nb_variables(&self) -> usize;

    /// Set the guide parameter of the cross-section
    fn set(&mut self, parameter: T);

    /// Per-variable tolerances corresponding to the 3D tolerance `tolerance`
    fn tolerance(&self, tolerance: T) -> DVector<T>;

    /// Lower & upper bounds of the unknowns
    fn bounds(&self) -> (DVector<T>, DVector<T>);

    /// Residual of the system at `x`
    fn values(&self, x: &DVector<T>) -> anyhow::Result<DVector<T>>;

    /// Jacobian of the system at `x` (rows: equations, columns: unknowns)
    fn derivatives(&self, x: &DVector<T>) -> anyhow::Result<DMatrix<T>>;

    /// Check if `solution` satisfies the constraint within `tolerance`
    /// and cache its geometric state when it does.
    fn is_solution(&mut self, solution: &DVector<T>, tolerance: T) -> bool;

    fn point_on_surface(&self) -> Point3<T>;

    fn point_on_curve(&self) -> Point3<T>;

    /// Parametric point on the surface
    fn pnt2d(&self) -> Point2<T>;

    fn parameter_on_curve(&self) -> T;

    /// Tangent of the traced line on the surface
    fn tangent_on_surface(&self) -> Vector3<T>;

    /// Tangent of the traced line on the curve
    fn tangent_on_curve(&self) -> Vector3<T>;

    /// Tangent of the traced line in the parametric plane of the surface
    fn tangent_2d(&self) -> Vector2<T>;

    /// Tangent to the cross-section and normal to the surface at `(u, v)`
    fn tangent(&self, u: T, v: T) -> (Vector3<T>, Vector3<T>);
}
