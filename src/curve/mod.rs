pub mod line_curve;
pub use line_curve::*;

use nalgebra::{Point3, Vector3};

use crate::misc::FloatingPoint;

/// A parametric 3D curve `w -> C(w)` as seen by the walking engine.
pub trait ParametricCurve<T: FloatingPoint> {
    /// Evaluate the curve at the given parameter to get a point
    fn point_at(&self, w: T) -> Point3<T>;

    /// First derivative at the given parameter
    fn tangent_at(&self, w: T) -> Vector3<T>;

    /// Parametric distance corresponding to the 3D distance `tolerance`
    fn resolution(&self, tolerance: T) -> T;
}
