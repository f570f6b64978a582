pub mod planar_surface;
pub use planar_surface::*;

use nalgebra::{Point3, Vector3};

use crate::misc::FloatingPoint;

/// A parametric surface `(u, v) -> P(u, v)` as seen by the walking engine.
pub trait ParametricSurface<T: FloatingPoint> {
    /// Evaluate the surface at the given u, v parameters to get a point
    fn point_at(&self, u: T, v: T) -> Point3<T>;

    /// Evaluate the point and the first partial derivatives `(P, dP/du, dP/dv)`
    fn derivatives_at(&self, u: T, v: T) -> (Point3<T>, Vector3<T>, Vector3<T>);

    /// Parametric distance along u corresponding to the 3D distance `tolerance`
    fn u_resolution(&self, tolerance: T) -> T;

    /// Parametric distance along v corresponding to the 3D distance `tolerance`
    fn v_resolution(&self, tolerance: T) -> T;

    /// Non normalized normal `dP/du ^ dP/dv`
    fn normal_at(&self, u: T, v: T) -> Vector3<T> {
        let (_, du, dv) = self.derivatives_at(u, v);
        du.cross(&dv)
    }
}
