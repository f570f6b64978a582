use nalgebra::{Point2, Point3, Vector2, Vector3};

use crate::misc::FloatingPoint;

/// A sample of the traced line, seen both on the surface and on the curve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlendPoint<T: FloatingPoint> {
    point_on_surface: Point3<T>,
    point_on_curve: Point3<T>,
    /// guide parameter of the sample
    parameter: T,
    /// parameters on the surface
    uv: Point2<T>,
    /// parameter on the curve
    w: T,
    tangent_on_surface: Vector3<T>,
    tangent_on_curve: Vector3<T>,
    tangent_2d: Vector2<T>,
}

impl<T: FloatingPoint> BlendPoint<T> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        point_on_surface: Point3<T>,
        point_on_curve: Point3<T>,
        parameter: T,
        uv: Point2<T>,
        w: T,
        tangent_on_surface: Vector3<T>,
        tangent_on_curve: Vector3<T>,
        tangent_2d: Vector2<T>,
    ) -> Self {
        Self {
            point_on_surface,
            point_on_curve,
            parameter,
            uv,
            w,
            tangent_on_surface,
            tangent_on_curve,
            tangent_2d,
        }
    }

    pub fn point_on_surface(&self) -> &Point3<T> {
        &self.point_on_surface
    }

    pub fn point_on_curve(&self) -> &Point3<T> {
        &self.point_on_curve
    }

    pub fn parameter(&self) -> T {
        self.parameter
    }

    pub fn parameters_on_surface(&self) -> (T, T) {
        (self.uv.x, self.uv.y)
    }

    pub fn uv(&self) -> &Point2<T> {
        &self.uv
    }

    pub fn parameter_on_curve(&self) -> T {
        self.w
    }

    pub fn tangent_on_surface(&self) -> &Vector3<T> {
        &self.tangent_on_surface
    }

    pub fn tangent_on_curve(&self) -> &Vector3<T> {
        &self.tangent_on_curve
    }

    pub fn tangent_2d(&self) -> &Vector2<T> {
        &self.tangent_2d
    }
}
