use nalgebra::{Point3, Vector3};

use crate::misc::FloatingPoint;

use super::ParametricSurface;

/// Plane parameterized by an origin and two axes: `P(u, v) = origin + u * u_axis + v * v_axis`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarSurface<T: FloatingPoint> {
    origin: Point3<T>,
    u_axis: Vector3<T>,
    v_axis: Vector3<T>,
}

impl<T: FloatingPoint> PlanarSurface<T> {
    pub fn new(origin: Point3<T>, u_axis: Vector3<T>, v_axis: Vector3<T>) -> Self {
        Self {
            origin,
            u_axis,
            v_axis,
        }
    }

    /// The XY plane with unit axes
    pub fn xy() -> Self {
        Self::new(Point3::origin(), Vector3::x(), Vector3::y())
    }

    pub fn origin(&self) -> &Point3<T> {
        &self.origin
    }

    pub fn u_axis(&self) -> &Vector3<T> {
        &self.u_axis
    }

    pub fn v_axis(&self) -> &Vector3<T> {
        &self.v_axis
    }
}

impl<T: FloatingPoint> ParametricSurface<T> for PlanarSurface<T> {
    fn point_at(&self, u: T, v: T) -> Point3<T> {
        self.origin + self.u_axis * u + self.v_axis * v
    }

    fn derivatives_at(&self, u: T, v: T) -> (Point3<T>, Vector3<T>, Vector3<T>) {
        (self.point_at(u, v), self.u_axis, self.v_axis)
    }

    fn u_resolution(&self, tolerance: T) -> T {
        resolution(tolerance, self.u_axis.norm())
    }

    fn v_resolution(&self, tolerance: T) -> T {
        resolution(tolerance, self.v_axis.norm())
    }
}

fn resolution<T: FloatingPoint>(tolerance: T, speed: T) -> T {
    if speed > T::default_epsilon() {
        tolerance / speed
    } else {
        tolerance
    }
}
