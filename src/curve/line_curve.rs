use nalgebra::{Point3, Vector3};

use crate::misc::FloatingPoint;

use super::ParametricCurve;

/// Straight line `C(w) = origin + w * direction`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineCurve<T: FloatingPoint> {
    origin: Point3<T>,
    direction: Vector3<T>,
}

impl<T: FloatingPoint> LineCurve<T> {
    pub fn new(origin: Point3<T>, direction: Vector3<T>) -> Self {
        Self { origin, direction }
    }

    pub fn origin(&self) -> &Point3<T> {
        &self.origin
    }

    pub fn direction(&self) -> &Vector3<T> {
        &self.direction
    }
}

impl<T: FloatingPoint> ParametricCurve<T> for LineCurve<T> {
    fn point_at(&self, w: T) -> Point3<T> {
        self.origin + self.direction * w
    }

    fn tangent_at(&self, _w: T) -> Vector3<T> {
        self.direction
    }

    fn resolution(&self, tolerance: T) -> T {
        let speed = self.direction.norm();
        if speed > T::default_epsilon() {
            tolerance / speed
        } else {
            tolerance
        }
    }
}
