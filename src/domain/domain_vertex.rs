use nalgebra::Point2;

use crate::misc::FloatingPoint;

/// A topological vertex shared by one or more restriction curves.
/// Two vertices are the same vertex when their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DomainVertex<T: FloatingPoint> {
    id: usize,
    uv: Point2<T>,
    tolerance: T,
}

impl<T: FloatingPoint> DomainVertex<T> {
    pub fn new(id: usize, uv: Point2<T>, tolerance: T) -> Self {
        Self { id, uv, tolerance }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn uv(&self) -> &Point2<T> {
        &self.uv
    }

    pub fn tolerance(&self) -> T {
        self.tolerance
    }

    /// Check if two handles designate the same topological vertex
    pub fn is_same(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
