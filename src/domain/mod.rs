pub mod domain_vertex;
pub mod rectangular_domain;

pub use domain_vertex::*;
pub use rectangular_domain::*;

use nalgebra::{Point2, Vector2};

use crate::misc::{FloatingPoint, TopologyState};

/// A restriction curve bounding the parametric domain of a surface.
/// The curve lives in the (u, v) plane of the surface.
pub trait Restriction<T: FloatingPoint> {
    /// Parameter domain of the restriction
    fn domain(&self) -> (T, T);

    /// Evaluate the restriction at the given parameter
    fn point_at(&self, t: T) -> Point2<T>;

    /// Evaluate the point and the first derivative at the given parameter
    fn derivative_at(&self, t: T) -> (Point2<T>, Vector2<T>);

    /// Vertices lying on the restriction with their parameter on it
    fn vertices(&self) -> Vec<(DomainVertex<T>, T)>;

    /// Orthogonal projection of a parametric point onto the restriction.
    /// Returns `(parameter, distance)` or `None` if no projection exists.
    fn project(&self, point: &Point2<T>) -> Option<(T, T)>;
}

/// The bounded parametric domain of a surface: classification of parametric points
/// and the ordered set of restriction curves bounding it.
pub trait TopologyDomain<T: FloatingPoint> {
    type Restriction: Restriction<T>;

    /// Classify a parametric point against the domain with the given tolerance
    fn classify(&self, point: &Point2<T>, tolerance: T) -> TopologyState;

    /// Restriction curves bounding the domain
    fn restrictions(&self) -> &[Self::Restriction];
}
