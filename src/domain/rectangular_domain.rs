use nalgebra::{Point2, Vector2};

use crate::misc::{FloatingPoint, TopologyState};

use super::{DomainVertex, Restriction, TopologyDomain};

/// Side of a rectangular parametric domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxSide {
    VMin,
    UMax,
    VMax,
    UMin,
}

/// Iso-parametric boundary of a rectangular domain.
/// Restrictions along u (`VMin`, `VMax`) are parameterized by u, the others by v.
#[derive(Debug, Clone, PartialEq)]
pub struct IsoRestriction<T: FloatingPoint> {
    side: BoxSide,
    /// the fixed coordinate of the iso line
    value: T,
    range: (T, T),
    vertices: [(DomainVertex<T>, T); 2],
}

impl<T: FloatingPoint> IsoRestriction<T> {
    pub fn side(&self) -> BoxSide {
        self.side
    }

    fn is_along_u(&self) -> bool {
        matches!(self.side, BoxSide::VMin | BoxSide::VMax)
    }
}

impl<T: FloatingPoint> Restriction<T> for IsoRestriction<T> {
    fn domain(&self) -> (T, T) {
        self.range
    }

    fn point_at(&self, t: T) -> Point2<T> {
        if self.is_along_u() {
            Point2::new(t, self.value)
        } else {
            Point2::new(self.value, t)
        }
    }

    fn derivative_at(&self, t: T) -> (Point2<T>, Vector2<T>) {
        let d = if self.is_along_u() {
            Vector2::x()
        } else {
            Vector2::y()
        };
        (self.point_at(t), d)
    }

    fn vertices(&self) -> Vec<(DomainVertex<T>, T)> {
        self.vertices.to_vec()
    }

    fn project(&self, point: &Point2<T>) -> Option<(T, T)> {
        let along = if self.is_along_u() { point.x } else { point.y };
        let t = along.clamp(self.range.0, self.range.1);
        let d = (point - self.point_at(t)).norm();
        Some((t, d))
    }
}

/// Rectangular parametric domain `[u0, u1] x [v0, v1]` bounded by four iso restrictions
/// (`VMin`, `UMax`, `VMax`, `UMin` in that order) sharing four corner vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct RectangularDomain<T: FloatingPoint> {
    u: (T, T),
    v: (T, T),
    restrictions: Vec<IsoRestriction<T>>,
}

impl<T: FloatingPoint> RectangularDomain<T> {
    /// Create a domain from its u & v intervals.
    /// `vertex_tolerance` is the parametric tolerance of the corner vertices.
    pub fn new(u: (T, T), v: (T, T), vertex_tolerance: T) -> Self {
        let corner =
            |id: usize, x: T, y: T| DomainVertex::new(id, Point2::new(x, y), vertex_tolerance);
        let c0 = corner(0, u.0, v.0);
        let c1 = corner(1, u.1, v.0);
        let c2 = corner(2, u.1, v.1);
        let c3 = corner(3, u.0, v.1);

        let restrictions = vec![
            IsoRestriction {
                side: BoxSide::VMin,
                value: v.0,
                range: u,
                vertices: [(c0, u.0), (c1, u.1)],
            },
            IsoRestriction {
                side: BoxSide::UMax,
                value: u.1,
                range: v,
                vertices: [(c1, v.0), (c2, v.1)],
            },
            IsoRestriction {
                side: BoxSide::VMax,
                value: v.1,
                range: u,
                vertices: [(c3, u.0), (c2, u.1)],
            },
            IsoRestriction {
                side: BoxSide::UMin,
                value: u.0,
                range: v,
                vertices: [(c0, v.0), (c3, v.1)],
            },
        ];

        Self { u, v, restrictions }
    }

    pub fn u_domain(&self) -> (T, T) {
        self.u
    }

    pub fn v_domain(&self) -> (T, T) {
        self.v
    }
}

impl<T: FloatingPoint> TopologyDomain<T> for RectangularDomain<T> {
    type Restriction = IsoRestriction<T>;

    fn classify(&self, point: &Point2<T>, tolerance: T) -> TopologyState {
        let (umin, umax) = self.u;
        let (vmin, vmax) = self.v;
        if point.x < umin - tolerance
            || point.x > umax + tolerance
            || point.y < vmin - tolerance
            || point.y > vmax + tolerance
        {
            TopologyState::Out
        } else if point.x <= umin + tolerance
            || point.x >= umax - tolerance
            || point.y <= vmin + tolerance
            || point.y >= vmax - tolerance
        {
            TopologyState::On
        } else {
            TopologyState::In
        }
    }

    fn restrictions(&self) -> &[Self::Restriction] {
        &self.restrictions
    }
}
