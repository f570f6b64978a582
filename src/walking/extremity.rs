use nalgebra::{Point3, Vector3};

use crate::{
    domain::DomainVertex,
    misc::{FloatingPoint, Transition},
};

/// Attachment of an extremity to a restriction curve of the surface domain.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointOnArc<T: FloatingPoint> {
    /// index of the restriction in the domain
    arc_index: usize,
    /// parameter on the restriction
    parameter: T,
    line_transition: Transition,
    arc_transition: Transition,
}

impl<T: FloatingPoint> PointOnArc<T> {
    pub fn new(
        arc_index: usize,
        parameter: T,
        line_transition: Transition,
        arc_transition: Transition,
    ) -> Self {
        Self {
            arc_index,
            parameter,
            line_transition,
            arc_transition,
        }
    }

    pub fn arc_index(&self) -> usize {
        self.arc_index
    }

    pub fn parameter(&self) -> T {
        self.parameter
    }

    /// Transition of the traced line relative to the restriction
    pub fn line_transition(&self) -> Transition {
        self.line_transition
    }

    /// Transition of the restriction relative to the traced line
    pub fn arc_transition(&self) -> Transition {
        self.arc_transition
    }
}

/// Which of the two intersected elements an extremity belongs to
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExtremitySupport<T: FloatingPoint> {
    Surface { u: T, v: T },
    Curve { w: T },
}

/// Terminal sample of a traced line, annotated with the domain elements it lies on.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extremity<T: FloatingPoint> {
    point: Point3<T>,
    support: ExtremitySupport<T>,
    /// guide parameter
    parameter: T,
    tolerance: T,
    tangent: Option<Vector3<T>>,
    vertex: Option<DomainVertex<T>>,
    arcs: Vec<PointOnArc<T>>,
}

impl<T: FloatingPoint> Extremity<T> {
    pub fn on_surface(point: Point3<T>, u: T, v: T, parameter: T, tolerance: T) -> Self {
        Self {
            point,
            support: ExtremitySupport::Surface { u, v },
            parameter,
            tolerance,
            tangent: None,
            vertex: None,
            arcs: vec![],
        }
    }

    pub fn on_curve(point: Point3<T>, w: T, parameter: T, tolerance: T) -> Self {
        Self {
            point,
            support: ExtremitySupport::Curve { w },
            parameter,
            tolerance,
            tangent: None,
            vertex: None,
            arcs: vec![],
        }
    }

    pub fn point(&self) -> &Point3<T> {
        &self.point
    }

    pub fn support(&self) -> &ExtremitySupport<T> {
        &self.support
    }

    /// Surface parameters if the extremity lies on the surface
    pub fn parameters_on_surface(&self) -> Option<(T, T)> {
        match self.support {
            ExtremitySupport::Surface { u, v } => Some((u, v)),
            ExtremitySupport::Curve { .. } => None,
        }
    }

    /// Curve parameter if the extremity lies on the curve
    pub fn parameter_on_curve(&self) -> Option<T> {
        match self.support {
            ExtremitySupport::Curve { w } => Some(w),
            ExtremitySupport::Surface { .. } => None,
        }
    }

    pub fn parameter(&self) -> T {
        self.parameter
    }

    pub fn tolerance(&self) -> T {
        self.tolerance
    }

    pub fn tangent(&self) -> Option<&Vector3<T>> {
        self.tangent.as_ref()
    }

    pub fn set_tangent(&mut self, tangent: Vector3<T>) {
        self.tangent = Some(tangent);
    }

    pub fn vertex(&self) -> Option<&DomainVertex<T>> {
        self.vertex.as_ref()
    }

    pub fn is_vertex(&self) -> bool {
        self.vertex.is_some()
    }

    pub fn set_vertex(&mut self, vertex: DomainVertex<T>) {
        self.vertex = Some(vertex);
    }

    pub fn arcs(&self) -> &[PointOnArc<T>] {
        &self.arcs
    }

    pub fn add_arc(&mut self, arc: PointOnArc<T>) {
        self.arcs.push(arc);
    }
}
