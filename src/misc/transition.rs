use nalgebra::Vector3;

use crate::misc::FloatingPoint;

/// How a traced line crosses another element (a restriction curve, or the visible side of a surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Transition {
    In,
    Out,
    /// Tangential contact.
    /// `opposite` is set when both tangents point in opposite directions.
    Touch { opposite: bool },
    #[default]
    Undecided,
}

impl Transition {
    pub fn is_decided(&self) -> bool {
        !matches!(self, Transition::Undecided)
    }
}

/// Compute the transitions of two crossing elements from their tangents at the crossing
/// and the normal of the surface both elements live on.
/// Returns `(transition of the first, transition of the second)`.
/// ```
/// use blend_walk::prelude::*;
/// use nalgebra::Vector3;
///
/// let (first, second) = make_transition(&Vector3::<f64>::x(), &Vector3::y(), &Vector3::z());
/// assert_eq!(first, Transition::Out);
/// assert_eq!(second, Transition::In);
/// ```
pub fn make_transition<T: FloatingPoint>(
    tangent_first: &Vector3<T>,
    tangent_second: &Vector3<T>,
    normal: &Vector3<T>,
) -> (Transition, Transition) {
    let n1 = tangent_first.norm();
    let n2 = tangent_second.norm();
    if n1 <= T::confusion() {
        return (Transition::Undecided, Transition::Undecided);
    }

    let cross = tangent_second.cross(tangent_first);
    let n12 = n1 * n2;
    let touch = || {
        let opposite = tangent_first.dot(tangent_second) < T::zero();
        (
            Transition::Touch { opposite },
            Transition::Touch { opposite },
        )
    };

    if n2 <= T::confusion() || cross.norm() <= T::from_f64(1e-6).unwrap() * n12 {
        return touch();
    }

    let mixed = cross.dot(normal) / n12;
    let eps = T::from_f64(1e-4).unwrap();
    if mixed > eps {
        (Transition::In, Transition::Out)
    } else if mixed < -eps {
        (Transition::Out, Transition::In)
    } else {
        touch()
    }
}
