use nalgebra::{Point2, Point3, Vector2, Vector3};

use crate::misc::FloatingPoint;

use super::{BlendPoint, BlendStatus};

/// Minimum squared cosine between a chord and the 3D tangents at its ends
const COS_REF_3D: f64 = 0.98;
/// Minimum squared cosine between a chord and the tangents in the parametric plane
const COS_REF_2D: f64 = 0.88;

/// Accept / reject a candidate sample by comparing it to the previous accepted one.
/// The surface branch & the curve branch are checked independently.
#[derive(Debug, Clone, Copy)]
pub struct DeflectionChecker<T: FloatingPoint> {
    /// walking direction (+1 or -1)
    sense: T,
    tolerance_3d: T,
    /// maximum deflection of the chord
    deflection: T,
    /// also check the samples in the parametric plane of the surface
    check_2d: bool,
}

impl<T: FloatingPoint> DeflectionChecker<T> {
    pub fn new(sense: T, tolerance_3d: T, deflection: T, check_2d: bool) -> Self {
        Self {
            sense,
            tolerance_3d,
            deflection,
            check_2d,
        }
    }

    /// Check the candidate on the surface branch.
    /// `resolution` is the u & v parametric resolution of the 3D tolerance.
    pub fn on_surface(
        &self,
        previous: &BlendPoint<T>,
        point: &Point3<T>,
        uv: &Point2<T>,
        tangent: &Vector3<T>,
        tangent_2d: &Vector2<T>,
        resolution: (T, T),
    ) -> BlendStatus {
        let cos_ref_3d = T::from_f64(COS_REF_3D).unwrap();
        let cos_ref_2d = T::from_f64(COS_REF_2D).unwrap();
        let tol2 = self.tolerance_3d * self.tolerance_3d;

        let prev_tangent = previous.tangent_on_surface();
        let chord = point - previous.point_on_surface();
        let norm = chord.norm_squared();
        let prev_norm = prev_tangent.norm_squared();
        if norm <= tol2 || prev_norm <= tol2 {
            return BlendStatus::SamePoints;
        }

        let cosi = self.sense * chord.dot(prev_tangent);
        if cosi < T::zero() {
            return BlendStatus::Backward;
        }
        if cosi * cosi / prev_norm / norm < cos_ref_3d {
            return BlendStatus::StepTooLarge;
        }

        let cosi = self.sense * chord.dot(tangent);
        if cosi * cosi / tangent.norm_squared() / norm < cos_ref_3d || cosi < T::zero() {
            return BlendStatus::StepTooLarge;
        }

        if self.check_2d {
            let (tolu, tolv) = resolution;
            let du = uv.x - previous.uv().x;
            let dv = uv.y - previous.uv().y;
            if du.abs() < tolu && dv.abs() < tolv {
                return BlendStatus::SamePoints;
            }

            let prev_2d = previous.tangent_2d();
            if prev_2d.x.abs() < tolu && prev_2d.y.abs() < tolv {
                return BlendStatus::SamePoints;
            }
            if self.sense * (du * prev_2d.x + dv * prev_2d.y) < T::zero() {
                return BlendStatus::Backward;
            }

            let cosi = self.sense * (du * tangent_2d.x + dv * tangent_2d.y) / tangent_2d.norm();
            if cosi * cosi / (du * du + dv * dv) < cos_ref_2d || cosi < T::zero() {
                return BlendStatus::StepTooLarge;
            }
        }

        self.classify_deflection(prev_tangent, tangent, norm)
    }

    /// Check the candidate on the curve branch.
    /// `resolution` is the parametric resolution of the 3D tolerance on the curve.
    pub fn on_curve(
        &self,
        previous: &BlendPoint<T>,
        point: &Point3<T>,
        w: T,
        tangent: &Vector3<T>,
        resolution: T,
    ) -> BlendStatus {
        let cos_ref_3d = T::from_f64(COS_REF_3D).unwrap();
        let tol2 = self.tolerance_3d * self.tolerance_3d;

        let prev_tangent = previous.tangent_on_curve();
        let chord = point - previous.point_on_curve();
        let norm = chord.norm_squared();
        let prev_norm = prev_tangent.norm_squared();
        if norm <= tol2 || prev_norm <= tol2 {
            return BlendStatus::SamePoints;
        }

        let cosi = self.sense * chord.dot(prev_tangent);
        if cosi < T::zero() {
            return BlendStatus::Backward;
        }
        if cosi * cosi / prev_norm / norm < cos_ref_3d {
            return BlendStatus::StepTooLarge;
        }

        let cosi = self.sense * chord.dot(tangent);
        if cosi * cosi / tangent.norm_squared() / norm < cos_ref_3d || cosi < T::zero() {
            return BlendStatus::StepTooLarge;
        }

        if self.check_2d && (w - previous.parameter_on_curve()).abs() < resolution {
            return BlendStatus::SamePoints;
        }

        self.classify_deflection(prev_tangent, tangent, norm)
    }

    /// Compare the deflection estimated from the tangents at both ends of a chord
    /// (of squared length `norm`) to the allowed deflection.
    fn classify_deflection(
        &self,
        prev_tangent: &Vector3<T>,
        tangent: &Vector3<T>,
        norm: T,
    ) -> BlendStatus {
        let current = (prev_tangent.normalize() - tangent.normalize()).norm_squared() * norm
            / T::from_f64(64.).unwrap();
        let fleche2 = self.deflection * self.deflection;
        if current <= T::from_f64(0.25).unwrap() * fleche2 {
            BlendStatus::StepTooSmall
        } else if current > fleche2 {
            BlendStatus::StepTooLarge
        } else {
            BlendStatus::Ok
        }
    }
}
