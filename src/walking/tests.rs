use approx::assert_relative_eq;
use itertools::Itertools;
use nalgebra::{DMatrix, DVector, Point2, Point3, Vector2, Vector3};

use crate::{
    curve::LineCurve,
    domain::{IsoRestriction, RectangularDomain, TopologyDomain},
    function::BlendFunction,
    misc::{TopologyState, Transition},
    solver::NewtonRootSolver,
    surface::PlanarSurface,
};

use super::*;

/// Cross-sections meeting the plane z = 0 along the straight path `t * direction`
/// and the line (w, 1, 1) at w = t.
#[derive(Debug, Clone)]
struct StraightBlend {
    direction: Vector2<f64>,
    /// angle between the surface tangent at the first section and at the other ones
    kink: f64,
    /// orientation of the reported tangents
    orientation: f64,
    /// length of the surface normal given with the section tangent
    normal_scale: f64,
    variables: usize,
    /// length of the tolerance vector
    tolerances: usize,
    first: f64,
    parameter: f64,
    /// number of calls to `set`
    sets: usize,
    cached: DVector<f64>,
}

impl StraightBlend {
    fn new(direction: Vector2<f64>) -> Self {
        Self {
            direction,
            kink: 0.,
            orientation: 1.,
            normal_scale: 1.,
            variables: 3,
            tolerances: 3,
            first: 0.,
            parameter: 0.,
            sets: 0,
            cached: DVector::zeros(3),
        }
    }

    fn with_kink(mut self, kink: f64) -> Self {
        self.kink = kink;
        self
    }

    fn with_orientation(mut self, orientation: f64) -> Self {
        self.orientation = orientation;
        self
    }

    fn with_normal_scale(mut self, normal_scale: f64) -> Self {
        self.normal_scale = normal_scale;
        self
    }

    fn target(&self) -> DVector<f64> {
        let t = self.parameter;
        DVector::from_vec(vec![t * self.direction.x, t * self.direction.y, t])
    }
}

impl BlendFunction<f64> for StraightBlend {
    fn nb_variables(&self) -> usize {
        self.variables
    }

    fn set(&mut self, parameter: f64) {
        self.parameter = parameter;
        self.sets += 1;
    }

    fn tolerance(&self, tolerance: f64) -> DVector<f64> {
        DVector::from_element(self.tolerances, tolerance)
    }

    fn bounds(&self) -> (DVector<f64>, DVector<f64>) {
        (
            DVector::from_element(3, -10.),
            DVector::from_element(3, 10.),
        )
    }

    fn values(&self, x: &DVector<f64>) -> anyhow::Result<DVector<f64>> {
        Ok(x - self.target())
    }

    fn derivatives(&self, _x: &DVector<f64>) -> anyhow::Result<DMatrix<f64>> {
        Ok(DMatrix::identity(3, 3))
    }

    fn is_solution(&mut self, solution: &DVector<f64>, tolerance: f64) -> bool {
        let ok = (solution - self.target()).norm() <= tolerance;
        if ok {
            self.cached = solution.clone();
        }
        ok
    }

    fn point_on_surface(&self) -> Point3<f64> {
        Point3::new(self.cached[0], self.cached[1], 0.)
    }

    fn point_on_curve(&self) -> Point3<f64> {
        Point3::new(self.cached[2], 1., 1.)
    }

    fn pnt2d(&self) -> Point2<f64> {
        Point2::new(self.cached[0], self.cached[1])
    }

    fn parameter_on_curve(&self) -> f64 {
        self.cached[2]
    }

    fn tangent_on_surface(&self) -> Vector3<f64> {
        let base = self.direction.y.atan2(self.direction.x);
        let half = self.kink / 2.;
        let angle = if self.parameter == self.first {
            base + half
        } else {
            base - half
        };
        Vector3::new(angle.cos(), angle.sin(), 0.) * self.orientation
    }

    fn tangent_on_curve(&self) -> Vector3<f64> {
        Vector3::x() * self.orientation
    }

    fn tangent_2d(&self) -> Vector2<f64> {
        self.direction * self.orientation
    }

    fn tangent(&self, _u: f64, _v: f64) -> (Vector3<f64>, Vector3<f64>) {
        (Vector3::new(0., 1., 1.), Vector3::z() * self.normal_scale)
    }
}

/// Domain rejecting every parametric point
struct OutsideDomain(RectangularDomain<f64>);

impl TopologyDomain<f64> for OutsideDomain {
    type Restriction = IsoRestriction<f64>;

    fn classify(&self, _point: &Point2<f64>, _tolerance: f64) -> TopologyState {
        TopologyState::Out
    }

    fn restrictions(&self) -> &[Self::Restriction] {
        self.0.restrictions()
    }
}

fn surface() -> PlanarSurface<f64> {
    PlanarSurface::xy()
}

fn curve() -> LineCurve<f64> {
    LineCurve::new(Point3::new(0., 1., 1.), Vector3::x())
}

fn large_domain() -> RectangularDomain<f64> {
    RectangularDomain::new((-2., 2.), (-2., 2.), 1e-6)
}

fn options() -> WalkingOptions<f64> {
    WalkingOptions::default()
        .with_max_step(0.25)
        .with_tolerance_3d(1e-6)
        .with_tolerance_guide(1e-6)
}

#[test]
fn walk_to_bound() {
    let (surface, curve, domain) = (surface(), curve(), large_domain());
    let mut function = StraightBlend::new(Vector2::x());
    let mut walker =
        CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
    walker
        .perform(&mut function, 0., 1., &DVector::zeros(3), options())
        .unwrap();

    assert!(walker.is_done());
    assert!(!walker.is_complete());
    assert_eq!(walker.outcome(), Some(WalkOutcome::ReachedBound));

    let line = walker.line();
    assert_eq!(line.parameters(), vec![0., 0.25, 0.5, 0.75, 1.]);
    line.chord_lengths()
        .iter()
        .for_each(|c| assert!(*c <= 0.25 + 1e-12));
    assert_eq!(line.transition(), Transition::Out);

    let start = line.start().unwrap();
    assert_relative_eq!(start.on_surface.parameter(), 0.);
    let end = line.end().unwrap();
    assert_relative_eq!(end.on_surface.parameter(), 1.);
    assert_relative_eq!(*end.on_surface.point(), Point3::new(1., 0., 0.), epsilon = 1e-9);
    assert_relative_eq!(end.on_curve.parameter_on_curve().unwrap(), 1., epsilon = 1e-9);
    assert!(end.on_surface.arcs().is_empty());
    assert!(!end.on_surface.is_vertex());
}

#[test]
fn step_halves_until_floor() {
    let (surface, curve, domain) = (surface(), curve(), large_domain());
    let mut function = StraightBlend::new(Vector2::x()).with_kink(0.1);
    let mut walker =
        CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
    let options = options()
        .with_tolerance_guide(1e-3)
        .with_deflection(1e-6);
    walker
        .perform(&mut function, 0., 1., &DVector::zeros(3), options)
        .unwrap();

    // 0.25 / 2^8 < 1e-3 <= 0.25 / 2^7: one section at the start & eight rejected trials
    assert_eq!(function.sets, 9);
    assert_eq!(walker.outcome(), Some(WalkOutcome::Void));
    assert!(!walker.has_backtracked());

    let line = walker.line();
    assert_eq!(line.len(), 1);
    assert_relative_eq!(line.end().unwrap().on_surface.parameter(), 0.);
}

#[test]
fn step_grows_back_after_halving() {
    let (surface, curve, domain) = (surface(), curve(), large_domain());
    let mut function = StraightBlend::new(Vector2::x()).with_kink(0.1);
    let mut walker =
        CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
    walker
        .perform(
            &mut function,
            0.,
            1.,
            &DVector::zeros(3),
            options().with_deflection(2e-3),
        )
        .unwrap();

    // the kink rejects 0.25 but passes at 0.125, then straight steps grow by 1.5 up to 0.25
    assert_eq!(walker.outcome(), Some(WalkOutcome::ReachedBound));
    assert!(!walker.has_backtracked());
    assert_eq!(
        walker.line().parameters(),
        vec![0., 0.125, 0.25, 0.4375, 0.6875, 0.9375, 1.]
    );
}

#[test]
fn arrest_test_fold() {
    let (surface, curve, domain) = (surface(), curve(), large_domain());
    let options = options().with_deflection(2e-3);
    let candidate = |function: &mut StraightBlend, parameter: f64| {
        function.set(parameter);
        function.target()
    };

    // the surface branch accepts the kinked step, the curve branch finds it too small
    for fallback in [BlendStatus::Ok, BlendStatus::OnRestriction] {
        let mut function = StraightBlend::new(Vector2::x()).with_kink(0.1);
        let mut walker =
            CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
        walker
            .perform(&mut function, 0., 0., &DVector::zeros(3), options)
            .unwrap();
        let solution = candidate(&mut function, 0.125);
        assert_eq!(
            walker.test_arret(&mut function, &solution, 0.125, true, fallback),
            fallback
        );
    }

    // both branches find the straight step too small
    let mut function = StraightBlend::new(Vector2::x());
    let mut walker =
        CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
    walker
        .perform(&mut function, 0., 0., &DVector::zeros(3), options)
        .unwrap();
    let solution = candidate(&mut function, 0.125);
    assert_eq!(
        walker.test_arret(
            &mut function,
            &solution,
            0.125,
            true,
            BlendStatus::OnRestriction
        ),
        BlendStatus::OnRestriction
    );
    let solution = candidate(&mut function, 0.25);
    assert_eq!(
        walker.test_arret(&mut function, &solution, 0.25, true, BlendStatus::Ok),
        BlendStatus::StepTooSmall
    );

    // the sample at 0.25 was committed: neither branch accepts it twice
    assert_eq!(
        walker.test_arret(&mut function, &solution, 0.25, true, BlendStatus::Ok),
        BlendStatus::SamePoints
    );
    assert_eq!(
        walker.test_arret(
            &mut function,
            &solution,
            0.25,
            true,
            BlendStatus::OnRestriction
        ),
        BlendStatus::OnRestriction
    );
    assert!(!walker.has_backtracked());
}

#[test]
fn transition_with_unnormalized_normal() {
    let (surface, curve, domain) = (surface(), curve(), large_domain());
    for normal_scale in [1e-9, 1e3] {
        let mut function = StraightBlend::new(Vector2::x()).with_normal_scale(normal_scale);
        let mut walker =
            CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
        walker
            .perform(&mut function, 0., 1., &DVector::zeros(3), options())
            .unwrap();
        assert_eq!(walker.line().transition(), Transition::Out);
    }

    // a vanishing normal leaves the transition undecided
    let mut function = StraightBlend::new(Vector2::x()).with_normal_scale(0.);
    let mut walker =
        CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
    walker
        .perform(&mut function, 0., 1., &DVector::zeros(3), options())
        .unwrap();
    assert_eq!(walker.line().transition(), Transition::Undecided);
}

#[test]
fn backward_samples_are_rejected() {
    let (surface, curve, domain) = (surface(), curve(), large_domain());
    let mut function = StraightBlend::new(Vector2::x()).with_orientation(-1.);
    let mut walker =
        CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
    walker
        .perform(&mut function, 0., 1., &DVector::zeros(3), options())
        .unwrap();

    assert!(walker.has_backtracked());
    assert_eq!(walker.outcome(), Some(WalkOutcome::Void));
    assert_eq!(walker.line().len(), 1);
}

#[test]
fn complete_in_other_direction() {
    let (surface, curve, domain) = (surface(), curve(), large_domain());
    let mut function = StraightBlend::new(Vector2::x());
    let mut walker =
        CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
    walker
        .perform(&mut function, 0., 1., &DVector::zeros(3), options())
        .unwrap();
    walker.complete(&mut function, -1.).unwrap();

    assert!(walker.is_complete());
    assert_eq!(walker.complete_outcome(), Some(WalkOutcome::ReachedBound));

    let line = walker.line().clone();
    assert_eq!(line.len(), 9);
    line.parameters()
        .iter()
        .tuple_windows()
        .for_each(|(a, b)| assert!(a < b));
    assert_relative_eq!(line.first().unwrap().parameter(), -1.);
    assert_relative_eq!(line.start().unwrap().on_surface.parameter(), -1.);
    assert_relative_eq!(line.end().unwrap().on_surface.parameter(), 1.);

    // a second call does nothing
    walker.complete(&mut function, -2.).unwrap();
    assert_eq!(walker.line(), &line);
}

#[test]
fn complete_requires_perform() {
    let (surface, curve, domain) = (surface(), curve(), large_domain());
    let mut function = StraightBlend::new(Vector2::x());
    let mut walker =
        CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
    assert_eq!(
        walker.complete(&mut function, -1.),
        Err(WalkingError::NotDone)
    );
}

#[test]
fn complete_toward_first_parameter() {
    let (surface, curve, domain) = (surface(), curve(), large_domain());
    let mut function = StraightBlend::new(Vector2::x());
    let mut walker =
        CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
    walker
        .perform(&mut function, 0., 1., &DVector::zeros(3), options())
        .unwrap();
    let sets = function.sets;
    walker.complete(&mut function, 0.).unwrap();

    assert_eq!(function.sets, sets);
    assert_eq!(walker.complete_outcome(), Some(WalkOutcome::ReachedBound));
    assert_eq!(walker.line().len(), 5);
    assert_relative_eq!(walker.line().start().unwrap().on_surface.parameter(), 0.);
}

#[test]
fn walks_are_deterministic() {
    let (surface, curve, domain) = (surface(), curve(), large_domain());
    let walk = || {
        let mut function = StraightBlend::new(Vector2::new(1., 0.5));
        let mut walker =
            CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
        walker
            .perform(
                &mut function,
                0.,
                1.,
                &DVector::from_vec(vec![0.1, -0.1, 0.05]),
                options(),
            )
            .unwrap();
        walker.complete(&mut function, -1.).unwrap();
        walker.into_line()
    };
    assert_eq!(walk(), walk());
}

#[test]
fn leaving_domain_without_reframing() {
    let (surface, curve) = (surface(), curve());
    let domain = RectangularDomain::new((-2., 0.6), (-2., 2.), 1e-6);
    let mut function = StraightBlend::new(Vector2::x());
    let mut walker =
        CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
    walker
        .perform(&mut function, 0., 1., &DVector::zeros(3), options())
        .unwrap();

    assert_eq!(walker.outcome(), Some(WalkOutcome::SamePoints));
    let line = walker.line();
    assert_eq!(line.parameters(), vec![0., 0.25, 0.5]);
    assert_relative_eq!(line.end().unwrap().on_surface.parameter(), 0.5);
    assert!(line.end().unwrap().on_surface.arcs().is_empty());
}

#[test]
fn leaving_domain_through_restriction() {
    let (surface, curve) = (surface(), curve());
    let domain = RectangularDomain::new((-2., 0.6), (-2., 2.), 1e-6);
    let mut function = StraightBlend::new(Vector2::x());
    let mut walker =
        CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
    let options = options().with_reframing(Reframing::Bisection);
    walker
        .perform(&mut function, 0., 1., &DVector::zeros(3), options)
        .unwrap();

    assert_eq!(walker.outcome(), Some(WalkOutcome::OnRestriction));
    let line = walker.line();
    assert_eq!(line.len(), 4);
    assert_relative_eq!(line.last().unwrap().parameter(), 0.6, epsilon = 1e-5);

    let end = &line.end().unwrap().on_surface;
    assert!(!end.is_vertex());
    assert_eq!(end.arcs().len(), 1);
    let arc = &end.arcs()[0];
    assert_eq!(arc.arc_index(), 1);
    assert_eq!(domain.restrictions()[1].side(), crate::domain::BoxSide::UMax);
    assert_relative_eq!(arc.parameter(), 0., epsilon = 1e-9);
    assert_eq!(arc.line_transition(), Transition::Out);
    assert_eq!(arc.arc_transition(), Transition::In);
}

#[test]
fn leaving_domain_through_corner() {
    let (surface, curve) = (surface(), curve());
    let domain = RectangularDomain::new((-1., 0.6), (-0.6, 1.), 1e-4);
    let mut function = StraightBlend::new(Vector2::new(1., -1.));
    let mut walker =
        CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
    let options = options().with_reframing(Reframing::Bisection);
    walker
        .perform(&mut function, 0., 1., &DVector::zeros(3), options)
        .unwrap();

    assert_eq!(walker.outcome(), Some(WalkOutcome::OnRestriction));
    let end = &walker.line().end().unwrap().on_surface;
    let vertex = end.vertex().unwrap();
    assert_eq!(vertex.id(), 1);
    assert_relative_eq!(*vertex.uv(), Point2::new(0.6, -0.6));

    let arcs = end.arcs();
    assert_eq!(arcs.len(), 2);
    assert_eq!(arcs[0].arc_index(), 0);
    assert_relative_eq!(arcs[0].parameter(), 0.6, epsilon = 1e-5);
    assert_eq!(arcs[1].arc_index(), 1);
    assert_relative_eq!(arcs[1].parameter(), -0.6, epsilon = 1e-5);
}

#[test]
fn first_trial_outside() {
    let (surface, curve) = (surface(), curve());
    let domain = OutsideDomain(large_domain());
    let options = options().with_refine_first_point(false);

    let mut function = StraightBlend::new(Vector2::x());
    let mut walker =
        CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
    walker
        .perform(&mut function, 0., 1., &DVector::zeros(3), options)
        .unwrap();
    assert_eq!(walker.outcome(), Some(WalkOutcome::SamePoints));
    assert_eq!(walker.line().len(), 1);

    let mut walker =
        CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
    walker
        .perform(
            &mut function,
            0.,
            1.,
            &DVector::zeros(3),
            options.with_reframing(Reframing::Bisection),
        )
        .unwrap();
    assert_eq!(walker.outcome(), Some(WalkOutcome::OnRestriction));
    assert_eq!(walker.line().len(), 1);
}

#[test]
fn first_section_failures() {
    let (surface, curve, domain) = (surface(), curve(), large_domain());
    let mut function = StraightBlend::new(Vector2::x());
    let mut walker =
        CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());

    assert_eq!(
        walker.perform(&mut function, 0., 1., &DVector::zeros(2), options()),
        Err(WalkingError::DimensionMismatch {
            expected: 3,
            actual: 2
        })
    );
    assert_eq!(
        walker.perform(&mut function, 3., 4., &DVector::zeros(3), options()),
        Err(WalkingError::FirstSectionOutsideDomain)
    );
    assert_eq!(
        walker.perform(
            &mut function,
            0.5,
            1.,
            &DVector::zeros(3),
            options().with_refine_first_point(false)
        ),
        Err(WalkingError::DegenerateFirstSection)
    );
    assert!(!walker.is_done());
}

#[test]
fn short_dimensions() {
    let (surface, curve, domain) = (surface(), curve(), large_domain());
    let mut walker =
        CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());

    let mut function = StraightBlend::new(Vector2::x());
    function.variables = 1;
    assert_eq!(
        walker.perform(&mut function, 0., 1., &DVector::zeros(1), options()),
        Err(WalkingError::DimensionMismatch {
            expected: 2,
            actual: 1
        })
    );

    let mut function = StraightBlend::new(Vector2::x());
    function.tolerances = 1;
    assert_eq!(
        walker.perform(&mut function, 0., 1., &DVector::zeros(3), options()),
        Err(WalkingError::DimensionMismatch {
            expected: 3,
            actual: 1
        })
    );
    assert!(!walker.is_done());
}

#[test]
fn trace_sections() {
    let (surface, curve, domain) = (surface(), curve(), large_domain());
    let mut function = StraightBlend::new(Vector2::x());
    let mut recorder = SectionRecorder::new();
    {
        let mut walker =
            CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default())
                .with_tracer(&mut recorder);
        walker
            .perform(&mut function, 0., 1., &DVector::zeros(3), options())
            .unwrap();
    }

    assert_eq!(recorder.counter(), 5);
    let parameters = recorder
        .sections()
        .iter()
        .map(|s| s.parameter)
        .collect_vec();
    assert_eq!(parameters, vec![0., 0.25, 0.5, 0.75, 1.]);
    assert_eq!(recorder.sections()[4].index, 5);
    assert_relative_eq!(
        recorder.sections()[2].point_on_curve,
        Point3::new(0.5, 1., 1.),
        epsilon = 1e-9
    );
}
