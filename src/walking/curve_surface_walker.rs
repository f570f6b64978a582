use nalgebra::{DVector, Point2};

use crate::{
    curve::ParametricCurve,
    domain::{DomainVertex, Restriction, TopologyDomain},
    function::BlendFunction,
    misc::{FloatingPoint, TopologyState, Transition},
    solver::RootSolver,
    surface::ParametricSurface,
};

use super::{
    arc_transition, BlendLine, BlendPoint, BlendStatus, DeflectionChecker, Extremity, PointOnArc,
    Reframing, SectionTracer, WalkOutcome, WalkingError, WalkingOptions,
};

/// Maximum number of bisections to locate a domain crossing
const MAX_REFRAME_ITERS: usize = 64;

/// Sample located on the boundary of the surface domain
#[derive(Debug, Clone)]
struct Reframed<T: FloatingPoint> {
    parameter: T,
    solution: DVector<T>,
    /// index of the nearest restriction
    arc_index: usize,
    /// parameter on the nearest restriction
    arc_parameter: T,
    vertex: Option<DomainVertex<T>>,
}

/// Marching engine tracing the intersection line of a blend cross-section sweeping along a curve
/// with a surface bounded by its parametric domain.
///
/// The unknowns of the blend function start with the surface parameters `(u, v)`.
/// [`CurveSurfaceWalker::perform`] walks from the first section toward one bound of the guide parameter,
/// [`CurveSurfaceWalker::complete`] walks from the same first section toward the other bound.
/// ```
/// use blend_walk::prelude::*;
/// use nalgebra::{DMatrix, DVector, Point2, Point3, Vector2, Vector3};
///
/// /// The cross-section at `t` meets the plane z = 0 at (t, 0) & the line (w, 1, 1) at w = t.
/// struct Straight {
///     solution: DVector<f64>,
/// }
///
/// impl BlendFunction<f64> for Straight {
///     fn nb_variables(&self) -> usize { 3 }
///     fn set(&mut self, parameter: f64) { self.solution = DVector::from_vec(vec![parameter, 0., parameter]); }
///     fn tolerance(&self, tolerance: f64) -> DVector<f64> { DVector::from_element(3, tolerance) }
///     fn bounds(&self) -> (DVector<f64>, DVector<f64>) {
///         (DVector::from_element(3, -10.), DVector::from_element(3, 10.))
///     }
///     fn values(&self, x: &DVector<f64>) -> anyhow::Result<DVector<f64>> { Ok(x - &self.solution) }
///     fn derivatives(&self, _x: &DVector<f64>) -> anyhow::Result<DMatrix<f64>> { Ok(DMatrix::identity(3, 3)) }
///     fn is_solution(&mut self, solution: &DVector<f64>, tolerance: f64) -> bool {
///         (solution - &self.solution).norm() <= tolerance
///     }
///     fn point_on_surface(&self) -> Point3<f64> { Point3::new(self.solution[0], 0., 0.) }
///     fn point_on_curve(&self) -> Point3<f64> { Point3::new(self.solution[2], 1., 1.) }
///     fn pnt2d(&self) -> Point2<f64> { Point2::new(self.solution[0], self.solution[1]) }
///     fn parameter_on_curve(&self) -> f64 { self.solution[2] }
///     fn tangent_on_surface(&self) -> Vector3<f64> { Vector3::x() }
///     fn tangent_on_curve(&self) -> Vector3<f64> { Vector3::x() }
///     fn tangent_2d(&self) -> Vector2<f64> { Vector2::x() }
///     fn tangent(&self, _u: f64, _v: f64) -> (Vector3<f64>, Vector3<f64>) {
///         (Vector3::new(0., 1., 1.), Vector3::z())
///     }
/// }
///
/// let surface = PlanarSurface::xy();
/// let curve = LineCurve::new(Point3::new(0., 1., 1.), Vector3::x());
/// let domain = RectangularDomain::new((-2., 2.), (-2., 2.), 1e-6);
/// let mut function = Straight { solution: DVector::zeros(3) };
///
/// let mut walker = CurveSurfaceWalker::new(&surface, &curve, &domain, NewtonRootSolver::default());
/// let options = WalkingOptions::default().with_max_step(0.25);
/// walker.perform(&mut function, 0., 1., &DVector::zeros(3), options).unwrap();
/// walker.complete(&mut function, -1.).unwrap();
///
/// assert_eq!(walker.outcome(), Some(WalkOutcome::ReachedBound));
/// assert_eq!(walker.line().parameters(), vec![-1., -0.75, -0.5, -0.25, 0., 0.25, 0.5, 0.75, 1.]);
/// ```
pub struct CurveSurfaceWalker<'a, T, S, C, D, R>
where
    T: FloatingPoint,
    S: ParametricSurface<T>,
    C: ParametricCurve<T>,
    D: TopologyDomain<T>,
    R: RootSolver<T>,
{
    surface: &'a S,
    curve: &'a C,
    domain: &'a D,
    solver: R,
    tracer: Option<&'a mut dyn SectionTracer<T>>,
    options: WalkingOptions<T>,
    line: BlendLine<T>,
    /// walking direction (+1 or -1)
    sense: T,
    /// guide parameter of the last accepted sample
    parameter: T,
    first_parameter: T,
    first_solution: DVector<T>,
    first_point: Option<BlendPoint<T>>,
    /// last accepted sample
    previous: Option<BlendPoint<T>>,
    tolerance: DVector<T>,
    lower: DVector<T>,
    upper: DVector<T>,
    done: bool,
    complete: bool,
    backtracked: bool,
    transition_computed: bool,
    outcome: Option<WalkOutcome>,
    complete_outcome: Option<WalkOutcome>,
}

impl<'a, T, S, C, D, R> CurveSurfaceWalker<'a, T, S, C, D, R>
where
    T: FloatingPoint,
    S: ParametricSurface<T>,
    C: ParametricCurve<T>,
    D: TopologyDomain<T>,
    R: RootSolver<T>,
{
    pub fn new(surface: &'a S, curve: &'a C, domain: &'a D, solver: R) -> Self {
        Self {
            surface,
            curve,
            domain,
            solver,
            tracer: None,
            options: WalkingOptions::default(),
            line: BlendLine::new(),
            sense: T::one(),
            parameter: T::zero(),
            first_parameter: T::zero(),
            first_solution: DVector::zeros(0),
            first_point: None,
            previous: None,
            tolerance: DVector::zeros(0),
            lower: DVector::zeros(0),
            upper: DVector::zeros(0),
            done: false,
            complete: false,
            backtracked: false,
            transition_computed: false,
            outcome: None,
            complete_outcome: None,
        }
    }

    /// Report the first section and every accepted one to `tracer`
    pub fn with_tracer(mut self, tracer: &'a mut dyn SectionTracer<T>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Walk from the section at `first` toward `bound`.
    /// `initial_solution` is the solution (or its guess when the first point is refined) at `first`.
    pub fn perform<F: BlendFunction<T>>(
        &mut self,
        function: &mut F,
        first: T,
        bound: T,
        initial_solution: &DVector<T>,
        options: WalkingOptions<T>,
    ) -> Result<(), WalkingError> {
        // the unknowns start with (u, v)
        let expected = function.nb_variables();
        if expected < 2 {
            return Err(WalkingError::DimensionMismatch {
                expected: 2,
                actual: expected,
            });
        }
        if initial_solution.len() != expected {
            return Err(WalkingError::DimensionMismatch {
                expected,
                actual: initial_solution.len(),
            });
        }

        function.set(first);
        let tolerance = function.tolerance(options.tolerance_3d);
        let (lower, upper) = function.bounds();
        if let Some(actual) = [tolerance.len(), lower.len(), upper.len()]
            .into_iter()
            .find(|len| *len != expected)
        {
            return Err(WalkingError::DimensionMismatch { expected, actual });
        }

        self.options = options;
        self.line = BlendLine::new();
        self.done = false;
        self.complete = false;
        self.backtracked = false;
        self.transition_computed = false;
        self.outcome = None;
        self.complete_outcome = None;
        self.first_point = None;
        self.previous = None;
        self.sense = if bound - first >= T::zero() {
            T::one()
        } else {
            -T::one()
        };

        self.tolerance = tolerance;
        self.lower = lower;
        self.upper = upper;

        let solution = if options.refine_first_point {
            let solution = self
                .solver
                .solve(
                    &*function,
                    initial_solution,
                    &self.tolerance,
                    &self.lower,
                    &self.upper,
                )
                .ok_or(WalkingError::FirstSectionNotConverged)?;
            let uv = Point2::new(solution[0], solution[1]);
            if self.domain.classify(&uv, self.tolerance_2d()) != TopologyState::In {
                return Err(WalkingError::FirstSectionOutsideDomain);
            }
            solution
        } else {
            initial_solution.clone()
        };

        self.first_parameter = first;
        self.parameter = first;
        self.first_solution = solution.clone();

        if self.test_arret(function, &solution, first, false, BlendStatus::Ok) != BlendStatus::Ok
        {
            return Err(WalkingError::DegenerateFirstSection);
        }
        let pivot = self
            .previous
            .clone()
            .ok_or(WalkingError::DegenerateFirstSection)?;

        #[cfg(feature = "log")]
        log::debug!(
            "first section at {:?}: {:?}",
            first,
            pivot.point_on_surface()
        );

        self.trace(&pivot);
        self.line.append(pivot.clone());
        let (on_surface, on_curve) = self.extremities(&pivot);
        if self.sense > T::zero() {
            self.line.set_start_points(on_surface, on_curve);
        } else {
            self.line.set_end_points(on_surface, on_curve);
        }
        self.first_point = Some(pivot);

        let outcome = self.internal_perform(function, bound);
        self.outcome = Some(outcome);
        self.done = true;
        Ok(())
    }

    /// Walk from the first section in the opposite direction toward `other_bound`.
    /// Calling it again once completed does nothing.
    pub fn complete<F: BlendFunction<T>>(
        &mut self,
        function: &mut F,
        other_bound: T,
    ) -> Result<(), WalkingError> {
        if !self.done {
            return Err(WalkingError::NotDone);
        }
        if self.complete {
            return Ok(());
        }

        let pivot = self.first_point.clone().ok_or(WalkingError::NotDone)?;
        self.sense = -self.sense;
        self.previous = Some(pivot);
        self.parameter = self.first_parameter;

        let outcome = self.internal_perform(function, other_bound);
        self.complete_outcome = Some(outcome);
        self.complete = true;
        Ok(())
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Check if a candidate sample has ever gone back relative to the walking direction
    pub fn has_backtracked(&self) -> bool {
        self.backtracked
    }

    /// Outcome of the walk run by [`CurveSurfaceWalker::perform`]
    pub fn outcome(&self) -> Option<WalkOutcome> {
        self.outcome
    }

    /// Outcome of the walk run by [`CurveSurfaceWalker::complete`]
    pub fn complete_outcome(&self) -> Option<WalkOutcome> {
        self.complete_outcome
    }

    pub fn line(&self) -> &BlendLine<T> {
        &self.line
    }

    pub fn into_line(self) -> BlendLine<T> {
        self.line
    }

    fn internal_perform<F: BlendFunction<T>>(&mut self, function: &mut F, bound: T) -> WalkOutcome {
        let max_step = self.options.max_step;
        let tolerance_guide = self.options.tolerance_guide;

        let mut stepw = max_step;
        let mut parprec = self.parameter;
        let mut parinit = self.first_solution.clone();

        if self.sense * (bound - parprec) <= tolerance_guide {
            return self.close(WalkOutcome::ReachedBound);
        }

        let mut param = self.next_parameter(parprec, stepw, bound);
        loop {
            function.set(param);

            let mut restriction = None;
            let mut accepted = None;
            let status = match self.solver.solve(
                &*function,
                &parinit,
                &self.tolerance,
                &self.lower,
                &self.upper,
            ) {
                None => BlendStatus::StepTooLarge,
                Some(solution) => {
                    let uv = Point2::new(solution[0], solution[1]);
                    if self.domain.classify(&uv, self.tolerance_2d()).is_inside() {
                        let status =
                            self.test_arret(function, &solution, param, true, BlendStatus::Ok);
                        accepted = Some(solution);
                        status
                    } else {
                        match self.options.reframing {
                            Reframing::Disabled => BlendStatus::SamePoints,
                            Reframing::Bisection => {
                                match self.reframe(function, parprec, &parinit, param, solution) {
                                    Some(reframed) => {
                                        param = reframed.parameter;
                                        let status = self.test_arret(
                                            function,
                                            &reframed.solution,
                                            param,
                                            true,
                                            BlendStatus::OnRestriction,
                                        );
                                        restriction = Some((
                                            reframed.arc_index,
                                            reframed.arc_parameter,
                                            reframed.vertex,
                                        ));
                                        status
                                    }
                                    None => BlendStatus::SamePoints,
                                }
                            }
                        }
                    }
                }
            };

            match status {
                BlendStatus::Ok | BlendStatus::StepTooSmall => {
                    self.push_previous();
                    if let Some(solution) = accepted {
                        parinit = solution;
                    }
                    parprec = param;
                    self.parameter = param;
                    if status == BlendStatus::StepTooSmall {
                        stepw = (stepw * T::from_f64(1.5).unwrap()).min(max_step);
                    }
                    if param == bound {
                        return self.close(WalkOutcome::ReachedBound);
                    }
                    param = self.next_parameter(parprec, stepw, bound);
                }
                BlendStatus::StepTooLarge | BlendStatus::Backward => {
                    stepw /= T::from_f64(2.).unwrap();
                    if stepw < tolerance_guide {
                        let outcome = if self.line.len() >= 2 {
                            #[cfg(feature = "log")]
                            log::warn!("walk stopped at {:?}: step below tolerance", parprec);
                            WalkOutcome::StoppedMidWalk
                        } else {
                            WalkOutcome::Void
                        };
                        return self.close(outcome);
                    }
                    param = self.next_parameter(parprec, stepw, bound);
                }
                BlendStatus::OnRestriction => {
                    let Some((arc_index, arc_parameter, vertex)) = restriction else {
                        return self.close(WalkOutcome::SamePoints);
                    };
                    if !self.is_previous_in_line() {
                        self.push_previous();
                        self.parameter = param;
                    }
                    return self.close_on_restriction(arc_index, arc_parameter, vertex);
                }
                BlendStatus::SamePoints => {
                    #[cfg(feature = "log")]
                    log::warn!("walk stopped at {:?}: confused sections", param);
                    return self.close(WalkOutcome::SamePoints);
                }
            }
        }
    }

    /// Classify the candidate `solution` at the guide parameter `parameter`
    /// and make it the previous point if it is accepted.
    pub(super) fn test_arret<F: BlendFunction<T>>(
        &mut self,
        function: &mut F,
        solution: &DVector<T>,
        parameter: T,
        test_deflection: bool,
        fallback: BlendStatus,
    ) -> BlendStatus {
        if !function.is_solution(solution, self.options.tolerance_3d) {
            return BlendStatus::StepTooLarge;
        }

        let candidate = BlendPoint::new(
            function.point_on_surface(),
            function.point_on_curve(),
            parameter,
            function.pnt2d(),
            function.parameter_on_curve(),
            function.tangent_on_surface(),
            function.tangent_on_curve(),
            function.tangent_2d(),
        );

        let (on_surface, on_curve) = match &self.previous {
            Some(previous) if test_deflection && self.options.check_deflection => {
                let checker = DeflectionChecker::new(
                    self.sense,
                    self.options.tolerance_3d,
                    self.options.deflection,
                    self.options.check_2d,
                );
                let tolerance_3d = self.options.tolerance_3d;
                let on_surface = checker.on_surface(
                    previous,
                    candidate.point_on_surface(),
                    candidate.uv(),
                    candidate.tangent_on_surface(),
                    candidate.tangent_2d(),
                    (
                        self.surface.u_resolution(tolerance_3d),
                        self.surface.v_resolution(tolerance_3d),
                    ),
                );
                let on_curve = checker.on_curve(
                    previous,
                    candidate.point_on_curve(),
                    candidate.parameter_on_curve(),
                    candidate.tangent_on_curve(),
                    self.curve.resolution(tolerance_3d),
                );
                (on_surface, on_curve)
            }
            _ => (BlendStatus::Ok, BlendStatus::Ok),
        };

        let on_surface = self.forward(on_surface);
        let on_curve = self.forward(on_curve);
        if on_surface == BlendStatus::StepTooLarge || on_curve == BlendStatus::StepTooLarge {
            return BlendStatus::StepTooLarge;
        }

        if !self.transition_computed {
            let (u, v) = candidate.parameters_on_surface();
            let (section_tangent, normal) = function.tangent(u, v);
            let testra = normal
                .try_normalize(T::zero())
                .map(|normal| section_tangent.dot(&normal.cross(candidate.tangent_on_surface())))
                .unwrap_or(T::zero());
            if testra.abs() > T::confusion() {
                let transition = if testra < T::zero() {
                    Transition::In
                } else {
                    Transition::Out
                };
                self.line.set_transition(transition);
                self.transition_computed = true;
            }
        }

        if on_surface == BlendStatus::Ok || on_curve == BlendStatus::Ok {
            self.previous = Some(candidate);
            return fallback;
        }

        if on_surface == BlendStatus::StepTooSmall && on_curve == BlendStatus::StepTooSmall {
            self.previous = Some(candidate);
            return match fallback {
                BlendStatus::Ok => BlendStatus::StepTooSmall,
                _ => fallback,
            };
        }

        match fallback {
            BlendStatus::Ok => BlendStatus::SamePoints,
            _ => fallback,
        }
    }

    /// Turn a backward status into a step reduction, remembering the backtrack
    fn forward(&mut self, status: BlendStatus) -> BlendStatus {
        if status == BlendStatus::Backward {
            self.backtracked = true;
            BlendStatus::StepTooLarge
        } else {
            status
        }
    }

    /// Locate the crossing of the domain boundary between the accepted parameter `inside`
    /// and the trial parameter `outside` by bisection, then reproject it on the nearest restriction.
    fn reframe<F: BlendFunction<T>>(
        &mut self,
        function: &mut F,
        inside: T,
        inside_solution: &DVector<T>,
        outside: T,
        outside_solution: DVector<T>,
    ) -> Option<Reframed<T>> {
        let tolerance_2d = self.tolerance_2d();
        let two = T::from_f64(2.).unwrap();
        let (mut lo, mut lo_solution) = (inside, inside_solution.clone());
        let (mut hi, mut hi_solution) = (outside, outside_solution);

        for _ in 0..MAX_REFRAME_ITERS {
            if self.sense * (hi - lo) <= self.options.tolerance_guide {
                break;
            }
            let mid = (lo + hi) / two;
            function.set(mid);
            let solution = self.solver.solve(
                &*function,
                &lo_solution,
                &self.tolerance,
                &self.lower,
                &self.upper,
            )?;
            let uv = Point2::new(solution[0], solution[1]);
            if self.domain.classify(&uv, tolerance_2d).is_inside() {
                lo = mid;
                lo_solution = solution;
            } else {
                hi = mid;
                hi_solution = solution;
            }
        }

        let uv = Point2::new(hi_solution[0], hi_solution[1]);
        let restrictions = self.domain.restrictions();
        let (arc_index, arc_parameter) = restrictions
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.project(&uv).map(|(t, d)| (i, t, d)))
            .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, t, _)| (i, t))?;
        let vertex = restrictions[arc_index]
            .vertices()
            .into_iter()
            .find(|(v, t)| (arc_parameter - *t).abs() <= v.tolerance())
            .map(|(v, _)| v);

        function.set(hi);
        Some(Reframed {
            parameter: hi,
            solution: hi_solution,
            arc_index,
            arc_parameter,
            vertex,
        })
    }

    /// Next trial parameter, snapped to `bound` when within the guide tolerance
    fn next_parameter(&self, from: T, step: T, bound: T) -> T {
        let param = from + self.sense * step;
        if self.sense * (param - bound) > -self.options.tolerance_guide {
            bound
        } else {
            param
        }
    }

    fn tolerance_2d(&self) -> T {
        self.tolerance[0].min(self.tolerance[1])
    }

    fn push_previous(&mut self) {
        if let Some(previous) = self.previous.clone() {
            self.trace(&previous);
            if self.sense > T::zero() {
                self.line.append(previous);
            } else {
                self.line.prepend(previous);
            }
        }
    }

    /// Check if the previous point already closes the line in the walking direction
    fn is_previous_in_line(&self) -> bool {
        let end = if self.sense > T::zero() {
            self.line.last()
        } else {
            self.line.first()
        };
        match (&self.previous, end) {
            (Some(previous), Some(end)) => previous.parameter() == end.parameter(),
            _ => false,
        }
    }

    fn trace(&mut self, point: &BlendPoint<T>) {
        if let Some(tracer) = self.tracer.as_mut() {
            tracer.section(point.parameter(), point);
        }
    }

    /// Extremities on the surface & on the curve at a sample
    fn extremities(&self, point: &BlendPoint<T>) -> (Extremity<T>, Extremity<T>) {
        let tolerance = self.options.tolerance_3d;
        let (u, v) = point.parameters_on_surface();
        let mut on_surface =
            Extremity::on_surface(*point.point_on_surface(), u, v, point.parameter(), tolerance);
        on_surface.set_tangent(*point.tangent_on_surface());
        let mut on_curve = Extremity::on_curve(
            *point.point_on_curve(),
            point.parameter_on_curve(),
            point.parameter(),
            tolerance,
        );
        on_curve.set_tangent(*point.tangent_on_curve());
        (on_surface, on_curve)
    }

    /// Extremity on the surface at a sample lying on the restriction `arc_index`
    /// (or on one of its vertices).
    fn make_extremity(
        &self,
        point: &BlendPoint<T>,
        arc_index: usize,
        arc_parameter: T,
        vertex: Option<DomainVertex<T>>,
    ) -> Extremity<T> {
        let (mut extremity, _) = self.extremities(point);
        let restrictions = self.domain.restrictions();
        let tangent = point.tangent_on_surface();
        let arc = |index: usize, parameter: T| {
            let (line_transition, arc_transition) =
                arc_transition(self.surface, &restrictions[index], parameter, tangent);
            PointOnArc::new(index, parameter, line_transition, arc_transition)
        };

        match vertex {
            None => extremity.add_arc(arc(arc_index, arc_parameter)),
            Some(vertex) => {
                extremity.set_vertex(vertex);
                for (i, restriction) in restrictions.iter().enumerate() {
                    if i == arc_index {
                        extremity.add_arc(arc(i, arc_parameter));
                    } else {
                        restriction
                            .vertices()
                            .iter()
                            .filter(|(v, _)| v.is_same(&vertex))
                            .for_each(|(_, t)| extremity.add_arc(arc(i, *t)));
                    }
                }
            }
        }
        extremity
    }

    fn set_line_end(&mut self, on_surface: Extremity<T>, on_curve: Extremity<T>) {
        if self.sense > T::zero() {
            self.line.set_end_points(on_surface, on_curve);
        } else {
            self.line.set_start_points(on_surface, on_curve);
        }
    }

    /// Close the line end in the walking direction at the previous point
    fn close(&mut self, outcome: WalkOutcome) -> WalkOutcome {
        if let Some(previous) = self.previous.clone() {
            let (on_surface, on_curve) = self.extremities(&previous);
            self.set_line_end(on_surface, on_curve);
        }
        #[cfg(feature = "log")]
        log::debug!(
            "walk ended with {:?} after {} sections",
            outcome,
            self.line.len()
        );
        outcome
    }

    fn close_on_restriction(
        &mut self,
        arc_index: usize,
        arc_parameter: T,
        vertex: Option<DomainVertex<T>>,
    ) -> WalkOutcome {
        if let Some(previous) = self.previous.clone() {
            let on_surface = self.make_extremity(&previous, arc_index, arc_parameter, vertex);
            let (_, on_curve) = self.extremities(&previous);
            self.set_line_end(on_surface, on_curve);
        }
        #[cfg(feature = "log")]
        log::debug!(
            "walk left the domain through restriction #{} at {:?}",
            arc_index,
            arc_parameter
        );
        WalkOutcome::OnRestriction
    }
}
