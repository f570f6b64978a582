use crate::misc::FloatingPoint;

/// How a trial sample falling out of (or on the boundary of) the surface domain is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reframing {
    /// The walk stops on a degenerate sample
    #[default]
    Disabled,
    /// The crossing is located by bisecting the guide parameter
    /// and reprojected on the nearest restriction of the domain
    Bisection,
}

/// Configuration of a walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkingOptions<T: FloatingPoint> {
    /// Maximum (and initial) step of the guide parameter
    pub max_step: T,
    /// 3D tolerance of the samples
    pub tolerance_3d: T,
    /// Tolerance on the guide parameter.
    /// The walk stops when the step falls below it.
    pub tolerance_guide: T,
    /// Maximum deflection of the chords between consecutive samples
    pub deflection: T,
    /// Solve the system at the first guide parameter before walking
    pub refine_first_point: bool,
    /// Run the deflection tests on the candidate samples
    pub check_deflection: bool,
    /// Also run the deflection tests in the parametric plane of the surface
    pub check_2d: bool,
    pub reframing: Reframing,
}

impl<T: FloatingPoint> Default for WalkingOptions<T> {
    fn default() -> Self {
        Self {
            max_step: T::from_f64(0.1).unwrap(),
            tolerance_3d: T::from_f64(1e-6).unwrap(),
            tolerance_guide: T::from_f64(1e-6).unwrap(),
            deflection: T::from_f64(1e-3).unwrap(),
            refine_first_point: true,
            check_deflection: true,
            check_2d: true,
            reframing: Reframing::default(),
        }
    }
}

impl<T: FloatingPoint> WalkingOptions<T> {
    pub fn with_max_step(mut self, max_step: T) -> Self {
        self.max_step = max_step;
        self
    }

    pub fn with_tolerance_3d(mut self, tolerance_3d: T) -> Self {
        self.tolerance_3d = tolerance_3d;
        self
    }

    pub fn with_tolerance_guide(mut self, tolerance_guide: T) -> Self {
        self.tolerance_guide = tolerance_guide;
        self
    }

    pub fn with_deflection(mut self, deflection: T) -> Self {
        self.deflection = deflection;
        self
    }

    pub fn with_refine_first_point(mut self, refine_first_point: bool) -> Self {
        self.refine_first_point = refine_first_point;
        self
    }

    pub fn with_check_deflection(mut self, check_deflection: bool) -> Self {
        self.check_deflection = check_deflection;
        self
    }

    pub fn with_check_2d(mut self, check_2d: bool) -> Self {
        self.check_2d = check_2d;
        self
    }

    pub fn with_reframing(mut self, reframing: Reframing) -> Self {
        self.reframing = reframing;
        self
    }
}
