use thiserror::Error;

/// Failures of a walk that leave no usable line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalkingError {
    #[error("No walk has been performed yet")]
    NotDone,
    #[error("Expected {expected} components but got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Refinement of the first section did not converge")]
    FirstSectionNotConverged,
    #[error("First section is not inside the surface domain")]
    FirstSectionOutsideDomain,
    #[error("First section is not a valid solution")]
    DegenerateFirstSection,
}
