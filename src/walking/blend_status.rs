/// Classification of one candidate step of the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendStatus {
    /// The step is accepted as is
    Ok,
    /// The step is accepted and can be enlarged
    StepTooSmall,
    /// The step must be shrunk
    StepTooLarge,
    /// The candidate goes back relative to the walking direction
    Backward,
    /// The candidate is confused with the previous point
    SamePoints,
    /// The candidate has been reprojected on a restriction of the surface domain
    OnRestriction,
}

impl BlendStatus {
    /// Check if the candidate point has been accepted
    pub fn is_accepted(&self) -> bool {
        matches!(self, BlendStatus::Ok | BlendStatus::StepTooSmall)
    }
}
