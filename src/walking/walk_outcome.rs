/// How the walk ended in one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WalkOutcome {
    /// The bound of the guide parameter has been reached
    ReachedBound,
    /// The step fell below the guide tolerance after at least one accepted step
    StoppedMidWalk,
    /// The line left the surface domain through a restriction
    OnRestriction,
    /// A degenerate sample stopped the walk
    SamePoints,
    /// The step fell below the guide tolerance before any step was accepted
    Void,
}

impl WalkOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, WalkOutcome::ReachedBound | WalkOutcome::OnRestriction)
    }
}
