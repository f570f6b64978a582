/// Position of a parametric point relative to a bounded domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TopologyState {
    In,
    Out,
    On,
}

impl TopologyState {
    pub fn is_inside(&self) -> bool {
        matches!(self, TopologyState::In)
    }
}
