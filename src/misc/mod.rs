pub mod floating_point;
pub mod topology_state;
pub mod transition;

pub use floating_point::*;
pub use topology_state::*;
pub use transition::*;
