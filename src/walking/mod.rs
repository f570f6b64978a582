pub mod arc_transition;
pub mod blend_line;
pub mod blend_point;
pub mod blend_status;
pub mod curve_surface_walker;
pub mod deflection;
pub mod extremity;
pub mod section_tracer;
pub mod walk_outcome;
pub mod walking_error;
pub mod walking_options;

pub use arc_transition::*;
pub use blend_line::*;
pub use blend_point::*;
pub use blend_status::*;
pub use curve_surface_walker::*;
pub use deflection::*;
pub use extremity::*;
pub use section_tracer::*;
pub use walk_outcome::*;
pub use walking_error::*;
pub use walking_options::*;

#[cfg(test)]
mod tests;
