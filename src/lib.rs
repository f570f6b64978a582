#![allow(clippy::needless_range_loop)]

mod curve;
mod domain;
mod function;
mod misc;
mod solver;
mod surface;
mod walking;

pub mod prelude {
    pub use crate::curve::*;
    pub use crate::domain::*;
    pub use crate::function::*;
    pub use crate::misc::*;
    pub use crate::solver::*;
    pub use crate::surface::*;
    pub use crate::walking::*;
}
