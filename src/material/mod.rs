//! Implements material models

mod two_fluid;
pub use crate::material::two_fluid::*;
