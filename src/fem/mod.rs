//! Implements the finite element method

mod element_trait;
mod element_two_phase;
mod elements;
mod fem_state;
mod file_io;
mod file_io_write_vtu;
mod function_space;
mod interior_facet;
mod linear_system;
mod newton;
mod post_processing;
mod prescribed_values;
mod result_sink;
mod time_integrator;
pub use crate::fem::element_trait::*;
pub use crate::fem::element_two_phase::*;
pub use crate::fem::elements::*;
pub use crate::fem::fem_state::*;
pub use crate::fem::file_io::*;
pub use crate::fem::function_space::*;
pub use crate::fem::interior_facet::*;
pub use crate::fem::linear_system::*;
pub use crate::fem::newton::*;
pub use crate::fem::post_processing::*;
pub use crate::fem::prescribed_values::*;
pub use crate::fem::result_sink::*;
pub use crate::fem::time_integrator::*;
