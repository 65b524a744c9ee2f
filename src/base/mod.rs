//! Implements the base structures for a two-fluid simulation

mod assembly;
mod config;
mod constants;
mod enums;
mod essential;
mod facets;
mod initial;
mod parameters;
mod scenario;
mod structured;
pub use crate::base::assembly::*;
pub use crate::base::config::*;
pub use crate::base::constants::*;
pub use crate::base::enums::*;
pub use crate::base::essential::*;
pub use crate::base::facets::*;
pub use crate::base::initial::*;
pub use crate::base::parameters::*;
pub use crate::base::scenario::*;
pub use crate::base::structured::*;
