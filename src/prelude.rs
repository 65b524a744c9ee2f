//! Makes available common structures needed to run a simulation
//!
//! You may write `use tpflow::prelude::*` in your code and obtain
//! access to commonly used functionality.

pub use crate::base::{Config, Dof, Ebc, Essential, Facets, Field, InitialLevelSet, LinSolKind, Selector};
pub use crate::base::{ParamFluids, RectangleCrossed, Scenario, SignModel, DEFAULT_OUT_DIR, DEFAULT_TEST_DIR};
pub use crate::fem::{FemState, FileIo, FunctionSpace, MemorySink, PostProc, ResultSink, RunSummary};
pub use crate::fem::{TimeIntegrator, TimeSeries};
