//! Two-fluid incompressible flow with a level-set interface
//!
//! The crate solves the coupled Navier-Stokes and level-set transport equations on a fixed
//! triangular mesh using Taylor-Hood elements (quadratic velocity, linear pressure) and a
//! linear level set. Each time step (implicit Euler) is a monolithic nonlinear problem solved
//! by the Newton-Raphson method with an analytic Jacobian.
//!
//! Modules:
//!
//! * [base] -- configuration, boundary conditions, meshes, facet topology, and assembly helpers
//! * [material] -- blending of density and viscosity through the regularized sign function
//! * [fem] -- function space, elements, Newton solver, time integrator, output, and post-processing

/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

pub mod base;
pub mod fem;
pub mod material;
pub mod prelude;
