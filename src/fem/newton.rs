use super::{Elements, FemState, LinearSystem, PrescribedValues};
use crate::base::Config;
use crate::StrError;
use russell_lab::{vec_norm, Norm};

/// Defines the state of the Newton-Raphson iterations
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NewtonStatus {
    /// No iteration has been performed yet
    Initialized,

    /// Iterations are running
    Iterating,

    /// The residual norm satisfied the tolerances
    Converged,

    /// The iterations failed (cap exceeded, NaN or Inf, or linear solver failure)
    Diverged,
}

/// Implements the Newton-Raphson method for the monolithic system of one time step
///
/// Each iteration:
///
/// 1. assembles `R(w)` and replaces the prescribed rows by `w_i - c_i`
/// 2. checks `‖R‖ < tol_abs` or `‖R‖ < tol_rel · ‖R₀‖` (also after the last allowed update)
/// 3. assembles `J(w)` (ones on the diagonal of prescribed equations) and solves `J · mdu = R`
/// 4. updates `w ← w - mdu`
pub struct NewtonSolver<'a> {
    /// Holds configuration parameters
    config: &'a Config,

    /// Holds the current status
    pub status: NewtonStatus,

    /// Holds the Euclidean norm of the residual at each evaluation
    pub norms: Vec<f64>,

    /// Holds the number of linear solves (updates of w) in the last call to solve
    pub n_iterations: usize,
}

impl<'a> NewtonSolver<'a> {
    /// Allocates a new instance
    pub fn new(config: &'a Config) -> Self {
        NewtonSolver {
            config,
            status: NewtonStatus::Initialized,
            norms: Vec::new(),
            n_iterations: 0,
        }
    }

    /// Runs the iterations starting from the current state
    ///
    /// On error, the status is set to [NewtonStatus::Diverged] and `state.w` holds the last iterate.
    pub fn solve(
        &mut self,
        state: &mut FemState,
        elements: &mut Elements,
        prescribed: &PrescribedValues,
        lin_sys: &mut LinearSystem,
    ) -> Result<(), StrError> {
        self.status = NewtonStatus::Iterating;
        self.norms.clear();
        self.n_iterations = 0;
        match self.run(state, elements, prescribed, lin_sys) {
            Ok(_) => {
                self.status = NewtonStatus::Converged;
                Ok(())
            }
            Err(e) => {
                self.status = NewtonStatus::Diverged;
                Err(e)
            }
        }
    }

    /// Performs the actual iterations
    fn run(
        &mut self,
        state: &mut FemState,
        elements: &mut Elements,
        prescribed: &PrescribedValues,
        lin_sys: &mut LinearSystem,
    ) -> Result<(), StrError> {
        let LinearSystem {
            rr, kk, mdu, solver, ..
        } = lin_sys;
        let config = self.config;
        let mut norm_rr0 = 0.0;
        for iteration in 0..=config.n_max_iterations {
            // residual vector
            elements.calc_residuals(state)?;
            elements.assemble_residuals(rr, &prescribed.flags);
            prescribed.set_constraint_residual(rr, &state.w);

            // check convergence
            let norm_rr = vec_norm(rr, Norm::Euc);
            self.norms.push(norm_rr);
            if iteration == 0 {
                norm_rr0 = norm_rr;
            }
            config.print_iteration(iteration, norm_rr, norm_rr0);
            if !norm_rr.is_finite() {
                return Err("found NaN or Inf in the global residual vector");
            }
            if norm_rr < config.tol_abs_residual {
                return Ok(());
            }
            if iteration > 0 && norm_rr < config.tol_rel_residual * norm_rr0 {
                return Ok(());
            }

            // the last pass only checks the residual of the last update
            if iteration == config.n_max_iterations {
                break;
            }

            // Jacobian matrix
            elements.calc_jacobians(state)?;
            elements.assemble_jacobians(kk, &prescribed.flags)?;
            for eq in &prescribed.equations {
                kk.put(*eq, *eq, 1.0)?;
            }

            // solve linear system and update
            solver.solve(mdu, kk, rr)?;
            for i in 0..state.w.dim() {
                state.w[i] -= mdu[i];
            }
            self.n_iterations += 1;
        }
        Err("Newton-Raphson did not converge")
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
