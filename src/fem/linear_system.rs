use super::{Elements, PrescribedValues};
use crate::base::{Config, LinSolKind};
use crate::StrError;
use russell_lab::{solve_lin_sys, Vector};
use russell_sparse::{CooMatrix, Genie, LinSolParams, LinSolver, Sym};

/// Defines the linear-solve collaborator of the Newton solver
///
/// Solves `K x = rhs` with K given in COO format.
pub trait LinearSolver {
    /// Solves the linear system
    fn solve(&mut self, x: &mut Vector, kk: &mut CooMatrix, rhs: &Vector) -> Result<(), StrError>;
}

/// Implements a sparse direct solver (UMFPACK)
pub struct SparseSolver<'a> {
    /// Holds the actual solver
    solver: LinSolver<'a>,

    /// Holds the parameters of the factorization
    params: LinSolParams,
}

/// Implements a dense LU solver (small problems only)
pub struct DenseSolver {}

/// Holds variables to solve the global linear system
pub struct LinearSystem<'a> {
    /// Total number of global equations (total number of DOFs)
    pub n_equation: usize,

    /// Holds the supremum of the number of nonzero values (nnz) in the global matrix
    ///
    /// **Notes:**
    ///
    /// 1. The local element and facet matrices add only to parts of the global matrix
    /// 2. The supremum is the sum of the number of entries of all local matrices plus the
    ///    number of prescribed equations since we will put ones on the diagonal of the global matrix; thus
    ///    `nnz ≤ n_prescribed + Σ (n_local × n_local)`
    pub nnz_sup: usize,

    /// Holds the residual vector R
    pub rr: Vector,

    /// Holds the global Jacobian matrix K
    pub kk: CooMatrix,

    /// Holds the "minus-delta-w" vector (the solution of the linear system)
    pub mdu: Vector,

    /// Holds the linear solver
    pub solver: Box<dyn LinearSolver + 'a>,
}

impl<'a> SparseSolver<'a> {
    /// Allocates a new instance
    pub fn new() -> Result<Self, StrError> {
        Ok(SparseSolver {
            solver: LinSolver::new(Genie::Umfpack)?,
            params: LinSolParams::new(),
        })
    }
}

impl<'a> LinearSolver for SparseSolver<'a> {
    fn solve(&mut self, x: &mut Vector, kk: &mut CooMatrix, rhs: &Vector) -> Result<(), StrError> {
        self.solver.actual.factorize(kk, Some(self.params))?;
        self.solver.actual.solve(x, rhs, false)
    }
}

impl DenseSolver {
    /// Allocates a new instance
    pub fn new() -> Self {
        DenseSolver {}
    }
}

impl LinearSolver for DenseSolver {
    fn solve(&mut self, x: &mut Vector, kk: &mut CooMatrix, rhs: &Vector) -> Result<(), StrError> {
        let mut a = kk.as_dense();
        let mut b = rhs.clone();
        solve_lin_sys(&mut b, &mut a)?;
        for i in 0..b.dim() {
            x[i] = b[i];
        }
        Ok(())
    }
}

impl<'a> LinearSystem<'a> {
    /// Allocates a new instance
    pub fn new(config: &Config, elements: &Elements, prescribed: &PrescribedValues) -> Result<Self, StrError> {
        let solver: Box<dyn LinearSolver + 'a> = match config.lin_sol {
            LinSolKind::Umfpack => Box::new(SparseSolver::new()?),
            LinSolKind::Dense => Box::new(DenseSolver::new()),
        };
        LinearSystem::new_with_solver(elements, prescribed, solver)
    }

    /// Allocates a new instance with a custom linear solver
    pub fn new_with_solver(
        elements: &Elements,
        prescribed: &PrescribedValues,
        solver: Box<dyn LinearSolver + 'a>,
    ) -> Result<Self, StrError> {
        let n_equation = prescribed.flags.len();
        let nnz_sup = prescribed.equations.len() + elements.nnz_sup();
        Ok(LinearSystem {
            n_equation,
            nnz_sup,
            rr: Vector::new(n_equation),
            kk: CooMatrix::new(n_equation, n_equation, nnz_sup, Sym::No)?,
            mdu: Vector::new(n_equation),
            solver,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
