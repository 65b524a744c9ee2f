use super::{ElementTrait, ElementTwoPhase, FemState, FunctionSpace, InteriorFacetElement};
use crate::base::{assemble_matrix, assemble_vector, Config, Facets};
use crate::StrError;
use rayon::prelude::*;
use russell_lab::{deriv1_central5, Matrix, Vector};
use russell_sparse::CooMatrix;

/// Defines a generic local contribution (element or facet), wrapping an "actual" implementation
pub struct GenericElement<'a> {
    /// Connects to the "actual" implementation of local equations
    pub actual: Box<dyn ElementTrait + 'a>,

    /// Implements the residual vector
    pub residual: Vector,

    /// Implements the Jacobian matrix
    pub jacobian: Matrix,
}

/// Holds all local contributions to the global residual vector and Jacobian matrix
///
/// The local quantities are computed independently (optionally in parallel) and then
/// scattered sequentially into the global arrays.
pub struct Elements<'a> {
    /// Holds configuration parameters
    pub config: &'a Config,

    /// All cells (Taylor-Hood elements with level set)
    pub cells: Vec<GenericElement<'a>>,

    /// All interior facets (level-set stabilization)
    pub facets: Vec<GenericElement<'a>>,
}

/// Holds auxiliary arguments for the computation of numerical Jacobian matrices
struct ArgsForNumericalJacobian<'a> {
    /// Holds the residual vector
    pub residual: &'a mut Vector,

    /// Holds the current state
    pub state: &'a mut FemState,
}

impl<'a> GenericElement<'a> {
    /// Allocates new instance
    pub fn new(actual: Box<dyn ElementTrait + 'a>) -> Self {
        let neq = actual.local_to_global().len();
        GenericElement {
            actual,
            residual: Vector::new(neq),
            jacobian: Matrix::new(neq, neq),
        }
    }

    /// Calculates the residual vector
    pub fn calc_residual(&mut self, state: &FemState) -> Result<(), StrError> {
        self.actual.calc_residual(&mut self.residual, state)
    }

    /// Calculates the Jacobian matrix
    pub fn calc_jacobian(&mut self, state: &FemState) -> Result<(), StrError> {
        self.actual.calc_jacobian(&mut self.jacobian, state)
    }

    /// Calculates the Jacobian matrix using finite differences
    ///
    /// The local equations must be distinct (not the case for facets sharing vertices).
    ///
    /// **Note:** The state may be changed temporarily, but it is restored at the end of the function
    pub fn numerical_jacobian(&mut self, state: &mut FemState) -> Result<(), StrError> {
        let neq = self.residual.dim();
        let l2g = self.actual.local_to_global().clone();
        let mut args = ArgsForNumericalJacobian {
            residual: &mut self.residual,
            state,
        };
        for i in 0..neq {
            for j in 0..neq {
                let at_w = args.state.w[l2g[j]];
                let res = deriv1_central5(at_w, &mut args, |w, a| {
                    let original = a.state.w[l2g[j]];
                    a.state.w[l2g[j]] = w;
                    let status = self.actual.calc_residual(&mut a.residual, &a.state);
                    a.state.w[l2g[j]] = original;
                    status?;
                    Ok(a.residual[i])
                })?;
                self.jacobian.set(i, j, res);
            }
        }
        Ok(())
    }
}

impl<'a> Elements<'a> {
    /// Allocates new instance
    pub fn new(space: &FunctionSpace, config: &'a Config, facets: &Facets) -> Result<Self, StrError> {
        let cells = space
            .mesh
            .cells
            .iter()
            .map(|cell| {
                let actual = ElementTwoPhase::new(space, config, cell.id)?;
                Ok(GenericElement::new(Box::new(actual)))
            })
            .collect::<Result<Vec<_>, StrError>>()?;
        let facets = facets
            .interior
            .iter()
            .map(|facet| {
                let actual = InteriorFacetElement::new(space, config, facet)?;
                Ok(GenericElement::new(Box::new(actual)))
            })
            .collect::<Result<Vec<_>, StrError>>()?;
        Ok(Elements { config, cells, facets })
    }

    /// Returns the supremum of the number of nonzero values in the global Jacobian matrix
    ///
    /// The local matrices overlap; thus, the actual nnz is smaller than this sum.
    pub fn nnz_sup(&self) -> usize {
        self.cells.iter().chain(self.facets.iter()).fold(0, |acc, e| {
            let n = e.actual.local_to_global().len();
            acc + n * n
        })
    }

    /// Computes the residual vectors
    pub fn calc_residuals(&mut self, state: &FemState) -> Result<(), StrError> {
        if self.config.parallel {
            self.cells.par_iter_mut().map(|e| e.calc_residual(&state)).collect::<Result<(), _>>()?;
            self.facets.par_iter_mut().map(|e| e.calc_residual(&state)).collect()
        } else {
            self.cells.iter_mut().map(|e| e.calc_residual(&state)).collect::<Result<(), _>>()?;
            self.facets.iter_mut().map(|e| e.calc_residual(&state)).collect()
        }
    }

    /// Computes the Jacobian matrices
    pub fn calc_jacobians(&mut self, state: &FemState) -> Result<(), StrError> {
        if self.config.parallel {
            self.cells.par_iter_mut().map(|e| e.calc_jacobian(&state)).collect::<Result<(), _>>()?;
            self.facets.par_iter_mut().map(|e| e.calc_jacobian(&state)).collect()
        } else {
            self.cells.iter_mut().map(|e| e.calc_jacobian(&state)).collect::<Result<(), _>>()?;
            self.facets.iter_mut().map(|e| e.calc_jacobian(&state)).collect()
        }
    }

    /// Assembles residual vectors
    ///
    /// **Notes:**
    ///
    /// 1. You must call calc residuals first
    /// 2. The global vector R will be cleared (with zeros) at the beginning
    pub fn assemble_residuals(&self, rr: &mut Vector, prescribed: &[bool]) {
        rr.fill(0.0); // << important
        self.cells
            .iter()
            .chain(self.facets.iter())
            .for_each(|e| assemble_vector(rr, &e.residual, e.actual.local_to_global(), prescribed));
    }

    /// Assembles jacobian matrices
    ///
    /// **Notes:**
    ///
    /// 1. You must call calc jacobians first
    /// 2. The CooMatrix position in the global matrix K will be reset at the beginning
    pub fn assemble_jacobians(&self, kk: &mut CooMatrix, prescribed: &[bool]) -> Result<(), StrError> {
        kk.reset(); // << important
        for e in self.cells.iter().chain(self.facets.iter()) {
            assemble_matrix(kk, &e.jacobian, e.actual.local_to_global(), prescribed)?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Elements;
    use crate::base::{Config, Facets, InitialLevelSet, RectangleCrossed};
    use crate::fem::{FemState, FunctionSpace};
    use russell_lab::{mat_approx_eq, Vector};
    use russell_sparse::{CooMatrix, Sym};

    fn disk_state(space: &FunctionSpace, config: &Config) -> FemState {
        let initial = InitialLevelSet::rayleigh_taylor_disk(0.05);
        let mut state = FemState::new(space, config, &initial).unwrap();
        for i in 0..space.npoint {
            let x = &space.mesh.points[i].coords;
            state.w[2 * i] = 0.1 * f64::sin(4.0 * x[1]);
            state.w[2 * i + 1] = -0.2 * x[0] * x[1];
        }
        state
    }

    #[test]
    fn new_captures_errors() {
        let mesh = RectangleCrossed::rayleigh_taylor(1, 1).mesh().unwrap();
        let space = FunctionSpace::new(&mesh).unwrap();
        let facets = Facets::new(&mesh).unwrap();
        let mut config = Config::new();
        config.integ_degree = 3; // wrong
        assert_eq!(
            Elements::new(&space, &config, &facets).err(),
            Some("the degree of the integration rule must be 1, 2, or 4")
        );
    }

    #[test]
    fn new_works() {
        let (nx, ny) = (2, 3);
        let mesh = RectangleCrossed::rayleigh_taylor(nx, ny).mesh().unwrap();
        let space = FunctionSpace::new(&mesh).unwrap();
        let facets = Facets::new(&mesh).unwrap();
        let config = Config::new();
        let elements = Elements::new(&space, &config, &facets).unwrap();
        assert_eq!(elements.cells.len(), 4 * nx * ny);
        assert_eq!(elements.facets.len(), facets.interior.len());
        assert_eq!(
            elements.nnz_sup(),
            elements.cells.len() * 18 * 18 + elements.facets.len() * 6 * 6
        );
    }

    #[test]
    fn parallel_and_sequential_computations_match() {
        let mesh = RectangleCrossed::rayleigh_taylor(2, 4).mesh().unwrap();
        let space = FunctionSpace::new(&mesh).unwrap();
        let facets = Facets::new(&mesh).unwrap();
        let neq = space.num_dofs();
        let prescribed = vec![false; neq];

        let mut results = Vec::new();
        for parallel in [true, false] {
            let mut config = Config::new();
            config.set_parallel(parallel);
            let state = disk_state(&space, &config);
            let mut elements = Elements::new(&space, &config, &facets).unwrap();
            let mut rr = Vector::new(neq);
            let mut kk = CooMatrix::new(neq, neq, elements.nnz_sup(), Sym::No).unwrap();
            elements.calc_residuals(&state).unwrap();
            elements.calc_jacobians(&state).unwrap();
            elements.assemble_residuals(&mut rr, &prescribed);
            elements.assemble_jacobians(&mut kk, &prescribed).unwrap();
            results.push((rr, kk.as_dense()));
        }
        assert_eq!(results[0].0.as_data(), results[1].0.as_data());
        mat_approx_eq(&results[0].1, &results[1].1, 1e-15);
    }

    #[test]
    fn numerical_jacobian_works() {
        let mesh = RectangleCrossed::rayleigh_taylor(1, 2).mesh().unwrap();
        let space = FunctionSpace::new(&mesh).unwrap();
        let facets = Facets::new(&mesh).unwrap();
        let mut config = Config::new();
        config.set_dt(0.1).set_eps(0.05);
        let mut state = disk_state(&space, &config);
        let mut elements = Elements::new(&space, &config, &facets).unwrap();
        for e in [0, 3, 5] {
            let element = &mut elements.cells[e];
            element.calc_jacobian(&state).unwrap();
            let jj_ana = element.jacobian.clone();
            element.numerical_jacobian(&mut state).unwrap();
            mat_approx_eq(&jj_ana, &element.jacobian, 1e-6);
        }
    }
}
