use super::{ElementTrait, FemState, FunctionSpace};
use crate::base::{Config, Dof, Field, InteriorFacet};
use crate::StrError;
use russell_lab::{Matrix, Vector};

/// Defines the number of local equations of an interior facet (level set at two times three vertices)
pub const N_FACET_EQ: usize = 6;

/// Implements the interior-penalty stabilization of the level set on an interior facet
///
/// ```text
/// r = α h² |f| [∇l]·[∇φ]
/// ```
///
/// where `[q] = q⁺ - q⁻` is the jump across the facet, `h` is the mean diameter of the two
/// cells, and `|f|` is the length of the facet. The gradients of the linear level set are
/// constant within each cell; thus, the integrand is constant along the facet and the local
/// Jacobian matrix is computed once.
pub struct InteriorFacetElement {
    /// Local-to-global mapping (the three vertices of the plus cell followed by those of the minus cell)
    local_to_global: Vec<usize>,

    /// Constant local Jacobian matrix
    kk: Matrix,
}

impl InteriorFacetElement {
    /// Allocates a new instance
    pub fn new(space: &FunctionSpace, config: &Config, facet: &InteriorFacet) -> Result<Self, StrError> {
        // jump of the basis gradients: E = ∇M⁺ (first three) and E = -∇M⁻ (last three)
        let mut ee = [[0.0; 2]; N_FACET_EQ];
        for (k, cell_id) in [facet.plus, facet.minus].iter().enumerate() {
            let mut pad = space.scratchpad(*cell_id, Field::LevelSet)?;
            pad.calc_gradient(&[1.0 / 3.0, 1.0 / 3.0])?;
            let sign = if k == 0 { 1.0 } else { -1.0 };
            for c in 0..3 {
                ee[3 * k + c] = [sign * pad.gradient.get(c, 0), sign * pad.gradient.get(c, 1)];
            }
        }

        // coefficient
        let xa = &space.mesh.points[facet.points[0]].coords;
        let xb = &space.mesh.points[facet.points[1]].coords;
        let length = f64::sqrt((xb[0] - xa[0]) * (xb[0] - xa[0]) + (xb[1] - xa[1]) * (xb[1] - xa[1]));
        let h = 0.5 * (space.diameter(facet.plus) + space.diameter(facet.minus));
        let coef = config.alpha * h * h * length;

        // local-to-global mapping
        let mut local_to_global = vec![0; N_FACET_EQ];
        for (k, cell_id) in [facet.plus, facet.minus].iter().enumerate() {
            let points = &space.mesh.cells[*cell_id].points;
            for c in 0..3 {
                local_to_global[3 * k + c] = space.eq(points[c], Dof::Ls)?;
            }
        }

        // Jacobian matrix
        let mut kk = Matrix::new(N_FACET_EQ, N_FACET_EQ);
        for k in 0..N_FACET_EQ {
            for m in 0..N_FACET_EQ {
                kk.set(k, m, coef * (ee[k][0] * ee[m][0] + ee[k][1] * ee[m][1]));
            }
        }
        Ok(InteriorFacetElement { local_to_global, kk })
    }
}

impl ElementTrait for InteriorFacetElement {
    /// Returns the local-to-global mapping
    fn local_to_global(&self) -> &Vec<usize> {
        &self.local_to_global
    }

    /// Calculates the residual vector
    fn calc_residual(&mut self, residual: &mut Vector, state: &FemState) -> Result<(), StrError> {
        for k in 0..N_FACET_EQ {
            let mut sum = 0.0;
            for m in 0..N_FACET_EQ {
                sum += self.kk.get(k, m) * state.w[self.local_to_global[m]];
            }
            if !sum.is_finite() {
                return Err("found NaN or Inf in the local residual vector");
            }
            residual[k] = sum;
        }
        Ok(())
    }

    /// Calculates the Jacobian matrix
    fn calc_jacobian(&mut self, jacobian: &mut Matrix, _state: &FemState) -> Result<(), StrError> {
        for k in 0..N_FACET_EQ {
            for m in 0..N_FACET_EQ {
                jacobian.set(k, m, self.kk.get(k, m));
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
