use super::FunctionSpace;
use crate::base::{Dof, Essential, Facets};
use crate::StrError;
use gemlab::mesh::PointId;
use gemlab::util::any_x;
use russell_lab::Vector;
use std::collections::HashMap;

/// Holds a single prescribed value
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrescribedValue {
    /// Point corresponding to the prescribed value
    pub point: PointId,

    /// The prescribed DOF
    pub dof: Dof,

    /// Equation corresponding to the prescribed value
    pub eq: usize,

    /// The prescribed value
    pub value: f64,
}

/// Resolves essential boundary conditions to equation numbers and values
///
/// The points are searched among the boundary points of the mesh.
/// Pressure and level-set conditions apply to vertices only because these fields are linear.
/// When two conditions select the same equation, the last one wins.
pub struct PrescribedValues {
    /// All values sorted by equation number
    pub all: Vec<PrescribedValue>,

    /// An array indicating which DOFs (equations) are prescribed
    ///
    /// The length of `flags` is equal to `n_equation`, the total number of DOFs (total number of equations).
    pub flags: Vec<bool>,

    /// Array with only the DOFs numbers of the prescribed equations
    ///
    /// Compared to the array `flags`, this is a "smaller" array with only the prescribed DOFs numbers.
    pub equations: Vec<usize>,
}

impl PrescribedValues {
    /// Allocates a new instance
    pub fn new(space: &FunctionSpace, facets: &Facets, essential: &Essential) -> Result<Self, StrError> {
        if facets.mesh.points.len() != space.npoint {
            return Err("facets and function space must correspond to the same mesh");
        }
        let mut selected: HashMap<usize, PrescribedValue> = HashMap::new();
        for ebc in &essential.all {
            let point_ids = match ebc.selector.at() {
                Some(at) => facets.features.search_point_ids(at, any_x)?,
                None => facets.boundary_points(),
            };
            let linear_field = ebc.dof == Dof::P || ebc.dof == Dof::Ls;
            let mut count = 0;
            for point_id in point_ids {
                if linear_field && space.vertex_index[point_id].is_none() {
                    continue;
                }
                let eq = space.eq(point_id, ebc.dof)?;
                selected.insert(
                    eq,
                    PrescribedValue {
                        point: point_id,
                        dof: ebc.dof,
                        eq,
                        value: ebc.value,
                    },
                );
                count += 1;
            }
            if count == 0 {
                return Err("essential boundary condition does not select any point");
            }
        }
        let mut all: Vec<_> = selected.into_values().collect();
        all.sort_by_key(|p| p.eq);
        let mut flags = vec![false; space.n_equation];
        let equations: Vec<_> = all.iter().map(|p| p.eq).collect();
        for eq in &equations {
            flags[*eq] = true;
        }
        Ok(PrescribedValues { all, flags, equations })
    }

    /// Sets all prescribed values in the solution vector
    pub fn apply(&self, w: &mut Vector) {
        self.all.iter().for_each(|p| w[p.eq] = p.value);
    }

    /// Sets the residual of the prescribed equations to the constraint violation `w_i - c_i`
    pub fn set_constraint_residual(&self, rr: &mut Vector, w: &Vector) {
        self.all.iter().for_each(|p| rr[p.eq] = w[p.eq] - p.value);
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
