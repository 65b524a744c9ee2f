use serde::{Deserialize, Serialize};
use std::fmt;

/// Defines degrees-of-freedom (DOF) types
///
/// Note: The fixed numbering scheme assists in sorting the DOFs.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Dof {
    /// Velocity along the first dimension
    Ux = 0,

    /// Velocity along the second dimension
    Uy = 1,

    /// Pressure (shared by both fluids)
    P = 2,

    /// Level-set value
    Ls = 3,
}

/// Defines the fields stored in the state vector
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Field {
    /// Velocity vector field (quadratic interpolation)
    Velocity,

    /// Pressure scalar field (linear interpolation)
    Pressure,

    /// Level-set scalar field (linear interpolation)
    LevelSet,
}

impl Field {
    /// Returns all fields in the order they appear in the state vector
    pub fn all() -> [Field; 3] {
        [Field::Velocity, Field::Pressure, Field::LevelSet]
    }

    /// Returns the name used in file names and headers
    pub fn name(&self) -> &'static str {
        match self {
            Field::Velocity => "velocity",
            Field::Pressure => "pressure",
            Field::LevelSet => "level_set",
        }
    }

    /// Returns the number of components at each node
    pub fn n_components(&self) -> usize {
        match self {
            Field::Velocity => 2,
            Field::Pressure => 1,
            Field::LevelSet => 1,
        }
    }

    /// Returns the field owning a DOF
    pub fn from_dof(dof: Dof) -> Self {
        match dof {
            Dof::Ux | Dof::Uy => Field::Velocity,
            Dof::P => Field::Pressure,
            Dof::Ls => Field::LevelSet,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Defines the approximation of the sign function used to blend the material properties
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum SignModel {
    /// Gradient-aware regularization `l / sqrt(l² + ε² |∇l|²)`
    Smooth,

    /// Affine proxy `s = l`
    ///
    /// This is a faster but less faithful approximation valid for a level set normalized to
    /// `[-1, 1]`; the blended properties are not bounded by the pure-fluid values.
    Affine,
}

/// Defines the linear solver used within each Newton iteration
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum LinSolKind {
    /// Sparse direct solver (UMFPACK)
    Umfpack,

    /// Dense LU factorization (small problems only)
    Dense,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
