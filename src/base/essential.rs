use super::Dof;
use gemlab::mesh::At;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selects the boundary points of an essential boundary condition
///
/// The coordinates are matched against the points on the boundary edges only.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub enum Selector {
    /// Boundary points with the given x coordinate
    X(f64),

    /// Boundary points with the given y coordinate
    Y(f64),

    /// The boundary point with the given (x, y) coordinates
    XY(f64, f64),

    /// All points on boundary edges
    Boundary,
}

impl Selector {
    /// Returns the constraint used to search the points by coordinates (None for the whole boundary)
    pub fn at(&self) -> Option<At> {
        match *self {
            Selector::X(x) => Some(At::X(x)),
            Selector::Y(y) => Some(At::Y(y)),
            Selector::XY(x, y) => Some(At::XY(x, y)),
            Selector::Boundary => None,
        }
    }
}

/// Holds an essential boundary condition
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Ebc {
    /// The prescribed DOF
    pub dof: Dof,

    /// Selects the points
    pub selector: Selector,

    /// The prescribed value
    pub value: f64,
}

/// Holds essential boundary conditions
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Essential {
    /// All conditions in the order they were given (later conditions override earlier ones)
    pub all: Vec<Ebc>,
}

impl Essential {
    /// Allocates a new instance
    pub fn new() -> Self {
        Essential { all: Vec::new() }
    }

    /// Sets an essential boundary condition on the selected boundary points
    pub fn on(&mut self, dof: Dof, selector: Selector, value: f64) -> &mut Self {
        self.all.push(Ebc { dof, selector, value });
        self
    }

    /// Sets zero velocity on all boundary points (no-slip walls)
    pub fn no_slip(&mut self) -> &mut Self {
        self.on(Dof::Ux, Selector::Boundary, 0.0)
            .on(Dof::Uy, Selector::Boundary, 0.0)
    }
}

impl fmt::Display for Essential {
    /// Prints a formatted summary of Boundary Conditions
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Essential boundary conditions\n").unwrap();
        write!(f, "=============================\n").unwrap();
        for ebc in &self.all {
            write!(f, "{:?} @ {:?} = {:?}\n", ebc.dof, ebc.selector, ebc.value).unwrap();
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
