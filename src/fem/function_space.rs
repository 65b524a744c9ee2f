use crate::base::{Dof, Field};
use crate::StrError;
use gemlab::integ::{self, IntegPointData};
use gemlab::mesh::{CellId, Mesh, PointId};
use gemlab::shapes::{GeoClass, GeoKind, Scratchpad};
use russell_lab::Vector;
use std::ops::Range;

/// Defines the number of local equations of a Taylor-Hood element with a linear level set
///
/// The local order is `ux0, uy0, …, ux5, uy5, p0, p1, p2, l0, l1, l2`.
pub const N_LOCAL_EQ: usize = 18;

/// Defines the position of the first pressure equation in the local vectors
pub const LOCAL_P0: usize = 12;

/// Defines the position of the first level-set equation in the local vectors
pub const LOCAL_L0: usize = 15;

/// Returns the integration points on triangles for a given polynomial degree (1, 2, or 4)
///
/// Each point holds `(ξ, η, 0, w)` and the weights sum to ½ (the area of the reference triangle).
pub fn integ_points(degree: usize) -> Result<IntegPointData, StrError> {
    let n_integ_point = match degree {
        1 => 1,
        2 => 3,
        4 => 6,
        _ => return Err("the degree of the integration rule must be 1, 2, or 4"),
    };
    integ::points(GeoClass::Tri, n_integ_point)
}

/// Maps the mesh nodes to the degrees of freedom of the three fields
///
/// * velocity: quadratic (P2), two components at every point
/// * pressure: linear (P1), one value at every vertex
/// * level set: linear (P1), one value at every vertex
///
/// The global vector is blocked as `[ux0, uy0, ux1, uy1, …, p_0…p_{nv-1}, l_0…l_{nv-1}]`,
/// where the vertices are numbered by increasing point id.
pub struct FunctionSpace<'a> {
    /// Holds an access to the Mesh
    pub mesh: &'a Mesh,

    /// Number of points
    pub npoint: usize,

    /// Number of vertices (corner points)
    pub nvertex: usize,

    /// Maps a point id to a vertex index (None for midpoints)
    pub vertex_index: Vec<Option<usize>>,

    /// Maps a vertex index to the point id
    pub vertex_points: Vec<PointId>,

    /// Holds the global equation numbers of each cell (ncell × 18)
    pub local_to_global: Vec<Vec<usize>>,

    /// Total number of equations (DOFs)
    pub n_equation: usize,
}

impl<'a> FunctionSpace<'a> {
    /// Allocates a new instance
    pub fn new(mesh: &'a Mesh) -> Result<Self, StrError> {
        if mesh.ndim != 2 {
            return Err("the mesh must be two-dimensional");
        }
        let npoint = mesh.points.len();
        if npoint == 0 || mesh.cells.len() == 0 {
            return Err("the mesh must have at least one cell");
        }

        // classify points
        const UNUSED: u8 = 0;
        const VERTEX: u8 = 1;
        const MIDPOINT: u8 = 2;
        let mut kind = vec![UNUSED; npoint];
        for cell in &mesh.cells {
            if cell.kind != GeoKind::Tri6 || cell.points.len() != 6 {
                return Err("cell must be a Tri6 with 6 points");
            }
            for m in 0..6 {
                let p = cell.points[m];
                if p >= npoint {
                    return Err("cell has a point id out of bounds");
                }
                let k = if m < 3 { VERTEX } else { MIDPOINT };
                if kind[p] != UNUSED && kind[p] != k {
                    return Err("mesh is not conforming: a point is both a vertex and a midpoint");
                }
                kind[p] = k;
            }
        }
        if kind.iter().any(|k| *k == UNUSED) {
            return Err("all points must be attached to a cell");
        }

        // number the vertices by increasing point id
        let mut vertex_index = vec![None; npoint];
        let mut vertex_points = Vec::new();
        for p in 0..npoint {
            if kind[p] == VERTEX {
                vertex_index[p] = Some(vertex_points.len());
                vertex_points.push(p);
            }
        }
        let nvertex = vertex_points.len();

        // local-to-global maps
        let n_velocity = 2 * npoint;
        let local_to_global = mesh
            .cells
            .iter()
            .map(|cell| {
                let mut l2g = vec![0; N_LOCAL_EQ];
                for m in 0..6 {
                    l2g[2 * m] = 2 * cell.points[m];
                    l2g[2 * m + 1] = 2 * cell.points[m] + 1;
                }
                for m in 0..3 {
                    let v = vertex_index[cell.points[m]].unwrap(); // checked above
                    l2g[LOCAL_P0 + m] = n_velocity + v;
                    l2g[LOCAL_L0 + m] = n_velocity + nvertex + v;
                }
                l2g
            })
            .collect();

        Ok(FunctionSpace {
            mesh,
            npoint,
            nvertex,
            vertex_index,
            vertex_points,
            local_to_global,
            n_equation: n_velocity + 2 * nvertex,
        })
    }

    /// Returns the total number of DOFs
    pub fn num_dofs(&self) -> usize {
        self.n_equation
    }

    /// Returns the global equation numbers of a cell in the local order
    pub fn dofs_for_element(&self, cell_id: CellId) -> &[usize] {
        &self.local_to_global[cell_id]
    }

    /// Returns the equation number corresponding to a (PointId, DOF) pair
    pub fn eq(&self, point_id: PointId, dof: Dof) -> Result<usize, StrError> {
        if point_id >= self.npoint {
            return Err("cannot find equation number because PointId is out-of-bounds");
        }
        match dof {
            Dof::Ux => Ok(2 * point_id),
            Dof::Uy => Ok(2 * point_id + 1),
            Dof::P | Dof::Ls => match self.vertex_index[point_id] {
                Some(v) => {
                    let offset = if dof == Dof::P { 0 } else { self.nvertex };
                    Ok(2 * self.npoint + offset + v)
                }
                None => Err("cannot find equation number corresponding to (PointId,DOF)"),
            },
        }
    }

    /// Returns the range of equation numbers of a field
    pub fn range(&self, field: Field) -> Range<usize> {
        let nv = 2 * self.npoint;
        match field {
            Field::Velocity => 0..nv,
            Field::Pressure => nv..(nv + self.nvertex),
            Field::LevelSet => (nv + self.nvertex)..self.n_equation,
        }
    }

    /// Returns the ids of the points owning the nodal values of a field
    ///
    /// For the velocity, each point owns two consecutive values (x and y components).
    pub fn owner_points(&self, field: Field) -> Vec<PointId> {
        match field {
            Field::Velocity => (0..self.npoint).collect(),
            Field::Pressure | Field::LevelSet => self.vertex_points.clone(),
        }
    }

    /// Extracts the nodal values of a field from a state vector
    pub fn extract(&self, field: Field, w: &Vector) -> Vec<f64> {
        w.as_data()[self.range(field)].to_vec()
    }

    /// Allocates a scratchpad holding the coordinates of the nodes of a field on a cell
    ///
    /// The velocity uses the six nodes (Tri6); the pressure and the level set use the three vertices (Tri3).
    pub fn scratchpad(&self, cell_id: CellId, field: Field) -> Result<Scratchpad, StrError> {
        if cell_id >= self.mesh.cells.len() {
            return Err("cell id is out of bounds");
        }
        let kind = match field {
            Field::Velocity => GeoKind::Tri6,
            Field::Pressure | Field::LevelSet => GeoKind::Tri3,
        };
        let mut pad = Scratchpad::new(2, kind)?;
        let points = &self.mesh.cells[cell_id].points;
        for m in 0..kind.nnode() {
            for j in 0..2 {
                pad.set_xx(m, j, self.mesh.points[points[m]].coords[j]);
            }
        }
        if pad.calc_jacobian(&[1.0 / 3.0, 1.0 / 3.0])? <= 0.0 {
            return Err("cell has a non-positive Jacobian determinant");
        }
        Ok(pad)
    }

    /// Returns the length of the longest edge of a cell
    pub fn diameter(&self, cell_id: CellId) -> f64 {
        let points = &self.mesh.cells[cell_id].points;
        let mut diameter: f64 = 0.0;
        for e in 0..3 {
            let a = &self.mesh.points[points[e]].coords;
            let b = &self.mesh.points[points[(e + 1) % 3]].coords;
            diameter = diameter.max(f64::sqrt((b[0] - a[0]) * (b[0] - a[0]) + (b[1] - a[1]) * (b[1] - a[1])));
        }
        diameter
    }

    /// Evaluates the basis of a field at a physical point within a cell
    ///
    /// Returns the basis values and the physical gradients, ordered as the nodes of the cell.
    /// For the velocity, the same scalar basis applies to both components.
    pub fn evaluate_basis_at(
        &self,
        cell_id: CellId,
        x: &[f64],
        field: Field,
    ) -> Result<(Vec<f64>, Vec<[f64; 2]>), StrError> {
        let mut pad = self.scratchpad(cell_id, field)?;
        let mut ksi = vec![0.0; 2];
        pad.approximate_ksi(&mut ksi, &Vector::from(&[x[0], x[1]]), 10, 1e-14)?;
        pad.calc_gradient(&ksi)?;
        (pad.fn_interp)(&mut pad.interp, &ksi);
        let nnode = pad.kind.nnode();
        let nn = (0..nnode).map(|m| pad.interp[m]).collect();
        let gg = (0..nnode)
            .map(|m| [pad.gradient.get(m, 0), pad.gradient.get(m, 1)])
            .collect();
        Ok((nn, gg))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{integ_points, FunctionSpace, LOCAL_L0, LOCAL_P0};
    use crate::base::{Dof, Field, RectangleCrossed};
    use gemlab::mesh::{Cell, Mesh, Point};
    use gemlab::shapes::GeoKind;
    use russell_lab::{approx_eq, Vector};

    //  2
    //  |`.
    //  5  `4
    //  |    `.
    //  0---3--1
    fn one_tri6() -> Mesh {
        #[rustfmt::skip]
        let mesh = Mesh {
            ndim: 2,
            points: vec![
                Point { id: 0, marker: 0, coords: vec![0.0, 0.0] },
                Point { id: 1, marker: 0, coords: vec![2.0, 0.0] },
                Point { id: 2, marker: 0, coords: vec![0.0, 2.0] },
                Point { id: 3, marker: 0, coords: vec![1.0, 0.0] },
                Point { id: 4, marker: 0, coords: vec![1.0, 1.0] },
                Point { id: 5, marker: 0, coords: vec![0.0, 1.0] },
            ],
            cells: vec![
                Cell { id: 0, attribute: 1, kind: GeoKind::Tri6, points: vec![0, 1, 2, 3, 4, 5] },
            ],
        };
        mesh
    }

    #[test]
    fn new_captures_errors() {
        let mut mesh = one_tri6();
        mesh.cells[0].kind = GeoKind::Tri3;
        assert_eq!(FunctionSpace::new(&mesh).err(), Some("cell must be a Tri6 with 6 points"));
        let mut mesh = one_tri6();
        mesh.points.push(Point {
            id: 6,
            marker: 0,
            coords: vec![5.0, 5.0],
        });
        assert_eq!(
            FunctionSpace::new(&mesh).err(),
            Some("all points must be attached to a cell")
        );
        let mut mesh = one_tri6();
        mesh.ndim = 3;
        assert_eq!(FunctionSpace::new(&mesh).err(), Some("the mesh must be two-dimensional"));
    }

    #[test]
    fn numbering_works() {
        let mesh = one_tri6();
        let space = FunctionSpace::new(&mesh).unwrap();
        assert_eq!(space.num_dofs(), 12 + 3 + 3);
        assert_eq!(space.nvertex, 3);
        assert_eq!(space.range(Field::Velocity), 0..12);
        assert_eq!(space.range(Field::Pressure), 12..15);
        assert_eq!(space.range(Field::LevelSet), 15..18);
        assert_eq!(
            space.dofs_for_element(0),
            &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17]
        );
        assert_eq!(space.eq(4, Dof::Uy).unwrap(), 9);
        assert_eq!(space.eq(2, Dof::P).unwrap(), 14);
        assert_eq!(space.eq(1, Dof::Ls).unwrap(), 16);
        assert_eq!(
            space.eq(4, Dof::P).err(),
            Some("cannot find equation number corresponding to (PointId,DOF)")
        );
        assert_eq!(
            space.eq(6, Dof::Ux).err(),
            Some("cannot find equation number because PointId is out-of-bounds")
        );
        assert_eq!(space.owner_points(Field::LevelSet), &[0, 1, 2]);
    }

    #[test]
    fn numbering_works_crossed() {
        let mesh = RectangleCrossed::rayleigh_taylor(2, 3).mesh().unwrap();
        let space = FunctionSpace::new(&mesh).unwrap();
        let nvertex = 3 * 4 + 2 * 3;
        assert_eq!(space.nvertex, nvertex);
        assert_eq!(space.num_dofs(), 2 * mesh.points.len() + 2 * nvertex);
        // the grid vertices and centres come first in the crossed mesh
        assert_eq!(space.vertex_points, (0..nvertex).collect::<Vec<_>>());
        for cell in &mesh.cells {
            let l2g = space.dofs_for_element(cell.id);
            for m in 0..3 {
                assert_eq!(l2g[LOCAL_P0 + m], space.eq(cell.points[m], Dof::P).unwrap());
                assert_eq!(l2g[LOCAL_L0 + m], space.eq(cell.points[m], Dof::Ls).unwrap());
            }
        }
    }

    #[test]
    fn extract_works() {
        let mesh = one_tri6();
        let space = FunctionSpace::new(&mesh).unwrap();
        let w = Vector::from(&(0..18).map(|i| i as f64).collect::<Vec<_>>());
        assert_eq!(space.extract(Field::Pressure, &w), &[12.0, 13.0, 14.0]);
        assert_eq!(space.extract(Field::LevelSet, &w), &[15.0, 16.0, 17.0]);
        assert_eq!(space.extract(Field::Velocity, &w).len(), 12);
    }

    #[test]
    fn evaluate_basis_at_works() {
        let mesh = one_tri6();
        let space = FunctionSpace::new(&mesh).unwrap();
        let (nn, gg) = space.evaluate_basis_at(0, &[1.0, 1.0], Field::Velocity).unwrap();
        for m in 0..6 {
            let correct = if m == 4 { 1.0 } else { 0.0 };
            approx_eq(nn[m], correct, 1e-15);
        }
        // Σ xm ∇Nm = (1, 0)
        let mut sx = [0.0, 0.0];
        for m in 0..6 {
            sx[0] += mesh.points[m].coords[0] * gg[m][0];
            sx[1] += mesh.points[m].coords[0] * gg[m][1];
        }
        approx_eq(sx[0], 1.0, 1e-14);
        approx_eq(sx[1], 0.0, 1e-14);
        let (nn, gg) = space.evaluate_basis_at(0, &[0.5, 0.5], Field::LevelSet).unwrap();
        assert_eq!(nn.len(), 3);
        approx_eq(nn[0], 0.5, 1e-15);
        approx_eq(gg[1][0], 0.5, 1e-15);
        approx_eq(gg[2][1], 0.5, 1e-15);
        assert_eq!(
            space.evaluate_basis_at(1, &[0.0, 0.0], Field::Pressure).err(),
            Some("cell id is out of bounds")
        );
    }

    #[test]
    fn integ_points_work() {
        assert_eq!(
            integ_points(3).err(),
            Some("the degree of the integration rule must be 1, 2, or 4")
        );
        for (degree, npoint) in [(1, 1), (2, 3), (4, 6)] {
            let ips = integ_points(degree).unwrap();
            assert_eq!(ips.len(), npoint);
            approx_eq(ips.iter().map(|ip| ip[3]).sum::<f64>(), 0.5, 1e-14);
        }
        // degree 4: ∫ ξ² η² dA = 1/180 on the reference triangle
        let sum: f64 = integ_points(4)
            .unwrap()
            .iter()
            .map(|ip| ip[0] * ip[0] * ip[1] * ip[1] * ip[3])
            .sum();
        approx_eq(sum, 1.0 / 180.0, 1e-14);
    }

    #[test]
    fn scratchpad_works() {
        let mesh = one_tri6();
        let space = FunctionSpace::new(&mesh).unwrap();
        let mut pad = space.scratchpad(0, Field::Velocity).unwrap();
        assert_eq!(pad.kind, GeoKind::Tri6);
        approx_eq(pad.calc_jacobian(&[0.2, 0.3]).unwrap(), 4.0, 1e-14);
        let mut pad = space.scratchpad(0, Field::Pressure).unwrap();
        assert_eq!(pad.kind, GeoKind::Tri3);
        approx_eq(pad.calc_gradient(&[0.0, 0.0]).unwrap(), 4.0, 1e-14);
        approx_eq(pad.gradient.get(1, 0), 0.5, 1e-15);
        approx_eq(pad.gradient.get(2, 1), 0.5, 1e-15);
        approx_eq(space.diameter(0), 2.0 * f64::sqrt(2.0), 1e-15);
        assert_eq!(
            space.scratchpad(1, Field::Velocity).err(),
            Some("cell id is out of bounds")
        );

        // clockwise cell
        let mut mesh = one_tri6();
        mesh.cells[0].points = vec![0, 2, 1, 5, 4, 3];
        let space = FunctionSpace::new(&mesh).unwrap();
        assert_eq!(
            space.scratchpad(0, Field::LevelSet).err(),
            Some("cell has a non-positive Jacobian determinant")
        );
    }
}
