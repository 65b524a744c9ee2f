use crate::StrError;
use gemlab::mesh::{Cell, Mesh, Point, PointId};
use gemlab::shapes::GeoKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Defines a rectangular domain discretized by a "crossed" triangulation
///
/// Each rectangle of the structured grid is split by its two diagonals into four triangles
/// sharing a centre point:
///
/// ```text
/// d-----------c
/// |`.       .'|
/// |  `.   .'  |
/// |    `m'    |
/// |  .'   `.  |
/// |.'       `.|
/// a-----------b
/// ```
///
/// The resulting cells are quadratic triangles (Tri6) with straight edges.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct RectangleCrossed {
    /// Minimum x coordinate
    pub xmin: f64,

    /// Maximum x coordinate
    pub xmax: f64,

    /// Minimum y coordinate
    pub ymin: f64,

    /// Maximum y coordinate
    pub ymax: f64,

    /// Number of divisions along x
    pub nx: usize,

    /// Number of divisions along y
    pub ny: usize,
}

/// Assists in creating Tri6 cells by sharing the midpoint of each edge
struct MidpointMaker {
    /// Maps the (sorted) pair of vertices to the midpoint
    memo: HashMap<(PointId, PointId), PointId>,
}

impl MidpointMaker {
    fn new() -> Self {
        MidpointMaker { memo: HashMap::new() }
    }

    /// Returns the midpoint of an edge, creating a new point if needed
    fn get(&mut self, points: &mut Vec<Point>, a: PointId, b: PointId) -> PointId {
        let key = if a < b { (a, b) } else { (b, a) };
        if let Some(id) = self.memo.get(&key) {
            return *id;
        }
        let id = points.len();
        let x = 0.5 * (points[a].coords[0] + points[b].coords[0]);
        let y = 0.5 * (points[a].coords[1] + points[b].coords[1]);
        points.push(Point {
            id,
            marker: 0,
            coords: vec![x, y],
        });
        self.memo.insert(key, id);
        id
    }

    /// Appends a Tri6 cell given the three (counterclockwise) vertices
    fn push_cell(&mut self, points: &mut Vec<Point>, cells: &mut Vec<Cell>, v: [PointId; 3]) {
        let m01 = self.get(points, v[0], v[1]);
        let m12 = self.get(points, v[1], v[2]);
        let m20 = self.get(points, v[2], v[0]);
        cells.push(Cell {
            id: cells.len(),
            attribute: 1,
            kind: GeoKind::Tri6,
            points: vec![v[0], v[1], v[2], m01, m12, m20],
        });
    }
}

impl RectangleCrossed {
    /// Returns the domain and resolution of the Rayleigh-Taylor benchmark
    pub fn rayleigh_taylor(nx: usize, ny: usize) -> Self {
        RectangleCrossed {
            xmin: 0.0,
            xmax: 0.25,
            ymin: -0.5,
            ymax: 0.5,
            nx,
            ny,
        }
    }

    /// Generates the mesh
    ///
    /// The grid vertices come first (row by row), followed by the centre points and then the
    /// edge midpoints. All cells are counterclockwise.
    pub fn mesh(&self) -> Result<Mesh, StrError> {
        if self.nx < 1 || self.ny < 1 {
            return Err("the number of divisions must be at least 1 along each direction");
        }
        if self.xmax <= self.xmin || self.ymax <= self.ymin {
            return Err("the rectangle must have positive width and height");
        }
        let (nx, ny) = (self.nx, self.ny);
        let dx = (self.xmax - self.xmin) / (nx as f64);
        let dy = (self.ymax - self.ymin) / (ny as f64);

        // grid vertices
        let mut points = Vec::with_capacity((nx + 1) * (ny + 1) + nx * ny);
        for j in 0..(ny + 1) {
            for i in 0..(nx + 1) {
                let id = points.len();
                let x = self.xmin + (i as f64) * dx;
                let y = self.ymin + (j as f64) * dy;
                points.push(Point {
                    id,
                    marker: 0,
                    coords: vec![x, y],
                });
            }
        }

        // centre points
        let n_grid = points.len();
        for j in 0..ny {
            for i in 0..nx {
                let id = points.len();
                let x = self.xmin + (i as f64 + 0.5) * dx;
                let y = self.ymin + (j as f64 + 0.5) * dy;
                points.push(Point {
                    id,
                    marker: 0,
                    coords: vec![x, y],
                });
            }
        }

        // cells
        let mut cells = Vec::with_capacity(4 * nx * ny);
        let mut maker = MidpointMaker::new();
        let vid = |i: usize, j: usize| j * (nx + 1) + i;
        for j in 0..ny {
            for i in 0..nx {
                let a = vid(i, j);
                let b = vid(i + 1, j);
                let c = vid(i + 1, j + 1);
                let d = vid(i, j + 1);
                let m = n_grid + j * nx + i;
                maker.push_cell(&mut points, &mut cells, [a, b, m]);
                maker.push_cell(&mut points, &mut cells, [b, c, m]);
                maker.push_cell(&mut points, &mut cells, [c, d, m]);
                maker.push_cell(&mut points, &mut cells, [d, a, m]);
            }
        }
        Ok(Mesh { ndim: 2, points, cells })
    }
}

/// Converts a mesh with linear triangles (Tri3) into a mesh with quadratic triangles (Tri6)
///
/// The new midpoints are appended after the existing points.
pub fn upgrade_to_tri6(mesh: &Mesh) -> Result<Mesh, StrError> {
    if mesh.ndim != 2 {
        return Err("the mesh must be two-dimensional");
    }
    let mut points = mesh.points.clone();
    let mut cells = Vec::with_capacity(mesh.cells.len());
    let mut maker = MidpointMaker::new();
    for cell in &mesh.cells {
        if cell.kind != GeoKind::Tri3 || cell.points.len() != 3 {
            return Err("cell must be a Tri3 with 3 points");
        }
        maker.push_cell(&mut points, &mut cells, [cell.points[0], cell.points[1], cell.points[2]]);
        let last = cells.len() - 1;
        cells[last].attribute = cell.attribute;
    }
    Ok(Mesh { ndim: 2, points, cells })
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{upgrade_to_tri6, RectangleCrossed};
    use gemlab::mesh::{Cell, Mesh, Point};
    use gemlab::shapes::GeoKind;
    use russell_lab::approx_eq;

    fn signed_area(mesh: &Mesh, points: &[usize]) -> f64 {
        let a = &mesh.points[points[0]].coords;
        let b = &mesh.points[points[1]].coords;
        let c = &mesh.points[points[2]].coords;
        0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]))
    }

    #[test]
    fn mesh_captures_errors() {
        let mut rect = RectangleCrossed::rayleigh_taylor(0, 2);
        assert_eq!(
            rect.mesh().err(),
            Some("the number of divisions must be at least 1 along each direction")
        );
        rect.nx = 1;
        rect.xmax = -1.0;
        assert_eq!(rect.mesh().err(), Some("the rectangle must have positive width and height"));
    }

    #[test]
    fn mesh_works() {
        //  6-----------7-----------8
        //  |`.       .'|`.       .'|
        //  |  `.   .'  |  `.   .'  |
        //  |    `11    |    `12    |
        //  |  .'   `.  |  .'   `.  |
        //  |.'       `.|.'       `.|
        //  3-----------4-----------5
        //  |`.       .'|`.       .'|
        //  |  `.   .'  |  `.   .'  |
        //  |    `9'    |    `10    |
        //  |  .'   `.  |  .'   `.  |
        //  |.'       `.|.'       `.|
        //  0-----------1-----------2
        let rect = RectangleCrossed {
            xmin: 0.0,
            xmax: 2.0,
            ymin: 0.0,
            ymax: 2.0,
            nx: 2,
            ny: 2,
        };
        let mesh = rect.mesh().unwrap();
        let n_vertex = 9 + 4;
        let n_cell = 16;
        let n_edge = 12 + 16; // grid edges + diagonals
        assert_eq!(mesh.cells.len(), n_cell);
        assert_eq!(mesh.points.len(), n_vertex + n_edge);
        assert_eq!(mesh.cells[0].points[..3], [0, 1, 9]);
        assert_eq!(mesh.cells[1].points[..3], [1, 4, 9]);
        assert_eq!(mesh.cells[2].points[..3], [4, 3, 9]);
        assert_eq!(mesh.cells[3].points[..3], [3, 0, 9]);
        for cell in &mesh.cells {
            assert_eq!(cell.kind, GeoKind::Tri6);
            approx_eq(signed_area(&mesh, &cell.points), 0.25, 1e-15);
            for m in 0..3 {
                let a = &mesh.points[cell.points[m]].coords;
                let b = &mesh.points[cell.points[(m + 1) % 3]].coords;
                let mid = &mesh.points[cell.points[3 + m]].coords;
                approx_eq(mid[0], 0.5 * (a[0] + b[0]), 1e-15);
                approx_eq(mid[1], 0.5 * (a[1] + b[1]), 1e-15);
            }
        }
        assert_eq!(mesh.points[9].coords, &[0.5, 0.5]);
        assert_eq!(mesh.points[12].coords, &[1.5, 1.5]);
    }

    #[test]
    fn upgrade_to_tri6_works() {
        #[rustfmt::skip]
        let mesh = Mesh {
            ndim: 2,
            points: vec![
                Point { id: 0, marker: 0, coords: vec![0.0, 0.0] },
                Point { id: 1, marker: 0, coords: vec![1.0, 0.0] },
                Point { id: 2, marker: 0, coords: vec![1.0, 1.0] },
                Point { id: 3, marker: 0, coords: vec![0.0, 1.0] },
            ],
            cells: vec![
                Cell { id: 0, attribute: 1, kind: GeoKind::Tri3, points: vec![0, 1, 2] },
                Cell { id: 1, attribute: 2, kind: GeoKind::Tri3, points: vec![0, 2, 3] },
            ],
        };
        let upgraded = upgrade_to_tri6(&mesh).unwrap();
        assert_eq!(upgraded.points.len(), 4 + 5);
        assert_eq!(upgraded.cells[0].points, &[0, 1, 2, 4, 5, 6]);
        assert_eq!(upgraded.cells[1].points, &[0, 2, 3, 6, 7, 8]);
        assert_eq!(upgraded.cells[1].attribute, 2);
        assert_eq!(upgraded.points[6].coords, &[0.5, 0.5]);

        let mut wrong = mesh.clone();
        wrong.cells[1].points.push(1);
        assert_eq!(upgrade_to_tri6(&wrong).err(), Some("cell must be a Tri3 with 3 points"));
    }
}
