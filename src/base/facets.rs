use crate::StrError;
use gemlab::mesh::{CellId, Features, Mesh, PointId};

/// Holds an interior facet (edge) shared by two cells
#[derive(Clone, Debug, PartialEq)]
pub struct InteriorFacet {
    /// The two end vertices of the edge
    pub points: [PointId; 2],

    /// The cell on the "plus" side (the smaller cell id)
    pub plus: CellId,

    /// The cell on the "minus" side (the larger cell id)
    pub minus: CellId,
}

/// Holds the facet topology of a triangle mesh
///
/// The boundary edges and points (and the search of boundary points by coordinates) come from
/// [Features]. The interior facets pair the two cells sharing each interior edge and are needed
/// by the interior-penalty stabilization.
pub struct Facets<'a> {
    /// Holds an access to the mesh
    pub mesh: &'a Mesh,

    /// Holds the boundary features (edges and points) of the mesh
    pub features: Features<'a>,

    /// All interior facets sorted by the end vertices
    pub interior: Vec<InteriorFacet>,
}

impl<'a> Facets<'a> {
    /// Allocates a new instance
    pub fn new(mesh: &'a Mesh) -> Result<Self, StrError> {
        if mesh.ndim != 2 {
            return Err("the mesh must be two-dimensional");
        }
        for cell in &mesh.cells {
            if cell.kind.ndim() != 2 || cell.points.len() != cell.kind.nnode() {
                return Err("cell must be two-dimensional with the number of points of its kind");
            }
            if cell.points.iter().any(|p| *p >= mesh.points.len()) {
                return Err("cell has a point id out of bounds");
            }
        }
        let features = Features::new(mesh, false);
        let mut shared: Vec<_> = features.all_2d_edges.iter().collect();
        shared.sort_by_key(|(key, _)| **key);
        let mut interior = Vec::new();
        for (key, cells) in shared {
            match cells.len() {
                1 => (), // boundary edge
                2 => interior.push(InteriorFacet {
                    points: [key.0, key.1],
                    plus: usize::min(cells[0].0, cells[1].0),
                    minus: usize::max(cells[0].0, cells[1].0),
                }),
                _ => return Err("mesh is not conforming: an edge is shared by more than two cells"),
            }
        }
        Ok(Facets {
            mesh,
            features,
            interior,
        })
    }

    /// Returns the sorted ids of all points on the boundary edges (vertices and midpoints)
    pub fn boundary_points(&self) -> Vec<PointId> {
        let mut ids: Vec<_> = self.features.points.iter().copied().collect();
        ids.sort();
        ids
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
