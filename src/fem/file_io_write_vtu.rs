use super::{FileIo, FunctionSpace};
use crate::StrError;
use gemlab::shapes::GeoKind;
use std::fmt::Write;
use std::fs::File;
use std::io::Write as IoWrite;

/// Computes the values of a linear (vertex) field at all points of the mesh
///
/// The midpoint values are the mean of the two vertices of the edge.
fn linear_field_at_points(space: &FunctionSpace, vertex_values: &[f64]) -> Vec<f64> {
    let mut values = vec![0.0; space.npoint];
    for (v, point_id) in space.vertex_points.iter().enumerate() {
        values[*point_id] = vertex_values[v];
    }
    for cell in &space.mesh.cells {
        for e in 0..3 {
            let a = cell.points[GeoKind::Tri6.edge_node_id(e, 0)];
            let b = cell.points[GeoKind::Tri6.edge_node_id(e, 1)];
            let m = cell.points[GeoKind::Tri6.edge_node_id(e, 2)];
            values[m] = 0.5 * (values[a] + values[b]);
        }
    }
    values
}

impl FileIo {
    /// Writes a file associated with a single time station to perform visualization with ParaView
    ///
    /// The Tri6 cells are written as VTK quadratic triangles; the pressure and the level set are
    /// linearly interpolated to the midpoints. The files will be indexed with `index`
    /// corresponding to each time station.
    pub fn write_vtu(
        &self,
        space: &FunctionSpace,
        velocity: &[f64],
        pressure: &[f64],
        level_set: &[f64],
        index: usize,
    ) -> Result<(), StrError> {
        if self.output_dir().is_empty() {
            return Err("FileIo must be activated first");
        }
        let mesh = space.mesh;
        let npoint = mesh.points.len();
        let ncell = mesh.cells.len();
        if velocity.len() != 2 * npoint || pressure.len() != space.nvertex || level_set.len() != space.nvertex {
            return Err("the number of values is inconsistent with the function space");
        }

        // output buffer
        let mut buffer = String::new();

        // header
        write!(
            &mut buffer,
            "<?xml version=\"1.0\"?>\n\
             <VTKFile type=\"UnstructuredGrid\" version=\"0.1\" byte_order=\"LittleEndian\">\n\
             <UnstructuredGrid>\n\
             <Piece NumberOfPoints=\"{}\" NumberOfCells=\"{}\">\n",
            npoint, ncell
        )
        .unwrap();

        // nodes: coordinates
        write!(
            &mut buffer,
            "<Points>\n\
             <DataArray type=\"Float64\" NumberOfComponents=\"3\" format=\"ascii\">\n",
        )
        .unwrap();
        for point in &mesh.points {
            write!(&mut buffer, "{:?} {:?} 0.0 ", point.coords[0], point.coords[1]).unwrap();
        }
        write!(
            &mut buffer,
            "\n</DataArray>\n\
             </Points>\n"
        )
        .unwrap();

        // elements: connectivity
        write!(
            &mut buffer,
            "<Cells>\n\
             <DataArray type=\"Int32\" Name=\"connectivity\" format=\"ascii\">\n"
        )
        .unwrap();
        for cell in &mesh.cells {
            for p in &cell.points {
                write!(&mut buffer, "{} ", p).unwrap();
            }
        }

        // elements: offsets
        write!(
            &mut buffer,
            "\n</DataArray>\n\
             <DataArray type=\"Int32\" Name=\"offsets\" format=\"ascii\">\n"
        )
        .unwrap();
        let mut offset = 0;
        for cell in &mesh.cells {
            offset += cell.points.len();
            write!(&mut buffer, "{} ", offset).unwrap();
        }

        // elements: types
        write!(
            &mut buffer,
            "\n</DataArray>\n\
             <DataArray type=\"UInt8\" Name=\"types\" format=\"ascii\">\n"
        )
        .unwrap();
        for cell in &mesh.cells {
            match cell.kind.vtk_type() {
                Some(vtk) => write!(&mut buffer, "{} ", vtk).unwrap(),
                None => return Err("cannot generate VTU file because VTK cell type is not available"),
            }
        }
        write!(
            &mut buffer,
            "\n</DataArray>\n\
             </Cells>\n"
        )
        .unwrap();

        // data: points
        write!(&mut buffer, "<PointData Scalars=\"TheScalars\">\n").unwrap();
        write!(
            &mut buffer,
            "<DataArray type=\"Float64\" Name=\"velocity\" NumberOfComponents=\"3\" format=\"ascii\">\n"
        )
        .unwrap();
        for p in 0..npoint {
            write!(&mut buffer, "{:?} {:?} 0.0 ", velocity[2 * p], velocity[2 * p + 1]).unwrap();
        }
        write!(&mut buffer, "\n</DataArray>\n").unwrap();
        for (name, vertex_values) in [("pressure", pressure), ("level_set", level_set)] {
            write!(
                &mut buffer,
                "<DataArray type=\"Float64\" Name=\"{}\" NumberOfComponents=\"1\" format=\"ascii\">\n",
                name
            )
            .unwrap();
            for value in linear_field_at_points(space, vertex_values) {
                write!(&mut buffer, "{:?} ", value).unwrap();
            }
            write!(&mut buffer, "\n</DataArray>\n").unwrap();
        }
        write!(&mut buffer, "</PointData>\n").unwrap();

        // footer
        write!(
            &mut buffer,
            "</Piece>\n\
             </UnstructuredGrid>\n\
             </VTKFile>\n"
        )
        .unwrap();

        // write file
        let path = self.path_vtu(index);
        let mut file = File::create(&path).map_err(|_| "cannot create VTU file")?;
        file.write_all(buffer.as_bytes()).map_err(|_| "cannot write VTU file")?;
        Ok(())
    }

    /// Writes a summary file for all time stations to perform visualization with ParaView
    pub fn write_pvd(&self) -> Result<(), StrError> {
        if self.output_dir().is_empty() {
            return Err("FileIo must be activated first");
        }

        // header
        let mut buffer = String::new();
        write!(&mut buffer, "<?xml version=\"1.0\"?>\n<VTKFile type=\"Collection\" version=\"0.1\" byte_order=\"LittleEndian\">\n<Collection>\n").unwrap();

        // add VTU entries to PVD file
        for index in &self.indices {
            let vtu_fn = self.path_vtu(*index);
            write!(
                &mut buffer,
                "<DataSet timestep=\"{:?}\" file=\"{}\" />\n",
                self.times[*index], vtu_fn
            )
            .unwrap();
        }

        // footer
        write!(&mut buffer, "</Collection>\n</VTKFile>\n").unwrap();

        // write file
        let path = self.path_pvd();
        let mut file = File::create(&path).map_err(|_| "cannot create PVD file")?;
        file.write_all(buffer.as_bytes()).map_err(|_| "cannot write PVD file")?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
