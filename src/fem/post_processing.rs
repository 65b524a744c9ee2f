use super::{integ_points, FileIo, FunctionSpace, TimeSeries};
use crate::base::Field;
use crate::StrError;
use gemlab::mesh::Mesh;
use plotpy::{Curve, Plot};

/// Assists in post-processing the nodal results
pub struct PostProc<'a> {
    /// Holds the function space
    space: &'a FunctionSpace<'a>,

    /// Holds the area of all cells
    areas: Vec<f64>,
}

impl<'a> PostProc<'a> {
    /// Reads the mesh and the history of all fields for post-processing
    ///
    /// # Input
    ///
    /// * `out_dir` -- the output directory where the files are located.
    /// * `fn_stem` -- the filename stem used to construct the full paths.
    ///
    /// # Returns
    ///
    /// Returns `(file_io, mesh, series)` where `series` holds the velocity, pressure,
    /// and level-set histories (in the order of [Field::all]).
    pub fn read_results(out_dir: &str, fn_stem: &str) -> Result<(FileIo, Mesh, Vec<TimeSeries>), StrError> {
        let file_io = FileIo::open(out_dir, fn_stem)?;
        let mesh = Mesh::read_json(&file_io.path_mesh())?;
        let mut series = Vec::new();
        for field in Field::all() {
            series.push(TimeSeries::read_jsonl(&file_io.path_series(field))?);
        }
        Ok((file_io, mesh, series))
    }

    /// Allocates a new instance
    pub fn new(space: &'a FunctionSpace<'a>) -> Result<Self, StrError> {
        let mut areas = Vec::with_capacity(space.mesh.cells.len());
        for cell_id in 0..space.mesh.cells.len() {
            let mut pad = space.scratchpad(cell_id, Field::LevelSet)?;
            areas.push(0.5 * pad.calc_jacobian(&[1.0 / 3.0, 1.0 / 3.0])?);
        }
        Ok(PostProc { space, areas })
    }

    /// Returns the values of a linear field at the three vertices of a cell
    fn cell_vertex_values(&self, cell_id: usize, vertex_values: &[f64]) -> [f64; 3] {
        let points = &self.space.mesh.cells[cell_id].points;
        let mut res = [0.0; 3];
        for m in 0..3 {
            if let Some(v) = self.space.vertex_index[points[m]] {
                res[m] = vertex_values[v];
            }
        }
        res
    }

    /// Returns the coordinates of the three vertices of a cell
    fn cell_vertex_coords(&self, cell_id: usize) -> [[f64; 2]; 3] {
        let points = &self.space.mesh.cells[cell_id].points;
        let mut xx = [[0.0; 2]; 3];
        for m in 0..3 {
            let x = &self.space.mesh.points[points[m]].coords;
            xx[m] = [x[0], x[1]];
        }
        xx
    }

    /// Computes the integral of the level set over the domain
    pub fn level_set_integral(&self, level_set: &[f64]) -> f64 {
        let mut sum = 0.0;
        for (cell_id, area) in self.areas.iter().enumerate() {
            let ll = self.cell_vertex_values(cell_id, level_set);
            sum += area * (ll[0] + ll[1] + ll[2]) / 3.0;
        }
        sum
    }

    /// Computes the area and the centroid of the region where the level set is negative
    ///
    /// The region is computed exactly by clipping each cell with the zero line of the
    /// (linear) level set. Returns `(area, [xc, yc])`; the centroid is zero if the area is zero.
    pub fn negative_region(&self, level_set: &[f64]) -> (f64, [f64; 2]) {
        let mut area = 0.0;
        let mut moment = [0.0, 0.0];
        for cell_id in 0..self.areas.len() {
            let ll = self.cell_vertex_values(cell_id, level_set);
            let polygon = clip_negative(&self.cell_vertex_coords(cell_id), &ll);
            let (a, c) = polygon_area_centroid(&polygon);
            area += a;
            moment[0] += a * c[0];
            moment[1] += a * c[1];
        }
        if area > 0.0 {
            (area, [moment[0] / area, moment[1] / area])
        } else {
            (0.0, [0.0, 0.0])
        }
    }

    /// Computes `∫ div(v) φ_p dx` for every pressure test function (vertex)
    pub fn divergence_moments(&self, velocity: &[f64]) -> Result<Vec<f64>, StrError> {
        let ips = integ_points(4)?;
        let mut res = vec![0.0; self.space.nvertex];
        for cell_id in 0..self.areas.len() {
            let mut pad_v = self.space.scratchpad(cell_id, Field::Velocity)?;
            let mut pad_p = self.space.scratchpad(cell_id, Field::Pressure)?;
            let points = &self.space.mesh.cells[cell_id].points;
            for ip in ips {
                let ksi = &ip[0..2];
                let det_jac = pad_v.calc_gradient(ksi)?;
                (pad_p.fn_interp)(&mut pad_p.interp, ksi);
                let mut div = 0.0;
                for m in 0..6 {
                    let p = points[m];
                    div += velocity[2 * p] * pad_v.gradient.get(m, 0) + velocity[2 * p + 1] * pad_v.gradient.get(m, 1);
                }
                let w = ip[3] * det_jac;
                for c in 0..3 {
                    if let Some(v) = self.space.vertex_index[points[c]] {
                        res[v] += w * div * pad_p.interp[c];
                    }
                }
            }
        }
        Ok(res)
    }

    /// Computes the vertical position of the centroid of the negative region at each snapshot
    ///
    /// Returns `(times, yc)`.
    pub fn centroid_history(&self, level_set: &TimeSeries) -> Result<(Vec<f64>, Vec<f64>), StrError> {
        if level_set.field != Field::LevelSet {
            return Err("the time series must correspond to the level set");
        }
        let yc = level_set.values.iter().map(|ll| self.negative_region(ll).1[1]).collect();
        Ok((level_set.times.clone(), yc))
    }

    /// Saves a figure with the history of the centroid of the negative region
    pub fn plot_centroid_history(times: &[f64], yc: &[f64], full_path: &str) -> Result<(), StrError> {
        let mut curve = Curve::new();
        curve.set_line_color("#cd0000").set_marker_style(".");
        curve.draw(&times.to_vec(), &yc.to_vec());
        let mut plot = Plot::new();
        plot.add(&curve).grid_and_labels("t", "centroid y");
        plot.save(full_path)
    }
}

/// Clips a triangle keeping the part where the linear function (given at the vertices) is negative
fn clip_negative(xx: &[[f64; 2]; 3], ll: &[f64; 3]) -> Vec<[f64; 2]> {
    let mut polygon = Vec::with_capacity(4);
    for i in 0..3 {
        let j = (i + 1) % 3;
        if ll[i] < 0.0 {
            polygon.push(xx[i]);
        }
        if (ll[i] < 0.0) != (ll[j] < 0.0) {
            let s = ll[i] / (ll[i] - ll[j]);
            polygon.push([xx[i][0] + s * (xx[j][0] - xx[i][0]), xx[i][1] + s * (xx[j][1] - xx[i][1])]);
        }
    }
    polygon
}

/// Computes the area and centroid of a (counterclockwise) polygon
fn polygon_area_centroid(polygon: &[[f64; 2]]) -> (f64, [f64; 2]) {
    let n = polygon.len();
    if n < 3 {
        return (0.0, [0.0, 0.0]);
    }
    let mut a2 = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let p = polygon[i];
        let q = polygon[(i + 1) % n];
        let cross = p[0] * q[1] - q[0] * p[1];
        a2 += cross;
        cx += (p[0] + q[0]) * cross;
        cy += (p[1] + q[1]) * cross;
    }
    if a2 == 0.0 {
        return (0.0, [0.0, 0.0]);
    }
    (0.5 * a2, [cx / (3.0 * a2), cy / (3.0 * a2)])
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
