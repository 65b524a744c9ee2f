use super::FunctionSpace;
use crate::base::{Config, Field, InitialLevelSet};
use crate::StrError;
use russell_lab::Vector;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds the state of a simulation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FemState {
    /// Time
    pub t: f64,

    /// Delta time
    pub dt: f64,

    /// Unknowns {w} = {velocity, pressure, level set} at the new time
    ///
    /// (n_equation)
    pub w: Vector,

    /// Unknowns {w₀} at the previous (accepted) time
    ///
    /// (n_equation)
    pub w0: Vector,
}

impl FemState {
    /// Allocates a new instance
    ///
    /// The velocity and pressure are zero; the level set is sampled at the vertices.
    pub fn new(space: &FunctionSpace, config: &Config, initial: &InitialLevelSet) -> Result<FemState, StrError> {
        if let Some(_) = config.validate() {
            return Err("cannot allocate state because config.validate() failed");
        }
        let n_equation = space.num_dofs();
        let mut w = Vector::new(n_equation);
        let offset = space.range(Field::LevelSet).start;
        for (v, point_id) in space.vertex_points.iter().enumerate() {
            w[offset + v] = initial.value(&space.mesh.points[*point_id].coords);
        }
        let w0 = w.clone();
        Ok(FemState {
            t: config.t_ini,
            dt: config.dt,
            w,
            w0,
        })
    }

    /// Reads a JSON file containing the state data
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let input = File::open(path).map_err(|_| "cannot open file")?;
        let buffered = BufReader::new(input);
        let state = serde_json::from_reader(buffered).map_err(|_| "cannot parse JSON file")?;
        Ok(state)
    }

    /// Writes a JSON file with the state data
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_json<P>(&self, full_path: &P) -> Result<(), StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p).map_err(|_| "cannot create directory")?;
        }
        let mut file = File::create(&path).map_err(|_| "cannot create file")?;
        serde_json::to_writer(&mut file, &self).map_err(|_| "cannot write file")?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
