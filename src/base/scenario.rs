use super::{Config, Dof, Essential, InitialLevelSet, RectangleCrossed, Selector};
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds the complete description of a simulation
///
/// A scenario gathers the domain, the configuration, the initial level set, and the essential
/// boundary conditions. It can be saved to (and loaded from) a JSON file, which is the input
/// of the `tpflow` command line program.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Scenario {
    /// Rectangular domain and mesh resolution
    pub domain: RectangleCrossed,

    /// Configuration parameters
    pub config: Config,

    /// Initial level set
    pub initial: InitialLevelSet,

    /// Essential boundary conditions
    pub essential: Essential,
}

impl Scenario {
    /// Returns the Rayleigh-Taylor benchmark
    ///
    /// A heavy disk of fluid 2 sits above a light fluid 1 in the [0, 0.25] × [-0.5, 0.5] box.
    /// All walls are no-slip and the pressure is pinned to zero at the bottom-left corner.
    pub fn rayleigh_taylor(nx: usize, ny: usize) -> Self {
        let domain = RectangleCrossed::rayleigh_taylor(nx, ny);
        let width = 0.5 * f64::min((domain.xmax - domain.xmin) / (nx as f64), (domain.ymax - domain.ymin) / (ny as f64));
        let mut essential = Essential::new();
        essential
            .no_slip()
            .on(Dof::P, Selector::XY(domain.xmin, domain.ymin), 0.0);
        Scenario {
            domain,
            config: Config::new(),
            initial: InitialLevelSet::rayleigh_taylor_disk(width),
            essential,
        }
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if let Some(msg) = self.config.validate() {
            return Some(msg);
        }
        let width = match self.initial {
            InitialLevelSet::Disk { radius, width, .. } => {
                if radius <= 0.0 {
                    return Some(format!("radius = {:?} is incorrect; it must be > 0.0", radius));
                }
                width
            }
            InitialLevelSet::Layer { width, .. } => width,
        };
        if width <= 0.0 {
            return Some(format!("width = {:?} is incorrect; it must be > 0.0", width));
        }
        None // all good
    }

    /// Reads a JSON file containing a scenario
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
        let scenario = serde_json::from_reader(buffered).map_err(|_| "cannot parse JSON file")?;
        Ok(scenario)
    }

    /// Writes a JSON file with the scenario
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
        serde_json::to_writer_pretty(&mut file, &self).map_err(|_| "cannot write file")?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
