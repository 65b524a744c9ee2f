use serde::{Deserialize, Serialize};

/// Defines the initial level-set field
///
/// The level set is a smoothed signed distance `l = tanh(d / width)` with values in `(-1, 1)`.
/// The region where `l < 0` is occupied by fluid 2.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub enum InitialLevelSet {
    /// Fluid 2 fills the disk of given centre and radius
    Disk {
        /// x coordinate of the centre
        xc: f64,

        /// y coordinate of the centre
        yc: f64,

        /// Radius
        radius: f64,

        /// Width of the smoothing
        width: f64,
    },

    /// Fluid 2 fills the region above the horizontal line y = y_interface
    Layer {
        /// Height of the interface
        y_interface: f64,

        /// Width of the smoothing
        width: f64,
    },
}

impl InitialLevelSet {
    /// Returns the disk of the Rayleigh-Taylor benchmark on the [0, 0.25] × [-0.5, 0.5] domain
    ///
    /// The circle passes through the four points (0, 0), (0.25, 0), (0, 0.5), and (0.25, 0.5).
    pub fn rayleigh_taylor_disk(width: f64) -> Self {
        InitialLevelSet::Disk {
            xc: 0.125,
            yc: 0.25,
            radius: f64::sqrt(0.125 * 0.125 + 0.25 * 0.25),
            width,
        }
    }

    /// Evaluates the level set at a point
    pub fn value(&self, x: &[f64]) -> f64 {
        match *self {
            InitialLevelSet::Disk { xc, yc, radius, width } => {
                let dx = x[0] - xc;
                let dy = x[1] - yc;
                let d = f64::sqrt(dx * dx + dy * dy) - radius;
                f64::tanh(d / width)
            }
            InitialLevelSet::Layer { y_interface, width } => f64::tanh((y_interface - x[1]) / width),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
