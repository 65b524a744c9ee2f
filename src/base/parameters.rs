use serde::{Deserialize, Serialize};

/// Holds the parameters of the two immiscible fluids
///
/// Fluid 1 occupies the region where the level set is positive and fluid 2 the region where
/// the level set is negative.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct ParamFluids {
    /// Dynamic viscosity of fluid 1
    pub mu1: f64,

    /// Dynamic viscosity of fluid 2
    pub mu2: f64,

    /// Density of fluid 1
    pub rho1: f64,

    /// Density of fluid 2
    pub rho2: f64,
}

impl ParamFluids {
    /// Returns the parameters of the Rayleigh-Taylor benchmark (light fluid 1 and heavy fluid 2)
    pub fn sample_rayleigh_taylor() -> Self {
        ParamFluids {
            mu1: 1.0,
            mu2: 1.0,
            rho1: 500.0,
            rho2: 1000.0,
        }
    }

    /// Returns parameters with identical fluids
    pub fn sample_identical() -> Self {
        ParamFluids {
            mu1: 1.0,
            mu2: 1.0,
            rho1: 1000.0,
            rho2: 1000.0,
        }
    }

    /// Checks the parameters
    pub fn validate(&self) -> Option<String> {
        if self.mu1 <= 0.0 || self.mu2 <= 0.0 {
            return Some(format!(
                "viscosities must be positive: mu1 = {:?}, mu2 = {:?}",
                self.mu1, self.mu2
            ));
        }
        if self.rho1 <= 0.0 || self.rho2 <= 0.0 {
            return Some(format!(
                "densities must be positive: rho1 = {:?}, rho2 = {:?}",
                self.rho1, self.rho2
            ));
        }
        None
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
