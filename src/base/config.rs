use super::{LinSolKind, ParamFluids, SignModel};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Defines the smallest allowed dt_min
pub const CONFIG_MIN_DT_MIN: f64 = 1e-10;

/// Defines the smallest allowed tolerance
pub const CONFIG_MIN_TOL: f64 = 1e-15;

/// Holds configuration parameters
///
/// All values are set once before the simulation starts and remain constant afterwards.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// Parameters of the two fluids
    pub fluids: ParamFluids,

    /// Gravity acceleration vector
    pub gravity: [f64; 2],

    /// Coefficient α of the interior-penalty stabilization of the level set
    pub alpha: f64,

    /// Regularization length ε of the sign function
    pub eps: f64,

    /// Approximation of the sign function
    pub sign_model: SignModel,

    /// Initial time
    pub t_ini: f64,

    /// Final time
    pub t_fin: f64,

    /// Time increment Δt
    pub dt: f64,

    /// Minimum allowed time increment min(Δt) when reducing the step after a failure
    pub dt_min: f64,

    /// Number of failed steps that may be retried with a halved Δt (zero aborts at the first failure)
    pub n_max_step_failures: usize,

    /// Degree of the quadrature rule over triangles (1, 2, or 4)
    pub integ_degree: usize,

    /// Maximum number of Newton iterations
    pub n_max_iterations: usize,

    /// Absolute tolerance for the Euclidean norm of the residual vector
    pub tol_abs_residual: f64,

    /// Relative tolerance for the Euclidean norm of the residual vector
    pub tol_rel_residual: f64,

    /// Linear solver
    pub lin_sol: LinSolKind,

    /// Compute the local element and facet quantities in parallel
    pub parallel: bool,

    /// Verbose mode during timesteps
    pub verbose_timesteps: bool,

    /// Verbose mode during iterations
    pub verbose_iterations: bool,
}

impl Config {
    /// Allocates a new instance with the Rayleigh-Taylor benchmark values
    pub fn new() -> Self {
        Config {
            fluids: ParamFluids::sample_rayleigh_taylor(),
            gravity: [0.0, -10.0],
            alpha: 0.1,
            eps: 0.0125,
            sign_model: SignModel::Smooth,
            t_ini: 0.0,
            t_fin: 1.0,
            dt: 0.02,
            dt_min: 1e-6,
            n_max_step_failures: 0,
            integ_degree: 4,
            n_max_iterations: 20,
            tol_abs_residual: 1e-10,
            tol_rel_residual: 1e-10,
            lin_sol: LinSolKind::Umfpack,
            parallel: true,
            verbose_timesteps: false,
            verbose_iterations: false,
        }
    }

    /// Sets the parameters of the two fluids
    pub fn set_fluids(&mut self, fluids: ParamFluids) -> &mut Self {
        self.fluids = fluids;
        self
    }

    /// Sets the gravity acceleration vector
    pub fn set_gravity(&mut self, gx: f64, gy: f64) -> &mut Self {
        self.gravity = [gx, gy];
        self
    }

    /// Sets the stabilization coefficient α
    pub fn set_alpha(&mut self, alpha: f64) -> &mut Self {
        self.alpha = alpha;
        self
    }

    /// Sets the regularization length ε of the sign function
    pub fn set_eps(&mut self, eps: f64) -> &mut Self {
        self.eps = eps;
        self
    }

    /// Sets the approximation of the sign function
    pub fn set_sign_model(&mut self, model: SignModel) -> &mut Self {
        self.sign_model = model;
        self
    }

    /// Sets the initial and final times
    pub fn set_time_window(&mut self, t_ini: f64, t_fin: f64) -> &mut Self {
        self.t_ini = t_ini;
        self.t_fin = t_fin;
        self
    }

    /// Sets the time increment
    pub fn set_dt(&mut self, dt: f64) -> &mut Self {
        self.dt = dt;
        self
    }

    /// Sets the minimum time increment
    pub fn set_dt_min(&mut self, dt_min: f64) -> &mut Self {
        self.dt_min = dt_min;
        self
    }

    /// Sets the number of failed steps that may be retried with a halved Δt
    pub fn set_n_max_step_failures(&mut self, n: usize) -> &mut Self {
        self.n_max_step_failures = n;
        self
    }

    /// Sets the degree of the quadrature rule
    pub fn set_integ_degree(&mut self, degree: usize) -> &mut Self {
        self.integ_degree = degree;
        self
    }

    /// Sets the Newton-Raphson tolerances and maximum number of iterations
    pub fn set_newton(&mut self, tol_abs: f64, tol_rel: f64, n_max_iterations: usize) -> &mut Self {
        self.tol_abs_residual = tol_abs;
        self.tol_rel_residual = tol_rel;
        self.n_max_iterations = n_max_iterations;
        self
    }

    /// Sets the linear solver
    pub fn set_lin_sol(&mut self, kind: LinSolKind) -> &mut Self {
        self.lin_sol = kind;
        self
    }

    /// Enables or disables the parallel computation of local quantities
    pub fn set_parallel(&mut self, flag: bool) -> &mut Self {
        self.parallel = flag;
        self
    }

    /// Sets the verbose flags
    pub fn set_verbose(&mut self, timesteps: bool, iterations: bool) -> &mut Self {
        self.verbose_timesteps = timesteps;
        self.verbose_iterations = iterations;
        self
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if let Some(msg) = self.fluids.validate() {
            return Some(msg);
        }
        if self.alpha < 0.0 {
            return Some(format!("alpha = {:?} is incorrect; it must be ≥ 0.0", self.alpha));
        }
        if self.eps <= 0.0 {
            return Some(format!("eps = {:?} is incorrect; it must be > 0.0", self.eps));
        }
        if self.t_fin < self.t_ini {
            return Some(format!(
                "t_fin = {:?} is incorrect; it must be ≥ t_ini = {:?}",
                self.t_fin, self.t_ini
            ));
        }
        if self.dt_min < CONFIG_MIN_DT_MIN {
            return Some(format!(
                "dt_min = {:?} is incorrect; it must be ≥ {:e}",
                self.dt_min, CONFIG_MIN_DT_MIN
            ));
        }
        if self.dt < self.dt_min {
            return Some(format!(
                "dt = {:?} is incorrect; it must be ≥ dt_min = {:?}",
                self.dt, self.dt_min
            ));
        }
        if self.integ_degree != 1 && self.integ_degree != 2 && self.integ_degree != 4 {
            return Some(format!(
                "integ_degree = {:?} is incorrect; it must be 1, 2, or 4",
                self.integ_degree
            ));
        }
        if self.n_max_iterations < 1 {
            return Some(format!(
                "n_max_iterations = {:?} is incorrect; it must be ≥ 1",
                self.n_max_iterations
            ));
        }
        if self.tol_abs_residual < CONFIG_MIN_TOL {
            return Some(format!(
                "tol_abs_residual = {:?} is incorrect; it must be ≥ {:e}",
                self.tol_abs_residual, CONFIG_MIN_TOL
            ));
        }
        if self.tol_rel_residual < CONFIG_MIN_TOL {
            return Some(format!(
                "tol_rel_residual = {:?} is incorrect; it must be ≥ {:e}",
                self.tol_rel_residual, CONFIG_MIN_TOL
            ));
        }
        None // all good
    }

    /// Prints the header of the table with timestep and iteration data
    #[inline]
    pub fn print_header(&self) {
        if self.verbose_timesteps || self.verbose_iterations {
            println!("Legend:");
            println!("✅ : converged");
            println!("👍 : converging");
            println!("🥵 : diverging");
            println!("😱 : found NaN or Inf\n");
            println!(
                "{:>8} {:>13} {:>13} {:>5} {:>8}   {:>8}  ",
                "timestep", "t", "Δt", "iter", "‖R‖", "tol·‖R₀‖"
            );
        }
    }

    /// Prints timestep data
    #[inline]
    #[rustfmt::skip]
    pub fn print_timestep(&self, timestep: usize, t: f64, dt: f64) {
        if !self.verbose_timesteps {
            return ;
        }
        println!(
            "{:>8} {:>13.6e} {:>13.6e} {:>5} {:>8}   {:>8}  ",
            timestep+1, t, dt, ".", ".", "."
        );
    }

    /// Prints iteration data
    #[inline]
    pub fn print_iteration(&self, it: usize, norm_rr: f64, norm_rr0: f64) {
        if !self.verbose_iterations {
            return;
        }
        let (l, r) = if !norm_rr.is_finite() {
            ("😱", "  ") // found NaN or Inf
        } else if norm_rr < self.tol_abs_residual {
            ("✅", "  ") // converged on absolute residual
        } else if it == 0 {
            ("  ", "? ") // first iteration (no ‖R₀‖ yet)
        } else if norm_rr < self.tol_rel_residual * norm_rr0 {
            ("  ", "✅") // converged on relative residual
        } else if norm_rr > norm_rr0 {
            ("🥵", "  ") // diverging
        } else {
            ("👍", "  ") // converging
        };
        let n = it + 1;
        let v = self.tol_rel_residual * norm_rr0;
        println!(
            "{:>8} {:>13} {:>13} {:>5} {:>8.2e}{} {:>8.2e}{}",
            ".", ".", ".", n, norm_rr, l, v, r,
        );
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration data\n").unwrap();
        write!(f, "==================\n").unwrap();
        write!(f, "fluids = {:?}\n", self.fluids).unwrap();
        write!(f, "gravity = {:?}\n", self.gravity).unwrap();
        write!(f, "alpha = {:?}\n", self.alpha).unwrap();
        write!(f, "eps = {:?}\n", self.eps).unwrap();
        write!(f, "sign_model = {:?}\n", self.sign_model).unwrap();
        write!(f, "t_ini = {:?}, t_fin = {:?}, dt = {:?}\n", self.t_ini, self.t_fin, self.dt).unwrap();
        write!(f, "integ_degree = {:?}\n", self.integ_degree).unwrap();
        write!(
            f,
            "newton: tol_abs = {:e}, tol_rel = {:e}, n_max_iterations = {}\n",
            self.tol_abs_residual, self.tol_rel_residual, self.n_max_iterations
        )
        .unwrap();
        write!(f, "lin_sol = {:?}\n", self.lin_sol).unwrap();
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::base::{LinSolKind, ParamFluids, SignModel};

    #[test]
    fn new_and_setters_work() {
        let mut config = Config::new();
        assert_eq!(config.validate(), None);
        assert_eq!(config.gravity, [0.0, -10.0]);
        assert_eq!(config.n_max_iterations, 20);
        assert_eq!(config.tol_abs_residual, 1e-10);
        assert_eq!(config.tol_rel_residual, 1e-10);
        config
            .set_fluids(ParamFluids::sample_identical())
            .set_gravity(0.0, 0.0)
            .set_alpha(0.5)
            .set_eps(0.05)
            .set_sign_model(SignModel::Affine)
            .set_time_window(0.0, 0.5)
            .set_dt(0.05)
            .set_dt_min(1e-3)
            .set_n_max_step_failures(2)
            .set_integ_degree(2)
            .set_newton(1e-9, 1e-8, 10)
            .set_lin_sol(LinSolKind::Dense)
            .set_parallel(false)
            .set_verbose(true, false);
        assert_eq!(config.validate(), None);
        assert_eq!(config.fluids.rho1, 1000.0);
        assert_eq!(config.sign_model, SignModel::Affine);
        assert_eq!(config.lin_sol, LinSolKind::Dense);
        assert_eq!(config.n_max_iterations, 10);
        assert!(!config.parallel);
    }

    #[test]
    fn validate_captures_errors() {
        let mut config = Config::new();
        config.set_eps(0.0);
        assert_eq!(
            config.validate(),
            Some("eps = 0.0 is incorrect; it must be > 0.0".to_string())
        );
        let mut config = Config::new();
        config.set_alpha(-1.0);
        assert_eq!(
            config.validate(),
            Some("alpha = -1.0 is incorrect; it must be ≥ 0.0".to_string())
        );
        let mut config = Config::new();
        config.set_time_window(1.0, 0.5);
        assert_eq!(
            config.validate(),
            Some("t_fin = 0.5 is incorrect; it must be ≥ t_ini = 1.0".to_string())
        );
        let mut config = Config::new();
        config.set_dt(1e-8);
        assert_eq!(
            config.validate(),
            Some("dt = 1e-8 is incorrect; it must be ≥ dt_min = 1e-6".to_string())
        );
        let mut config = Config::new();
        config.set_integ_degree(3);
        assert_eq!(
            config.validate(),
            Some("integ_degree = 3 is incorrect; it must be 1, 2, or 4".to_string())
        );
        let mut config = Config::new();
        config.set_newton(1e-10, 1e-10, 0);
        assert_eq!(
            config.validate(),
            Some("n_max_iterations = 0 is incorrect; it must be ≥ 1".to_string())
        );
        let mut config = Config::new();
        config.set_newton(0.0, 1e-10, 5);
        assert_eq!(
            config.validate(),
            Some("tol_abs_residual = 0.0 is incorrect; it must be ≥ 1e-15".to_string())
        );
        let mut config = Config::new();
        config.fluids.rho2 = 0.0;
        assert_eq!(
            config.validate(),
            Some("densities must be positive: rho1 = 500.0, rho2 = 0.0".to_string())
        );
    }

    #[test]
    fn display_works() {
        let config = Config::new();
        let text = format!("{}", config);
        assert!(text.starts_with("Configuration data\n==================\n"));
        assert!(text.contains("gravity = [0.0, -10.0]\n"));
        assert!(text.contains("lin_sol = Umfpack\n"));
    }
}
