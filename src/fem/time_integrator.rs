use super::{Elements, FemState, FunctionSpace, LinearSolver, LinearSystem};
use super::{NewtonSolver, PrescribedValues, ResultSink};
use crate::base::{Config, Essential, Facets, Field};
use crate::StrError;
use russell_lab::vec_copy;
use serde::{Deserialize, Serialize};

/// Holds information about a failed time step
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct StepFailure {
    /// The time that the step was trying to reach
    pub t: f64,

    /// The number of Newton iterations performed before the failure
    pub iteration: usize,

    /// The error message
    pub message: String,
}

/// Summarizes a run of the time integrator
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RunSummary {
    /// Number of accepted time steps
    pub n_steps: usize,

    /// Number of diverged steps that were retried with a smaller Δt
    pub n_retries: usize,

    /// The last accepted time
    pub t_final: f64,

    /// Number of Newton iterations of each accepted step
    pub iterations: Vec<usize>,

    /// Residual norms of the last Newton run
    pub last_norms: Vec<f64>,

    /// Information about the step that stopped the run (if any)
    pub failure: Option<StepFailure>,
}

/// Advances the coupled system in time with a fixed Δt (optionally reduced after failures)
///
/// The initial state is emitted first; then each accepted step emits the velocity, pressure
/// and level-set values at the new time.
pub struct TimeIntegrator<'a> {
    /// Holds configuration parameters
    config: &'a Config,

    /// Holds the function space
    space: &'a FunctionSpace<'a>,

    /// Holds the prescribed values
    prescribed: PrescribedValues,

    /// Holds the elements and facets
    elements: Elements<'a>,

    /// Holds the global linear system
    lin_sys: LinearSystem<'a>,

    /// Holds the nonlinear solver
    newton: NewtonSolver<'a>,

    /// Summary of the last run
    pub summary: RunSummary,
}

impl RunSummary {
    /// Allocates a new instance
    pub fn new(t_ini: f64) -> Self {
        RunSummary {
            n_steps: 0,
            n_retries: 0,
            t_final: t_ini,
            iterations: Vec::new(),
            last_norms: Vec::new(),
            failure: None,
        }
    }
}

impl<'a> TimeIntegrator<'a> {
    /// Allocates a new instance
    pub fn new(
        space: &'a FunctionSpace<'a>,
        facets: &Facets,
        config: &'a Config,
        essential: &Essential,
    ) -> Result<Self, StrError> {
        if let Some(msg) = config.validate() {
            println!("ERROR: {}", msg);
            return Err("cannot allocate simulation because config.validate() failed");
        }
        let prescribed = PrescribedValues::new(space, facets, essential)?;
        let elements = Elements::new(space, config, facets)?;
        let lin_sys = LinearSystem::new(config, &elements, &prescribed)?;
        Ok(TimeIntegrator {
            config,
            space,
            prescribed,
            elements,
            lin_sys,
            newton: NewtonSolver::new(config),
            summary: RunSummary::new(config.t_ini),
        })
    }

    /// Replaces the linear solver
    pub fn set_linear_solver(&mut self, solver: Box<dyn LinearSolver + 'a>) -> &mut Self {
        self.lin_sys.solver = solver;
        self
    }

    /// Runs the simulation from `state.t` to `config.t_fin`
    ///
    /// On error, the failure is recorded in the summary and the results emitted so far are kept.
    pub fn run(&mut self, state: &mut FemState, sink: &mut dyn ResultSink) -> Result<(), StrError> {
        let config = self.config;
        self.summary = RunSummary::new(state.t);

        // initial state
        self.prescribed.apply(&mut state.w0);
        vec_copy(&mut state.w, &state.w0)?;
        self.emit(state, sink)?;
        config.print_header();

        // time loop
        let t_tol = 1e-10 * config.dt;
        let mut dt = config.dt;
        let mut n_failures = 0;
        let mut timestep = 0;
        while config.t_fin - state.t > t_tol {
            // trial state
            state.dt = f64::min(dt, config.t_fin - state.t);
            vec_copy(&mut state.w, &state.w0)?;
            self.prescribed.apply(&mut state.w);
            config.print_timestep(timestep, state.t + state.dt, state.dt);

            // nonlinear iterations
            let res = self
                .newton
                .solve(state, &mut self.elements, &self.prescribed, &mut self.lin_sys);
            self.summary.last_norms = self.newton.norms.clone();
            match res {
                Ok(_) => {
                    state.t += state.dt;
                    vec_copy(&mut state.w0, &state.w)?;
                    self.summary.n_steps += 1;
                    self.summary.t_final = state.t;
                    self.summary.iterations.push(self.newton.n_iterations);
                    self.emit(state, sink)?;
                    timestep += 1;
                    n_failures = 0;
                    dt = f64::min(2.0 * dt, config.dt);
                }
                Err(e) => {
                    if n_failures < config.n_max_step_failures && 0.5 * dt >= config.dt_min {
                        n_failures += 1;
                        self.summary.n_retries += 1;
                        dt *= 0.5;
                        if config.verbose_timesteps {
                            let t_fail = state.t + state.dt;
                            println!("WARNING: step failed at t = {:?}; retrying with Δt = {:?}", t_fail, dt);
                        }
                        continue;
                    }
                    let failure = StepFailure {
                        t: state.t + state.dt,
                        iteration: self.newton.n_iterations,
                        message: e.to_string(),
                    };
                    println!(
                        "ERROR: step failed at t = {:?}, iteration = {}: {}",
                        failure.t, failure.iteration, failure.message
                    );
                    self.summary.failure = Some(failure);
                    vec_copy(&mut state.w, &state.w0)?;
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Writes all fields of the current state
    fn emit(&self, state: &FemState, sink: &mut dyn ResultSink) -> Result<(), StrError> {
        for field in Field::all() {
            sink.write(field, state.t, &self.space.extract(field, &state.w))?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{StepFailure, TimeIntegrator};
    use crate::base::{Config, Essential, Facets, Field, LinSolKind, ParamFluids, Scenario};
    use crate::fem::{DenseSolver, FemState, FunctionSpace, LinearSolver, MemorySink};
    use crate::StrError;
    use russell_lab::{approx_eq, Vector};
    use russell_sparse::CooMatrix;

    // fails during the first calls and then behaves like the dense solver
    struct FlakySolver {
        n_calls: usize,
        n_failing_calls: usize,
        dense: DenseSolver,
    }

    impl LinearSolver for FlakySolver {
        fn solve(&mut self, x: &mut Vector, kk: &mut CooMatrix, rhs: &Vector) -> Result<(), StrError> {
            self.n_calls += 1;
            if self.n_calls <= self.n_failing_calls {
                return Err("mock linear solver failure");
            }
            self.dense.solve(x, kk, rhs)
        }
    }

    fn still_scenario(t_fin: f64, dt: f64) -> Scenario {
        let mut scenario = Scenario::rayleigh_taylor(1, 2);
        scenario
            .config
            .set_fluids(ParamFluids::sample_identical())
            .set_gravity(0.0, 0.0)
            .set_time_window(0.0, t_fin)
            .set_dt(dt)
            .set_lin_sol(LinSolKind::Dense);
        scenario
    }

    #[test]
    fn new_captures_errors() {
        let scenario = Scenario::rayleigh_taylor(1, 1);
        let mesh = scenario.domain.mesh().unwrap();
        let space = FunctionSpace::new(&mesh).unwrap();
        let facets = Facets::new(&mesh).unwrap();
        let mut config = Config::new();
        config.set_dt(-1.0);
        assert_eq!(
            TimeIntegrator::new(&space, &facets, &config, &scenario.essential).err(),
            Some("cannot allocate simulation because config.validate() failed")
        );
    }

    #[test]
    fn run_emits_initial_and_all_steps() {
        let scenario = still_scenario(0.1, 0.03);
        let config = &scenario.config;
        let mesh = scenario.domain.mesh().unwrap();
        let space = FunctionSpace::new(&mesh).unwrap();
        let facets = Facets::new(&mesh).unwrap();
        let mut integrator = TimeIntegrator::new(&space, &facets, config, &scenario.essential).unwrap();
        let mut state = FemState::new(&space, config, &scenario.initial).unwrap();
        let mut sink = MemorySink::new();
        integrator.run(&mut state, &mut sink).unwrap();

        // 0.0, 0.03, 0.06, 0.09, 0.1 (clamped)
        assert_eq!(integrator.summary.n_steps, 4);
        assert_eq!(integrator.summary.failure, None);
        approx_eq(integrator.summary.t_final, 0.1, 1e-15);
        approx_eq(state.t, 0.1, 1e-15);
        for field in Field::all() {
            let series = sink.get(field);
            assert_eq!(series.len(), 5);
            assert_eq!(series.times[0], 0.0);
            approx_eq(series.times[4], 0.1, 1e-15);
        }
        let n_velocity = sink.get(Field::Velocity).values[0].len();
        assert_eq!(n_velocity, 2 * space.npoint);
        assert_eq!(sink.get(Field::Pressure).values[0].len(), space.nvertex);

        // without gravity and with identical fluids the fluid stays at rest
        for v in &sink.get(Field::Velocity).values[4] {
            approx_eq(*v, 0.0, 1e-12);
        }
    }

    #[test]
    fn run_records_failure_and_halts() {
        let scenario = still_scenario(0.1, 0.05);
        let config = &scenario.config;
        let mesh = scenario.domain.mesh().unwrap();
        let space = FunctionSpace::new(&mesh).unwrap();
        let facets = Facets::new(&mesh).unwrap();
        let mut integrator = TimeIntegrator::new(&space, &facets, config, &scenario.essential).unwrap();
        integrator.set_linear_solver(Box::new(FlakySolver {
            n_calls: 0,
            n_failing_calls: usize::MAX,
            dense: DenseSolver::new(),
        }));
        let mut state = FemState::new(&space, config, &scenario.initial).unwrap();
        let mut sink = MemorySink::new();
        let res = integrator.run(&mut state, &mut sink);

        // the level set is not at equilibrium (stabilization); thus the solver is called
        assert_eq!(res.err(), Some("mock linear solver failure"));
        assert_eq!(integrator.summary.n_steps, 0);
        assert_eq!(
            integrator.summary.failure,
            Some(StepFailure {
                t: 0.05,
                iteration: 0,
                message: "mock linear solver failure".to_string(),
            })
        );
        assert_eq!(sink.get(Field::LevelSet).len(), 1); // initial state only
        assert_eq!(state.t, 0.0);
    }

    #[test]
    fn run_reduces_step_after_failure() {
        let mut scenario = still_scenario(0.1, 0.05);
        scenario.config.set_n_max_step_failures(2);
        let config = &scenario.config;
        let mesh = scenario.domain.mesh().unwrap();
        let space = FunctionSpace::new(&mesh).unwrap();
        let facets = Facets::new(&mesh).unwrap();
        let mut integrator = TimeIntegrator::new(&space, &facets, config, &scenario.essential).unwrap();
        integrator.set_linear_solver(Box::new(FlakySolver {
            n_calls: 0,
            n_failing_calls: 1,
            dense: DenseSolver::new(),
        }));
        let mut state = FemState::new(&space, config, &scenario.initial).unwrap();
        let mut sink = MemorySink::new();
        integrator.run(&mut state, &mut sink).unwrap();

        // 0.0 → (fail) → 0.025 → 0.075 → 0.1
        assert_eq!(integrator.summary.n_retries, 1);
        assert_eq!(integrator.summary.n_steps, 3);
        let times = &sink.get(Field::Pressure).times;
        assert_eq!(times.len(), 4);
        approx_eq(times[1], 0.025, 1e-15);
        approx_eq(times[2], 0.075, 1e-15);
        approx_eq(times[3], 0.1, 1e-15);
    }

    #[test]
    fn run_without_essential_conditions_works() {
        let scenario = still_scenario(0.02, 0.02);
        let config = &scenario.config;
        let mesh = scenario.domain.mesh().unwrap();
        let space = FunctionSpace::new(&mesh).unwrap();
        let facets = Facets::new(&mesh).unwrap();
        let essential = Essential::new();
        let mut integrator = TimeIntegrator::new(&space, &facets, config, &essential).unwrap();
        let mut state = FemState::new(&space, config, &scenario.initial).unwrap();
        // at rest and without level-set gradient jumps (constant level set), R = 0
        state.w0.fill(0.0);
        let mut sink = MemorySink::new();
        integrator.run(&mut state, &mut sink).unwrap();
        assert_eq!(integrator.summary.n_steps, 1);
        assert_eq!(integrator.summary.iterations, &[0]);
    }
}
