use tpflow::base::{Facets, Field, Scenario};
use tpflow::fem::{FemState, FileIo, FunctionSpace, PostProc, TimeIntegrator, TimeSeries};
use tpflow::StrError;
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(name = "tpflow", about = "Simulates two-fluid flows with a level-set interface")]
struct Options {
    /// JSON file with the scenario (the Rayleigh-Taylor benchmark is used if absent)
    #[structopt(short, long)]
    scenario: Option<String>,

    /// Number of columns of the Rayleigh-Taylor mesh
    #[structopt(long, default_value = "8")]
    nx: usize,

    /// Number of rows of the Rayleigh-Taylor mesh
    #[structopt(long, default_value = "32")]
    ny: usize,

    /// Output directory
    #[structopt(short, long, default_value = "/tmp/tpflow/results")]
    out_dir: String,

    /// Filename stem of the output files
    #[structopt(short, long, default_value = "tpflow")]
    fn_stem: String,

    /// Saves a figure with the history of the centroid of the heavy fluid
    #[structopt(short, long)]
    plot: bool,
}

fn main() -> Result<(), StrError> {
    // parse options
    let options = Options::from_args();

    // scenario
    let scenario = match &options.scenario {
        Some(path) => Scenario::read_json(path)?,
        None => Scenario::rayleigh_taylor(options.nx, options.ny),
    };
    if let Some(msg) = scenario.validate() {
        println!("ERROR: {}", msg);
        return Err("the scenario is invalid");
    }

    // mesh and topology
    let mesh = scenario.domain.mesh()?;
    let space = FunctionSpace::new(&mesh)?;
    let facets = Facets::new(&mesh)?;

    // output files
    let mut file_io = FileIo::new();
    file_io.activate(&space, &options.fn_stem, Some(&options.out_dir))?;

    // run
    let mut state = FemState::new(&space, &scenario.config, &scenario.initial)?;
    let mut integrator = TimeIntegrator::new(&space, &facets, &scenario.config, &scenario.essential)?;
    let res = integrator.run(&mut state, &mut file_io);
    file_io.write_summary(&integrator.summary)?;
    state.write_json(&file_io.path_state())?;
    res?;

    // centroid history
    if options.plot {
        let post = PostProc::new(&space)?;
        let level_set = TimeSeries::read_jsonl(&file_io.path_series(Field::LevelSet))?;
        let (times, yc) = post.centroid_history(&level_set)?;
        let path = format!("{}/{}-centroid.svg", options.out_dir, options.fn_stem);
        PostProc::plot_centroid_history(&times, &yc, &path)?;
    }

    // message
    let summary = &integrator.summary;
    println!("\nnumber of steps = {}", summary.n_steps);
    println!("number of retries = {}", summary.n_retries);
    println!("final time = {:?}", summary.t_final);
    println!("results written to {}", file_io.output_dir());
    Ok(())
}
