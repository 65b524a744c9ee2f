use tpflow::base::Field;
use tpflow::fem::{FunctionSpace, PostProc};
use tpflow::StrError;
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "tpflow_to_paraview",
    about = "Generates VTU and PVD files for visualization with Paraview"
)]
struct Options {
    out_dir: String,

    fn_stem: String,
}

fn main() -> Result<(), StrError> {
    // parse options
    let options = Options::from_args();

    // load data
    let (file_io, mesh, series) = PostProc::read_results(&options.out_dir, &options.fn_stem)?;
    let space = FunctionSpace::new(&mesh)?;
    let velocity = &series[Field::Velocity as usize];
    let pressure = &series[Field::Pressure as usize];
    let level_set = &series[Field::LevelSet as usize];
    if velocity.len() != file_io.indices.len() || pressure.len() != file_io.indices.len() {
        return Err("the number of snapshots differs among the fields");
    }

    // write VTU files
    for index in &file_io.indices {
        file_io.write_vtu(
            &space,
            &velocity.values[*index],
            &pressure.values[*index],
            &level_set.values[*index],
            *index,
        )?;
    }

    // write PVD file
    file_io.write_pvd()?;

    // message
    let path_pvd = file_io.path_pvd();
    let thin_line = format!("{:─^1$}", "", path_pvd.len());
    println!("\n\n{}", thin_line);
    println!("VTU files generated; the PVD file is:");
    println!("{}", path_pvd);
    println!("{}\n\n", thin_line);
    Ok(())
}
