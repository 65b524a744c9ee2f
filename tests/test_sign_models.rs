use russell_lab::{approx_eq, vec_max_abs_diff, Vector};
use tpflow::prelude::*;
use tpflow::StrError;

// Stably stratified column with a heavy fluid below a slightly lighter one
//
// TEST GOAL
//
// This test verifies that the smooth and the affine sign models give nearly the same solution
// after two steps when the density contrast is mild, and that the sequential and parallel
// computations give the same solution.
//
// The flat layer is not an exact discrete equilibrium on the crossed mesh; thus both models
// develop small spurious velocities that differ because the two models map the level set to
// different densities across the transition layer. With rho2/rho1 = 0.9 these velocities are of
// the order of 1e-3 and the level sets differ only through the transport over two steps.
//
// TOLERANCES
//
// level set: max |l_affine - l_smooth| < 1e-2
// velocity:  max |v_affine - v_smooth| < 2e-2
// sequential versus parallel: 1e-10 on every equation

fn run(sign_model: SignModel, parallel: bool) -> Result<(RunSummary, Vec<f64>, Vec<f64>, Vec<f64>), StrError> {
    let mut scenario = Scenario::rayleigh_taylor(2, 8);
    scenario.initial = InitialLevelSet::Layer {
        y_interface: 0.0,
        width: 0.05,
    };
    scenario
        .config
        .set_fluids(ParamFluids {
            mu1: 1.0,
            mu2: 1.0,
            rho1: 1000.0,
            rho2: 900.0,
        })
        .set_sign_model(sign_model)
        .set_eps(0.1)
        .set_time_window(0.0, 0.04)
        .set_dt(0.02)
        .set_parallel(parallel);
    let config = &scenario.config;
    let mesh = scenario.domain.mesh()?;
    let space = FunctionSpace::new(&mesh)?;
    let facets = Facets::new(&mesh)?;
    let mut state = FemState::new(&space, config, &scenario.initial)?;
    let mut integrator = TimeIntegrator::new(&space, &facets, config, &scenario.essential)?;
    let mut sink = MemorySink::new();
    integrator.run(&mut state, &mut sink)?;
    let velocity = space.extract(Field::Velocity, &state.w);
    let level_set = space.extract(Field::LevelSet, &state.w);
    Ok((
        integrator.summary.clone(),
        velocity,
        level_set,
        state.w.as_data().clone(),
    ))
}

#[test]
fn test_sign_models() -> Result<(), StrError> {
    let (smooth, v_smooth, l_smooth, w_smooth) = run(SignModel::Smooth, true)?;
    let (affine, v_affine, l_affine, w_affine) = run(SignModel::Affine, true)?;
    let (_, _, _, w_sequential) = run(SignModel::Smooth, false)?;
    assert_eq!(smooth.n_steps, 2);
    assert_eq!(affine.n_steps, 2);
    assert_eq!(w_smooth.len(), w_affine.len());

    // smooth versus affine
    let (i, diff_l) = vec_max_abs_diff(&Vector::from(&l_affine), &Vector::from(&l_smooth))?;
    println!("max |l_affine - l_smooth| = {:?} @ {}", diff_l, i);
    assert!(diff_l < 1e-2);
    let (i, diff_v) = vec_max_abs_diff(&Vector::from(&v_affine), &Vector::from(&v_smooth))?;
    println!("max |v_affine - v_smooth| = {:?} @ {}", diff_v, i);
    assert!(diff_v < 2e-2);

    // sequential versus parallel
    for i in 0..w_smooth.len() {
        approx_eq(w_sequential[i], w_smooth[i], 1e-10);
    }
    Ok(())
}
