use plotpy::{Curve, Plot};
use russell_lab::approx_eq;
use tpflow::prelude::*;
use tpflow::StrError;

// Disk of fluid in a box without gravity and with identical fluids
//
// TEST GOAL
//
// This test verifies that nothing drives the flow when there is no gravity and the two fluids
// have the same properties. The velocity must stay zero over the whole time window and the
// level set may only change through the interior-penalty smoothing; thus the region {l < 0}
// keeps its area and position within one cell size.
//
// DOMAIN
//
// The Rayleigh-Taylor box and disk with the default parameters (eps = 0.0125, dt = 0.02, t in [0, 1])

const SAVE_FIGURE: bool = false;

#[test]
fn test_disk_at_rest() -> Result<(), StrError> {
    // scenario
    let (nx, ny) = (4, 16);
    let mut scenario = Scenario::rayleigh_taylor(nx, ny);
    scenario
        .config
        .set_fluids(ParamFluids::sample_identical())
        .set_gravity(0.0, 0.0);
    let config = &scenario.config;
    let h = (scenario.domain.xmax - scenario.domain.xmin) / (nx as f64);

    // mesh and topology
    let mesh = scenario.domain.mesh()?;
    let space = FunctionSpace::new(&mesh)?;
    let facets = Facets::new(&mesh)?;

    // run
    let mut state = FemState::new(&space, config, &scenario.initial)?;
    let mut integrator = TimeIntegrator::new(&space, &facets, config, &scenario.essential)?;
    let mut sink = MemorySink::new();
    integrator.run(&mut state, &mut sink)?;
    let summary = &integrator.summary;
    assert_eq!(summary.n_steps, 50);
    assert_eq!(summary.n_retries, 0);
    approx_eq(summary.t_final, 1.0, 1e-12);

    // the fluid stays at rest
    for values in &sink.get(Field::Velocity).values {
        for v in values {
            approx_eq(*v, 0.0, 1e-10);
        }
    }
    for values in &sink.get(Field::Pressure).values {
        for p in values {
            approx_eq(*p, 0.0, 1e-8);
        }
    }

    // the negative region keeps its area and position
    let post = PostProc::new(&space)?;
    let level_set = sink.get(Field::LevelSet);
    assert_eq!(level_set.values.len(), 51);
    let l_ini = post.level_set_integral(&level_set.values[0]);
    let (area_ini, c_ini) = post.negative_region(&level_set.values[0]);
    assert!(area_ini > 0.0);
    let mut areas = Vec::new();
    for values in &level_set.values {
        approx_eq(post.level_set_integral(values), l_ini, 1e-10);
        let (area, c) = post.negative_region(values);
        assert!(f64::abs(area - area_ini) < 0.25 * area_ini);
        assert!(f64::abs(c[0] - c_ini[0]) < h);
        assert!(f64::abs(c[1] - c_ini[1]) < h);
        areas.push(area);
    }
    println!("area of l < 0: {:?} (t = 0) and {:?} (t = 1)", areas[0], areas[50]);

    // plot
    if SAVE_FIGURE {
        let mut curve = Curve::new();
        curve.set_marker_style(".").set_label("tpflow: area of {l < 0}");
        curve.draw(&level_set.times, &areas);
        let mut plot = Plot::new();
        plot.add(&curve)
            .grid_and_labels("t", "area")
            .legend()
            .save("/tmp/tpflow/test_disk_at_rest.svg")?;
    }
    Ok(())
}
