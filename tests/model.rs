//! Integration tests for loading and solving models.
use equitable_retirement::input::load_model;
use equitable_retirement::model::RetirementModel;
use equitable_retirement::optimisation::{ObjectiveWeights, SolverBackend};
use equitable_retirement::units::HOURS_PER_YEAR;
use float_cmp::assert_approx_eq;
use std::path::{Path, PathBuf};

/// Get the path to the demo model.
fn get_model_dir() -> PathBuf {
    Path::new(file!())
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
        .join("mid_atlantic")
}

/// An integration test which attempts to load the demo model
#[test]
fn test_load_model() {
    let (model, parameters) = load_model(get_model_dir()).unwrap();
    model.validate().unwrap();

    assert_eq!(model.years, [2025, 2026, 2027, 2028]);
    assert_eq!(model.units.len(), 3);
    assert_eq!(model.sites.len(), 8);
    assert_eq!(parameters.objective, ObjectiveWeights::new(1.0, 1.0, 0.0));
    assert_eq!(parameters.solver.backend, SolverBackend::Highs);
}

/// Solve the smoke test model and check the properties of the solution
#[test]
fn test_solve_smoke_model() {
    let model = RetirementModel::smoke_test();
    let weights = ObjectiveWeights::default();
    let output = model.solve(&weights, SolverBackend::HighsSimplex).unwrap();
    assert_eq!(output.backend, SolverBackend::HighsSimplex);

    let n_years = model.years.len();
    let n_units = model.units.len();
    for c in 0..n_units {
        // Fully retired by the final year
        assert_approx_eq!(f64, output.retired[[c, n_years - 1]], 1.0, epsilon = 1e-6);

        for y in 0..n_years {
            // Retirement is never reversed
            if y > 0 {
                assert!(output.retired[[c, y]] + 1e-6 >= output.retired[[c, y - 1]]);
            }

            let replacement: f64 = (0..model.sites.len())
                .map(|r| HOURS_PER_YEAR * model.params.cf[r] * output.capacity[[r, c, y]])
                .sum();
            let retired_generation = model.params.hist_gen[c] * output.retired[[c, y]];
            assert!(replacement + 1e-6 >= retired_generation);
        }
    }

    assert_approx_eq!(f64, output.z, output.cost, epsilon = 1e-6);
    assert_eq!(output.health, 0.0);
}

/// A weighting which includes health damages and jobs also solves
#[test]
fn test_solve_demo_model_weighted() {
    let (model, _) = load_model(get_model_dir()).unwrap();
    let weights = ObjectiveWeights::new(1.0, 1.0, 1.0);
    let output = model.solve(&weights, SolverBackend::Highs).unwrap();

    assert_approx_eq!(
        f64,
        output.z,
        output.cost + output.health - output.jobs,
        epsilon = 1e-6
    );
}

/// All-zero weights are rejected before solving
#[test]
fn test_solve_zero_weights() {
    let model = RetirementModel::smoke_test();
    let weights = ObjectiveWeights::new(0.0, 0.0, 0.0);
    assert!(model.solve(&weights, SolverBackend::Highs).is_err());
}
