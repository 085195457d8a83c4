//! Code for building and solving the retirement optimisation problem.
//!
//! The problem decides, for every coal unit and year, what fraction of the unit has been retired
//! and, for every site, unit and year, how much renewable capacity replaces it. The objective is a
//! weighted combination of system cost, health damages and (negatively weighted) employment.
use crate::log::is_logging_disabled;
use crate::model::RetirementModel;
use crate::model::params::Params;
use anyhow::{Result, bail, ensure};
use highs::{HighsModelStatus, RowProblem as Problem, Sense};
use indexmap::IndexMap;
use log::{info, warn};
use ndarray::{Array2, Array3};
use serde::Deserialize;
use std::hash::Hash;
use std::ops::RangeInclusive;

mod backend;
pub use backend::SolverBackend;
mod constraints;
use constraints::add_constraints;

/// A decision variable in the optimisation
///
/// Note that this type does **not** include the value of the variable; it just refers to a
/// particular column of the problem.
type Variable = highs::Col;

/// Indexes a coal unit and a year
type UnitYear = (usize, usize);

/// Indexes a site, a coal unit and a year
type SiteUnitYear = (usize, usize, usize);

/// Indexes a site and a coal unit
type SiteUnit = (usize, usize);

/// A map for easy lookup of one kind of variable in the problem.
///
/// The variables in a map occupy a contiguous block of columns starting at `offset`, so that
/// their values can be read back from the solution.
pub struct VariableMap<K> {
    offset: usize,
    vars: IndexMap<K, Variable>,
}

impl<K: Eq + Hash + Copy> VariableMap<K> {
    /// Create an empty map whose variables will start at the problem's next column
    fn new(problem: &Problem) -> Self {
        Self {
            offset: problem.num_cols(),
            vars: IndexMap::new(),
        }
    }

    /// Add a new continuous variable to the problem
    fn add(&mut self, problem: &mut Problem, key: K, coeff: f64, bounds: RangeInclusive<f64>) {
        self.check_contiguous(problem);
        let var = problem.add_column(coeff, bounds);
        self.insert(key, var);
    }

    /// Add a new integer variable to the problem
    fn add_integer(
        &mut self,
        problem: &mut Problem,
        key: K,
        coeff: f64,
        bounds: RangeInclusive<f64>,
    ) {
        self.check_contiguous(problem);
        let var = problem.add_integer_column(coeff, bounds);
        self.insert(key, var);
    }

    fn check_contiguous(&self, problem: &Problem) {
        assert!(
            problem.num_cols() == self.offset + self.vars.len(),
            "Variables of one kind must be added contiguously"
        );
    }

    fn insert(&mut self, key: K, var: Variable) {
        let existing = self.vars.insert(key, var).is_some();
        assert!(!existing, "Duplicate entry for var");
    }

    /// Get the [`Variable`] corresponding to the given key
    fn get(&self, key: K) -> Variable {
        *self
            .vars
            .get(&key)
            .expect("No variable found for given params")
    }

    /// Iterate over the keys of the variables along with their values in a solution
    fn iter_values<'a>(&'a self, columns: &'a [f64]) -> impl Iterator<Item = (K, f64)> + 'a {
        assert!(
            self.offset + self.vars.len() <= columns.len(),
            "Bad variable map: columns out of range"
        );

        self.vars
            .keys()
            .copied()
            .zip(columns[self.offset..].iter().copied())
    }
}

/// All the variables in the problem
pub struct Variables {
    /// Cumulative fraction of each coal unit retired by each year
    retired: VariableMap<UnitYear>,
    /// Fraction of each coal unit retired during each year
    newly_retired: VariableMap<UnitYear>,
    /// Cumulative renewable capacity at each site replacing each coal unit
    capacity: VariableMap<SiteUnitYear>,
    /// Renewable capacity built during each year
    new_capacity: VariableMap<SiteUnitYear>,
    /// Whether each site is used to replace each coal unit
    site_used: VariableMap<SiteUnit>,
}

/// The weights applied to each component of the objective.
///
/// The objective is `cost * cost_weight + health * health_weight - jobs * jobs_weight`, which is
/// minimised.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ObjectiveWeights {
    /// Weight for system cost
    #[serde(default)]
    pub cost: f64,
    /// Weight for health damages
    #[serde(default)]
    pub health: f64,
    /// Weight for employment
    #[serde(default)]
    pub jobs: f64,
}

impl Default for ObjectiveWeights {
    /// Minimise cost only
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }
}

impl ObjectiveWeights {
    /// Create a new set of weights for the cost, health and jobs components
    pub fn new(cost: f64, health: f64, jobs: f64) -> Self {
        Self { cost, health, jobs }
    }

    /// Check that weights are finite, non-negative and not all zero
    pub fn validate(&self) -> Result<()> {
        for (name, weight) in [
            ("cost", self.cost),
            ("health", self.health),
            ("jobs", self.jobs),
        ] {
            ensure!(
                weight.is_finite() && weight >= 0.0,
                "The {name} weight must be a finite, non-negative number"
            );
        }
        ensure!(
            self.cost > 0.0 || self.health > 0.0 || self.jobs > 0.0,
            "At least one objective weight must be greater than zero"
        );

        Ok(())
    }

    /// Combine objective components into a single value
    pub fn combine(&self, components: &ObjectiveComponents) -> f64 {
        self.cost * components.cost + self.health * components.health
            - self.jobs * components.jobs
    }
}

/// The components of the objective, summed over all years
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObjectiveComponents {
    /// Coal operating costs plus renewable capital and operating costs
    pub cost: f64,
    /// Health damages from coal generation
    pub health: f64,
    /// Jobs from coal operation, coal retirement and renewable construction and operation
    pub jobs: f64,
}

/// The results of solving the model
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    /// The value of the objective
    pub z: f64,
    /// System cost
    pub cost: f64,
    /// Health damages
    pub health: f64,
    /// Employment
    pub jobs: f64,
    /// The solver backend used
    pub backend: SolverBackend,
    /// Cumulative fraction of each coal unit retired, by unit and year (C×Y)
    pub retired: Array2<f64>,
    /// Cumulative renewable capacity, by site, unit and year (R×C×Y)
    pub capacity: Array3<f64>,
    /// Renewable capacity built in each year, by site, unit and year (R×C×Y)
    pub new_capacity: Array3<f64>,
    /// Whether each site is used to replace each unit (R×C)
    pub site_used: Array2<f64>,
}

/// Perform the optimisation.
///
/// # Arguments
///
/// * `model` - The model, which must already have been validated
/// * `weights` - Weights for the components of the objective
/// * `backend` - The solver backend to use
///
/// # Returns
///
/// The objective value along with the values of the decision variables.
pub fn perform_optimisation(
    model: &RetirementModel,
    weights: &ObjectiveWeights,
    backend: SolverBackend,
) -> Result<Output> {
    // HiGHS only honours the choice of algorithm for continuous problems
    let integer_sites = model.options.integer_site_selection && !backend.relaxes_integrality();
    if model.options.integer_site_selection && !integer_sites {
        warn!(
            "The {backend} backend only solves continuous problems: site selection is relaxed"
        );
    }

    // Set up problem
    let mut problem = Problem::default();
    let variables = add_variables(&mut problem, model, weights, integer_sites);
    add_constraints(&mut problem, &variables, model);
    info!(
        "Solving problem with {} variables and {} constraints using {backend}",
        problem.num_cols(),
        problem.num_rows()
    );

    let mut highs_model = problem.optimise(Sense::Minimise);
    backend.configure(&mut highs_model);
    enable_highs_logging(&mut highs_model);

    let solved = highs_model.solve();
    let solution = match solved.status() {
        HighsModelStatus::Optimal => solved.get_solution(),
        status => bail!("Could not solve: {status:?}"),
    };

    Ok(Output::new(model, weights, backend, &variables, solution.columns()))
}

/// Enable or disable console output from the HiGHS solver
fn enable_highs_logging(model: &mut highs::Model) {
    let enable = !is_logging_disabled();
    model.set_option("log_to_console", enable);
    model.set_option("output_flag", enable);
}

/// Add variables to the optimisation problem.
///
/// The objective coefficients are set here. Terms of the objective which don't depend on any
/// variable are left out; see [`objective_offset`]. Site selection variables are binary if
/// `integer_sites` is set and fractions otherwise.
fn add_variables(
    problem: &mut Problem,
    model: &RetirementModel,
    weights: &ObjectiveWeights,
    integer_sites: bool,
) -> Variables {
    let params = &model.params;
    let n_years = model.years.len();
    let n_sites = model.sites.len();
    let n_units = model.units.len();

    let mut retired = VariableMap::new(problem);
    for c in 0..n_units {
        let coeff = retired_coeff(params, weights, c);
        for y in 0..n_years {
            let bounds = if model.options.retire_all_by_final_year && y == n_years - 1 {
                1.0..=1.0
            } else {
                0.0..=1.0
            };
            retired.add(problem, (c, y), coeff, bounds);
        }
    }

    let mut newly_retired = VariableMap::new(problem);
    for c in 0..n_units {
        let coeff = newly_retired_coeff(params, weights, c);
        for y in 0..n_years {
            newly_retired.add(problem, (c, y), coeff, 0.0..=1.0);
        }
    }

    let mut capacity = VariableMap::new(problem);
    for r in 0..n_sites {
        for c in 0..n_units {
            for y in 0..n_years {
                let coeff = capacity_coeff(params, weights, r, y);
                capacity.add(problem, (r, c, y), coeff, 0.0..=params.max_cap[[r, c]]);
            }
        }
    }

    let mut new_capacity = VariableMap::new(problem);
    for r in 0..n_sites {
        for c in 0..n_units {
            for y in 0..n_years {
                let coeff = new_capacity_coeff(params, weights, r, y);
                new_capacity.add(problem, (r, c, y), coeff, 0.0..=f64::INFINITY);
            }
        }
    }

    let mut site_used = VariableMap::new(problem);
    for r in 0..n_sites {
        for c in 0..n_units {
            if integer_sites {
                site_used.add_integer(problem, (r, c), 0.0, 0.0..=1.0);
            } else {
                site_used.add(problem, (r, c), 0.0, 0.0..=1.0);
            }
        }
    }

    Variables {
        retired,
        newly_retired,
        capacity,
        new_capacity,
        site_used,
    }
}

/// The annual cost of running coal unit `c` at full output
fn coal_running_cost(params: &Params, c: usize) -> f64 {
    params.coal_fopex[c] * params.coal_cap[c] + params.coal_vopex[c] * params.hist_gen[c]
}

/// The annual health damage of running coal unit `c` at full output
fn coal_health_damage(params: &Params, c: usize) -> f64 {
    params.hd[c] * params.hist_gen[c]
}

/// The annual jobs from running coal unit `c`
fn coal_operation_jobs(params: &Params, c: usize) -> f64 {
    params.coal_om_ef[c] * params.coal_cap[c]
}

/// Objective coefficient for the cumulative retired fraction of coal unit `c`.
///
/// Retiring a unit removes its running cost, health damage and operating jobs.
fn retired_coeff(params: &Params, weights: &ObjectiveWeights, c: usize) -> f64 {
    -weights.cost * coal_running_cost(params, c) - weights.health * coal_health_damage(params, c)
        + weights.jobs * coal_operation_jobs(params, c)
}

/// Objective coefficient for the fraction of coal unit `c` retired in a year
fn newly_retired_coeff(params: &Params, weights: &ObjectiveWeights, c: usize) -> f64 {
    -weights.jobs * params.ret_ef[c] * params.coal_cap[c]
}

/// Objective coefficient for renewable capacity at site `r` in year `y`
fn capacity_coeff(params: &Params, weights: &ObjectiveWeights, r: usize, y: usize) -> f64 {
    weights.cost * params.re_fopex[r] - weights.jobs * params.re_om_ef[[r, y]]
}

/// Objective coefficient for renewable capacity built at site `r` in year `y`
fn new_capacity_coeff(params: &Params, weights: &ObjectiveWeights, r: usize, y: usize) -> f64 {
    weights.cost * params.re_capex[r] - weights.jobs * params.con_ef[[r, y]]
}

/// The part of the objective which applies if no coal unit is ever retired.
///
/// Adding this to the solver's objective value gives the full objective.
#[cfg(test)]
fn objective_offset(params: &Params, weights: &ObjectiveWeights, n_years: usize) -> f64 {
    let per_year: f64 = (0..params.hist_gen.len())
        .map(|c| {
            weights.cost * coal_running_cost(params, c)
                + weights.health * coal_health_damage(params, c)
                - weights.jobs * coal_operation_jobs(params, c)
        })
        .sum();

    per_year * n_years as f64
}

/// Evaluate the components of the objective for the given decision variable values.
///
/// # Arguments
///
/// * `params` - Model parameters
/// * `retired` - Cumulative retired fraction by unit and year (C×Y)
/// * `capacity` - Cumulative renewable capacity by site, unit and year (R×C×Y)
/// * `new_capacity` - Renewable capacity built by site, unit and year (R×C×Y)
pub fn evaluate_objective(
    params: &Params,
    retired: &Array2<f64>,
    capacity: &Array3<f64>,
    new_capacity: &Array3<f64>,
) -> ObjectiveComponents {
    let mut components = ObjectiveComponents::default();
    let (n_units, n_years) = retired.dim();

    for c in 0..n_units {
        let mut previous = 0.0;
        for y in 0..n_years {
            let remaining = 1.0 - retired[[c, y]];
            let newly_retired = retired[[c, y]] - previous;
            previous = retired[[c, y]];

            components.cost += coal_running_cost(params, c) * remaining;
            components.health += coal_health_damage(params, c) * remaining;
            components.jobs += coal_operation_jobs(params, c) * remaining
                + params.ret_ef[c] * params.coal_cap[c] * newly_retired;
        }
    }

    for ((r, _, y), cap) in capacity.indexed_iter() {
        components.cost += params.re_fopex[r] * cap;
        components.jobs += params.re_om_ef[[r, y]] * cap;
    }

    for ((r, _, y), new) in new_capacity.indexed_iter() {
        components.cost += params.re_capex[r] * new;
        components.jobs += params.con_ef[[r, y]] * new;
    }

    components
}

impl Output {
    /// Read the results back from the solver's column values
    fn new(
        model: &RetirementModel,
        weights: &ObjectiveWeights,
        backend: SolverBackend,
        variables: &Variables,
        columns: &[f64],
    ) -> Self {
        let n_years = model.years.len();
        let n_sites = model.sites.len();
        let n_units = model.units.len();

        let mut retired = Array2::zeros((n_units, n_years));
        for ((c, y), value) in variables.retired.iter_values(columns) {
            retired[[c, y]] = value;
        }

        let mut capacity = Array3::zeros((n_sites, n_units, n_years));
        for ((r, c, y), value) in variables.capacity.iter_values(columns) {
            capacity[[r, c, y]] = value;
        }

        let mut new_capacity = Array3::zeros((n_sites, n_units, n_years));
        for ((r, c, y), value) in variables.new_capacity.iter_values(columns) {
            new_capacity[[r, c, y]] = value;
        }

        let mut site_used = Array2::zeros((n_sites, n_units));
        for ((r, c), value) in variables.site_used.iter_values(columns) {
            site_used[[r, c]] = value;
        }

        let components = evaluate_objective(&model.params, &retired, &capacity, &new_capacity);
        Self {
            z: weights.combine(&components),
            cost: components.cost,
            health: components.health,
            jobs: components.jobs,
            backend,
            retired,
            capacity,
            new_capacity,
            site_used,
        }
    }

    /// Coal generation of unit `c` in year `y`
    pub fn coal_generation(&self, params: &Params, c: usize, y: usize) -> f64 {
        params.hist_gen[c] * (1.0 - self.retired[[c, y]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, model};
    use crate::model::FormulationOptions;
    use crate::plant::PlantCode;
    use crate::site::SiteID;
    use crate::units::HOURS_PER_YEAR;
    use float_cmp::assert_approx_eq;
    use ndarray::{Array, Array1, array};
    use rstest::{fixture, rstest};

    /// One coal unit which must be replaced within a year, using at most one of two sites.
    ///
    /// Neither site has room for the whole replacement, so the problem is only feasible if site
    /// selection is relaxed.
    #[fixture]
    fn split_site_model() -> RetirementModel {
        RetirementModel {
            years: vec![2030],
            sites: ["a", "b"].into_iter().map(SiteID::from).collect(),
            units: ["1"].into_iter().map(PlantCode::from).collect(),
            params: Params {
                hist_gen: array![HOURS_PER_YEAR],
                coal_cap: array![1.0],
                cf: array![1.0, 1.0],
                re_capex: array![100.0, 100.0],
                re_fopex: array![10.0, 10.0],
                coal_vopex: array![1.0],
                coal_fopex: array![1.0],
                max_cap: Array2::from_elem((2, 1), 2.0),
                site_max_cap: array![0.6, 0.6],
                max_sites: array![1.0],
                hd: Array1::zeros(1),
                ret_ef: Array1::zeros(1),
                con_ef: Array2::zeros((2, 1)),
                coal_om_ef: Array1::zeros(1),
                re_om_ef: Array2::zeros((2, 1)),
            },
            options: FormulationOptions::default(),
        }
    }

    #[rstest]
    #[case(ObjectiveWeights::new(1.0, 0.0, 0.0))]
    #[case(ObjectiveWeights::new(0.0, 0.0, 2.0))]
    fn test_weights_validate_ok(#[case] weights: ObjectiveWeights) {
        assert!(weights.validate().is_ok());
    }

    #[rstest]
    #[case(
        ObjectiveWeights::new(0.0, 0.0, 0.0),
        "At least one objective weight must be greater than zero"
    )]
    #[case(
        ObjectiveWeights::new(-1.0, 1.0, 0.0),
        "The cost weight must be a finite, non-negative number"
    )]
    #[case(
        ObjectiveWeights::new(1.0, f64::NAN, 0.0),
        "The health weight must be a finite, non-negative number"
    )]
    fn test_weights_validate_invalid(#[case] weights: ObjectiveWeights, #[case] msg: &str) {
        assert_error!(weights.validate(), msg);
    }

    #[test]
    fn test_combine() {
        let components = ObjectiveComponents {
            cost: 10.0,
            health: 5.0,
            jobs: 2.0,
        };
        assert_eq!(ObjectiveWeights::new(1.0, 0.0, 0.0).combine(&components), 10.0);
        assert_eq!(ObjectiveWeights::new(1.0, 2.0, 3.0).combine(&components), 14.0);
    }

    /// The solver's objective (offset plus coefficients times values) must match the evaluated
    /// components for any values of the variables
    #[rstest]
    fn test_coefficients_match_evaluation(model: RetirementModel) {
        let params = &model.params;
        let weights = ObjectiveWeights::new(1.0, 0.5, 2.0);
        let (n_sites, n_units, n_years) = (3, 2, 2);

        let retired = Array::from_shape_vec((n_units, n_years), vec![0.25, 0.5, 0.0, 1.0]).unwrap();
        let capacity =
            Array::from_shape_fn((n_sites, n_units, n_years), |(r, c, y)| (r + c + y) as f64);
        let new_capacity =
            Array::from_shape_fn((n_sites, n_units, n_years), |(r, c, y)| (r * c + y) as f64);

        let mut expected = objective_offset(params, &weights, n_years);
        for ((c, y), value) in retired.indexed_iter() {
            let previous = if y == 0 { 0.0 } else { retired[[c, y - 1]] };
            expected += retired_coeff(params, &weights, c) * value;
            expected += newly_retired_coeff(params, &weights, c) * (value - previous);
        }
        for ((r, _, y), value) in capacity.indexed_iter() {
            expected += capacity_coeff(params, &weights, r, y) * value;
        }
        for ((r, _, y), value) in new_capacity.indexed_iter() {
            expected += new_capacity_coeff(params, &weights, r, y) * value;
        }

        let components = evaluate_objective(params, &retired, &capacity, &new_capacity);
        assert_approx_eq!(f64, weights.combine(&components), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_evaluate_objective_no_retirement() {
        let model = RetirementModel::smoke_test();
        let n_years = model.years.len();
        let n_sites = model.sites.len();
        let n_units = model.units.len();
        let retired = Array2::zeros((n_units, n_years));
        let capacity = Array3::zeros((n_sites, n_units, n_years));

        let components = evaluate_objective(&model.params, &retired, &capacity, &capacity);

        // Each unit costs 1 * 1 + 1 * 8760 a year
        assert_approx_eq!(
            f64,
            components.cost,
            (1.0 + HOURS_PER_YEAR) * (n_units * n_years) as f64
        );
        assert_eq!(components.health, 0.0);
        assert_eq!(components.jobs, 0.0);
    }

    #[rstest]
    fn test_perform_optimisation(model: RetirementModel) {
        let weights = ObjectiveWeights::default();
        let output = perform_optimisation(&model, &weights, SolverBackend::Highs).unwrap();
        let params = &model.params;

        // Every unit is retired by the final year
        for c in 0..model.units.len() {
            assert_approx_eq!(f64, output.retired[[c, 1]], 1.0, epsilon = 1e-6);
        }

        // Replacement generation covers retired generation
        for c in 0..model.units.len() {
            for y in 0..model.years.len() {
                let replacement: f64 = (0..model.sites.len())
                    .map(|r| HOURS_PER_YEAR * params.cf[r] * output.capacity[[r, c, y]])
                    .sum();
                assert!(replacement + 1e-6 >= params.hist_gen[c] * output.retired[[c, y]]);
            }
        }

        assert_approx_eq!(f64, output.z, output.cost, epsilon = 1e-6);
        assert_eq!(output.backend, SolverBackend::Highs);
    }

    #[rstest]
    fn test_perform_optimisation_infeasible(mut model: RetirementModel) {
        // No renewable capacity can be built anywhere
        model.params.max_cap.fill(0.0);
        let weights = ObjectiveWeights::default();
        assert!(
            perform_optimisation(&model, &weights, SolverBackend::Highs)
                .unwrap_err()
                .to_string()
                .starts_with("Could not solve")
        );
    }

    #[rstest]
    fn test_perform_optimisation_integer_sites(split_site_model: RetirementModel) {
        let weights = ObjectiveWeights::default();
        assert!(
            perform_optimisation(&split_site_model, &weights, SolverBackend::Highs)
                .unwrap_err()
                .to_string()
                .starts_with("Could not solve")
        );
    }

    #[rstest]
    #[case(SolverBackend::HighsSimplex)]
    #[case(SolverBackend::HighsIpm)]
    fn test_perform_optimisation_relaxed_sites(
        split_site_model: RetirementModel,
        #[case] backend: SolverBackend,
    ) {
        let weights = ObjectiveWeights::default();
        let output = perform_optimisation(&split_site_model, &weights, backend).unwrap();
        assert_eq!(output.backend, backend);

        // Both sites carry part of the replacement, so both are partly used
        let used = output.site_used.column(0);
        assert!(used.sum() <= 1.0 + 1e-6);
        for r in 0..2 {
            assert!(output.capacity[[r, 0, 0]] >= 0.4 - 1e-6);
            assert!(used[r] > 0.1 && used[r] < 0.9);
        }
    }
}
