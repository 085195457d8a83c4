//! Code for adding constraints to the retirement optimisation problem.
use super::Variables;
use crate::model::RetirementModel;
use crate::units::HOURS_PER_YEAR;
use highs::RowProblem as Problem;

/// Add all constraints to the problem.
///
/// # Arguments:
///
/// * `problem` - The optimisation problem
/// * `variables` - The variables in the problem
/// * `model` - The model
pub fn add_constraints(problem: &mut Problem, variables: &Variables, model: &RetirementModel) {
    add_retirement_accounting_constraints(problem, variables, model);
    add_capacity_accounting_constraints(problem, variables, model);
    add_replacement_constraints(problem, variables, model);
    add_site_capacity_constraints(problem, variables, model);
    add_site_usage_constraints(problem, variables, model);
    add_site_count_constraints(problem, variables, model);
}

/// Link cumulative retirement to retirement in each year.
///
/// As the fraction retired in a year cannot be negative, retirement is irreversible.
fn add_retirement_accounting_constraints(
    problem: &mut Problem,
    variables: &Variables,
    model: &RetirementModel,
) {
    for c in 0..model.units.len() {
        for y in 0..model.years.len() {
            let retired = variables.retired.get((c, y));
            let newly_retired = variables.newly_retired.get((c, y));
            if y == 0 {
                problem.add_row(0.0..=0.0, [(retired, 1.0), (newly_retired, -1.0)]);
            } else {
                let previous = variables.retired.get((c, y - 1));
                problem.add_row(
                    0.0..=0.0,
                    [(retired, 1.0), (previous, -1.0), (newly_retired, -1.0)],
                );
            }
        }
    }
}

/// Link cumulative renewable capacity to capacity built in each year.
///
/// Capacity is never decommissioned.
fn add_capacity_accounting_constraints(
    problem: &mut Problem,
    variables: &Variables,
    model: &RetirementModel,
) {
    for r in 0..model.sites.len() {
        for c in 0..model.units.len() {
            for y in 0..model.years.len() {
                let capacity = variables.capacity.get((r, c, y));
                let new_capacity = variables.new_capacity.get((r, c, y));
                if y == 0 {
                    problem.add_row(0.0..=0.0, [(capacity, 1.0), (new_capacity, -1.0)]);
                } else {
                    let previous = variables.capacity.get((r, c, y - 1));
                    problem.add_row(
                        0.0..=0.0,
                        [(capacity, 1.0), (previous, -1.0), (new_capacity, -1.0)],
                    );
                }
            }
        }
    }
}

/// Renewable generation replacing a coal unit must cover the generation it has lost
fn add_replacement_constraints(
    problem: &mut Problem,
    variables: &Variables,
    model: &RetirementModel,
) {
    let params = &model.params;
    for c in 0..model.units.len() {
        for y in 0..model.years.len() {
            let replacement = (0..model.sites.len()).map(|r| {
                let capacity = variables.capacity.get((r, c, y));
                (capacity, HOURS_PER_YEAR * params.cf[r])
            });
            let retired = variables.retired.get((c, y));
            let terms: Vec<_> = replacement
                .chain([(retired, -params.hist_gen[c])])
                .collect();

            problem.add_row(0.0.., terms);
        }
    }
}

/// Total capacity at a site cannot exceed its limit
fn add_site_capacity_constraints(
    problem: &mut Problem,
    variables: &Variables,
    model: &RetirementModel,
) {
    for r in 0..model.sites.len() {
        for y in 0..model.years.len() {
            let terms: Vec<_> = (0..model.units.len())
                .map(|c| (variables.capacity.get((r, c, y)), 1.0))
                .collect();

            problem.add_row(..=model.params.site_max_cap[r], terms);
        }
    }
}

/// Capacity can only be built at a site if the site is used for that coal unit
fn add_site_usage_constraints(
    problem: &mut Problem,
    variables: &Variables,
    model: &RetirementModel,
) {
    for r in 0..model.sites.len() {
        for c in 0..model.units.len() {
            let site_used = variables.site_used.get((r, c));
            for y in 0..model.years.len() {
                let capacity = variables.capacity.get((r, c, y));
                problem.add_row(
                    ..=0.0,
                    [(capacity, 1.0), (site_used, -model.params.max_cap[[r, c]])],
                );
            }
        }
    }
}

/// Limit the number of sites used to replace each coal unit
fn add_site_count_constraints(
    problem: &mut Problem,
    variables: &Variables,
    model: &RetirementModel,
) {
    for c in 0..model.units.len() {
        let terms: Vec<_> = (0..model.sites.len())
            .map(|r| (variables.site_used.get((r, c)), 1.0))
            .collect();

        problem.add_row(..=model.params.max_sites[c], terms);
    }
}
