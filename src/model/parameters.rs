//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use super::FormulationOptions;
use crate::input::{check_non_negative, input_err_msg, read_toml};
use crate::optimisation::{ObjectiveWeights, SolverBackend};
use crate::plant::StateCode;
use crate::units::{Capacity, JobsPerCapacity, MoneyPerCapacityPerYear, MoneyPerEnergy};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::from($value)
        }
    };
}

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_start_year, u32, 2020);
define_param_default!(default_num_years, u32, 10);
define_param_default!(default_true, bool, true);
define_unit_param_default!(default_coal_variable_cost, MoneyPerEnergy, 4.0 + 11.0 * 2.2);
define_unit_param_default!(default_coal_fixed_cost, MoneyPerCapacityPerYear, 40.0);
define_unit_param_default!(default_max_capacity, Capacity, 1e3);
define_unit_param_default!(default_site_max_capacity, Capacity, 1e3);
define_param_default!(default_max_sites, u32, 10);
define_unit_param_default!(default_retirement_ef, JobsPerCapacity, 0.25);
define_unit_param_default!(default_construction_ef, JobsPerCapacity, 0.25);
define_unit_param_default!(default_coal_operation_ef, JobsPerCapacity, 1.0);
define_unit_param_default!(default_renewable_operation_ef, JobsPerCapacity, 0.25);

/// The states whose coal plants are considered by default
fn default_states() -> Vec<StateCode> {
    [
        "NY", "PA", "OH", "WV", "KY", "TN", "VA", "MD", "DE", "NC", "NJ",
    ]
    .into_iter()
    .map(StateCode::from)
    .collect()
}

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// The first year of the planning horizon
    #[serde(default = "default_start_year")]
    pub start_year: u32,
    /// The number of years in the planning horizon
    #[serde(default = "default_num_years")]
    pub num_years: u32,
    /// The states whose coal plants are included. An empty list means all states.
    #[serde(default = "default_states")]
    pub states: Vec<StateCode>,
    /// Whether all coal units must be retired by the final year
    #[serde(default = "default_true")]
    pub retire_all_by_final_year: bool,
    /// Whether site selection is binary (otherwise it is relaxed to a fraction)
    #[serde(default = "default_true")]
    pub integer_site_selection: bool,
    /// Weights for the components of the objective
    #[serde(default)]
    pub objective: ObjectiveWeights,
    /// Solver settings
    #[serde(default)]
    pub solver: SolverSettings,
    /// Operating costs applied to every coal unit
    #[serde(default)]
    pub coal: CoalCosts,
    /// Limits on renewable buildout
    #[serde(default)]
    pub limits: SiteLimits,
    /// Employment factors
    #[serde(default)]
    pub employment: EmploymentFactors,
}

/// Solver settings
#[derive(Debug, Deserialize, PartialEq, Default)]
pub struct SolverSettings {
    /// The solver backend to use
    #[serde(default)]
    pub backend: SolverBackend,
}

/// Operating costs applied to every coal unit
#[derive(Debug, Deserialize, PartialEq)]
pub struct CoalCosts {
    /// Variable operating cost per unit of generation
    #[serde(default = "default_coal_variable_cost")]
    pub variable_operating_cost: MoneyPerEnergy,
    /// Fixed operating cost per unit of capacity
    #[serde(default = "default_coal_fixed_cost")]
    pub fixed_operating_cost: MoneyPerCapacityPerYear,
}

impl Default for CoalCosts {
    fn default() -> Self {
        Self {
            variable_operating_cost: default_coal_variable_cost(),
            fixed_operating_cost: default_coal_fixed_cost(),
        }
    }
}

/// Limits on renewable buildout
#[derive(Debug, Deserialize, PartialEq)]
pub struct SiteLimits {
    /// Maximum capacity at any one site which can replace a given coal unit
    #[serde(default = "default_max_capacity")]
    pub max_capacity: Capacity,
    /// Maximum capacity at a site, unless the site specifies its own
    #[serde(default = "default_site_max_capacity")]
    pub site_max_capacity: Capacity,
    /// Maximum number of sites which can be used to replace a coal unit
    #[serde(default = "default_max_sites")]
    pub max_sites: u32,
}

impl Default for SiteLimits {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            site_max_capacity: default_site_max_capacity(),
            max_sites: default_max_sites(),
        }
    }
}

/// Employment factors, in jobs per MW
#[derive(Debug, Deserialize, PartialEq)]
pub struct EmploymentFactors {
    /// Jobs from decommissioning retired coal capacity
    #[serde(default = "default_retirement_ef")]
    pub retirement: JobsPerCapacity,
    /// Jobs from building new renewable capacity
    #[serde(default = "default_construction_ef")]
    pub construction: JobsPerCapacity,
    /// Jobs from operating coal capacity
    #[serde(default = "default_coal_operation_ef")]
    pub coal_operation: JobsPerCapacity,
    /// Jobs from operating renewable capacity
    #[serde(default = "default_renewable_operation_ef")]
    pub renewable_operation: JobsPerCapacity,
}

impl Default for EmploymentFactors {
    fn default() -> Self {
        Self {
            retirement: default_retirement_ef(),
            construction: default_construction_ef(),
            coal_operation: default_coal_operation_ef(),
            renewable_operation: default_renewable_operation_ef(),
        }
    }
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        ensure!(self.num_years > 0, "num_years cannot be zero");
        ensure!(
            self.start_year.checked_add(self.num_years).is_some(),
            "start_year + num_years is too large"
        );
        self.objective.validate()?;

        for (name, value) in [
            (
                "coal.variable_operating_cost",
                self.coal.variable_operating_cost.value(),
            ),
            (
                "coal.fixed_operating_cost",
                self.coal.fixed_operating_cost.value(),
            ),
            ("limits.max_capacity", self.limits.max_capacity.value()),
            (
                "limits.site_max_capacity",
                self.limits.site_max_capacity.value(),
            ),
            ("employment.retirement", self.employment.retirement.value()),
            ("employment.construction", self.employment.construction.value()),
            (
                "employment.coal_operation",
                self.employment.coal_operation.value(),
            ),
            (
                "employment.renewable_operation",
                self.employment.renewable_operation.value(),
            ),
        ] {
            check_non_negative(value, name)?;
        }

        Ok(())
    }

    /// The years in the planning horizon
    pub fn years(&self) -> Vec<u32> {
        (self.start_year..self.start_year + self.num_years).collect()
    }

    /// Options controlling the shape of the optimisation problem
    pub fn formulation_options(&self) -> FormulationOptions {
        FormulationOptions {
            retire_all_by_final_year: self.retire_all_by_final_year,
            integer_site_selection: self.integer_site_selection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;
    use std::fs;
    use tempfile::tempdir;

    fn parameters_from_str(contents: &str) -> Result<ModelParameters> {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MODEL_PARAMETERS_FILE_NAME), contents).unwrap();
        ModelParameters::from_path(dir.path())
    }

    #[test]
    fn test_model_parameters_defaults() {
        let params = parameters_from_str("").unwrap();
        assert_eq!(params.years(), (2020..2030).collect::<Vec<_>>());
        assert_eq!(params.states.len(), 11);
        assert!(params.retire_all_by_final_year);
        assert!(params.integer_site_selection);
        assert_eq!(params.objective, ObjectiveWeights::default());
        assert_eq!(params.solver.backend, SolverBackend::Highs);
        assert_approx_eq!(f64, params.coal.variable_operating_cost.value(), 28.2);
        assert_eq!(params.coal.fixed_operating_cost.value(), 40.0);
        assert_eq!(params.limits.max_sites, 10);
        assert_eq!(params.employment.coal_operation.value(), 1.0);
    }

    #[test]
    fn test_model_parameters_from_path() {
        let params = parameters_from_str(
            "start_year = 2025\n\
             num_years = 3\n\
             states = [\"PA\"]\n\
             integer_site_selection = false\n\
             [objective]\n\
             cost = 1.0\n\
             health = 2.0\n\
             [solver]\n\
             backend = \"highs-simplex\"\n\
             [limits]\n\
             max_sites = 2\n",
        )
        .unwrap();

        assert_eq!(params.years(), vec![2025, 2026, 2027]);
        assert_eq!(params.states, vec![StateCode::from("PA")]);
        assert!(!params.integer_site_selection);
        assert_eq!(params.objective.health, 2.0);
        assert_eq!(params.objective.jobs, 0.0);
        assert_eq!(params.solver.backend, SolverBackend::HighsSimplex);
        assert_eq!(params.limits.max_sites, 2);
        assert_eq!(params.limits.max_capacity, Capacity(1e3));
    }

    #[rstest]
    #[case("num_years = 0", "num_years cannot be zero")]
    #[case(
        "[objective]\ncost = 0.0",
        "At least one objective weight must be greater than zero"
    )]
    #[case(
        "[coal]\nfixed_operating_cost = -1.0",
        "coal.fixed_operating_cost must be a finite, non-negative number (got -1)"
    )]
    fn test_model_parameters_invalid(#[case] contents: &str, #[case] msg: &str) {
        let err = parameters_from_str(contents).unwrap_err();
        assert_eq!(err.root_cause().to_string(), msg);
    }

    #[test]
    fn test_model_parameters_unknown_backend() {
        assert!(parameters_from_str("[solver]\nbackend = \"cplex\"").is_err());
    }
}
