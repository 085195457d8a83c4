//! Common routines for handling input data.
use crate::model::RetirementModel;
use crate::model::parameters::ModelParameters;
use crate::model::params::Params;
use crate::plant::drop_incomplete;
use anyhow::{Context, Result, ensure};
use indexmap::IndexSet;
use itertools::Itertools;
use log::info;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fs;
use std::path::Path;

pub mod coal;
use coal::{get_coal_plants, get_marginal_health_costs, get_plant_generation};
pub mod renewable;
use renewable::get_annual_cf;

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    let vec = read_csv_as_vec(file_path)?;
    ensure!(
        !vec.is_empty(),
        "{}: CSV file cannot be empty",
        file_path.display()
    );

    Ok(vec.into_iter())
}

/// Read a CSV file into a [`Vec`], wrapping any errors with the file path
fn read_csv_as_vec<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .and_then(|mut reader| reader.deserialize().try_collect())
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read an f64, checking that it is between 0 and 1
pub fn deserialise_proportion<'de, D, T>(deserialiser: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<f64>,
{
    let value: f64 = Deserialize::deserialize(deserialiser)?;
    if !(0.0..=1.0).contains(&value) {
        Err(serde::de::Error::custom("Value is not between 0 and 1"))?;
    }

    Ok(value.into())
}

/// Check that a value is finite and not negative
pub fn check_non_negative(value: f64, name: &str) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "{name} must be a finite, non-negative number (got {value})"
    );

    Ok(())
}

/// Load a model from the specified directory.
///
/// This reads the scenario parameters, the coal plant data and the renewable sites and assembles
/// them into a checked [`RetirementModel`].
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The model and the parameters it was built from
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<(RetirementModel, ModelParameters)> {
    let model_dir = model_dir.as_ref();
    let parameters = ModelParameters::from_path(model_dir)?;

    // Coal plants
    let mut plants = get_coal_plants(model_dir, &parameters.states)?;
    let codes: IndexSet<_> = plants.keys().cloned().collect();
    let generation = get_plant_generation(model_dir, &codes)?;
    let health_damages = get_marginal_health_costs(model_dir, &codes)?;
    for (code, plant) in &mut plants {
        plant.generation = generation[code];
        plant.health_damage = health_damages[code];
    }
    let units = drop_incomplete(plants);
    ensure!(
        !units.is_empty(),
        "No coal plants with complete data found for the selected states"
    );
    info!("{} coal units with complete data", units.len());

    // Renewables
    let sites = get_annual_cf(model_dir)?;
    info!("{} candidate renewable sites", sites.len());

    let years = parameters.years();
    let params = Params::from_inputs(&units, &sites, years.len(), &parameters);
    let model = RetirementModel {
        years,
        sites: sites.into_keys().collect(),
        units: units.into_keys().collect(),
        params,
        options: parameters.formulation_options(),
    };

    Ok((model, parameters))
}
