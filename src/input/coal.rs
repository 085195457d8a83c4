//! Code for reading coal plant data from CSV files.
use super::{check_non_negative, input_err_msg, read_csv};
use crate::plant::{CoalPlant, CoalPlantMap, PlantCode, StateCode};
use crate::units::{Capacity, Energy, MoneyPerEnergy};
use anyhow::{Context, Result, ensure};
use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const COAL_PLANTS_FILE_NAME: &str = "coal_plants.csv";
const PLANT_GENERATION_FILE_NAME: &str = "plant_generation.csv";
const HEALTH_DAMAGES_FILE_NAME: &str = "health_damages.csv";

#[derive(Deserialize, PartialEq, Debug)]
struct CoalPlantRaw {
    plant_code: String,
    state: String,
    coal_capacity: Capacity,
}

#[derive(Deserialize, PartialEq, Debug)]
struct PlantGenerationRaw {
    plant_code: String,
    generation: Option<Energy>,
}

#[derive(Deserialize, PartialEq, Debug)]
struct HealthDamageRaw {
    plant_code: String,
    health_damage: Option<MoneyPerEnergy>,
}

/// Read the coal plant registry, keeping only plants in the given states.
///
/// Generation and health damage data are left empty; see [`get_plant_generation`] and
/// [`get_marginal_health_costs`].
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `states` - The states to include. If empty, plants in all states are included.
pub fn get_coal_plants(model_dir: &Path, states: &[StateCode]) -> Result<CoalPlantMap> {
    let file_path = model_dir.join(COAL_PLANTS_FILE_NAME);
    let plants_csv = read_csv(&file_path)?;
    read_coal_plants_from_iter(plants_csv, states).with_context(|| input_err_msg(&file_path))
}

fn read_coal_plants_from_iter<I>(iter: I, states: &[StateCode]) -> Result<CoalPlantMap>
where
    I: Iterator<Item = CoalPlantRaw>,
{
    let states: HashSet<&str> = states.iter().map(|state| state.0.as_ref()).collect();
    let mut plants = CoalPlantMap::new();
    let mut seen = HashSet::new();
    for plant in iter {
        ensure!(
            plant.coal_capacity.is_finite() && plant.coal_capacity > Capacity(0.0),
            "Coal capacity for plant {} must be a finite, positive number",
            plant.plant_code
        );

        let code = PlantCode::from(plant.plant_code);
        ensure!(
            seen.insert(code.clone()),
            "Duplicate entry for plant {code}"
        );

        if !states.is_empty() && !states.contains(plant.state.as_str()) {
            continue;
        }

        let plant = CoalPlant {
            code: code.clone(),
            state: plant.state.into(),
            capacity: plant.coal_capacity,
            generation: None,
            health_damage: None,
        };
        plants.insert(code, plant);
    }

    ensure!(!plants.is_empty(), "No coal plants found in selected states");

    Ok(plants)
}

/// Read historical annual generation for the given plants.
///
/// Every code in `codes` appears in the returned map. Plants without generation data map to
/// `None`.
pub fn get_plant_generation(
    model_dir: &Path,
    codes: &IndexSet<PlantCode>,
) -> Result<IndexMap<PlantCode, Option<Energy>>> {
    let file_path = model_dir.join(PLANT_GENERATION_FILE_NAME);
    let generation_csv = read_csv::<PlantGenerationRaw>(&file_path)?;
    align_to_plants(
        generation_csv.map(|row| (row.plant_code, row.generation)),
        codes,
        |generation: Energy| check_non_negative(generation.value(), "Generation"),
    )
    .with_context(|| input_err_msg(&file_path))
}

/// Read marginal health damages for the given plants.
///
/// Every code in `codes` appears in the returned map. Plants without health damage data map to
/// `None`.
pub fn get_marginal_health_costs(
    model_dir: &Path,
    codes: &IndexSet<PlantCode>,
) -> Result<IndexMap<PlantCode, Option<MoneyPerEnergy>>> {
    let file_path = model_dir.join(HEALTH_DAMAGES_FILE_NAME);
    let damages_csv = read_csv::<HealthDamageRaw>(&file_path)?;
    align_to_plants(
        damages_csv.map(|row| (row.plant_code, row.health_damage)),
        codes,
        |damage: MoneyPerEnergy| check_non_negative(damage.value(), "Health damage"),
    )
    .with_context(|| input_err_msg(&file_path))
}

/// Match per-plant values up with the registry's plant codes.
///
/// Values for plants which are not in `codes` are ignored.
fn align_to_plants<T, I, F>(
    iter: I,
    codes: &IndexSet<PlantCode>,
    check_value: F,
) -> Result<IndexMap<PlantCode, Option<T>>>
where
    T: Copy,
    I: Iterator<Item = (String, Option<T>)>,
    F: Fn(T) -> Result<()>,
{
    let mut values: IndexMap<PlantCode, Option<T>> =
        codes.iter().map(|code| (code.clone(), None)).collect();
    let mut seen = HashSet::new();
    for (code, value) in iter {
        ensure!(seen.insert(code.clone()), "Duplicate entry for plant {code}");

        let Some(entry) = values.get_mut(code.as_str()) else {
            debug!("Ignoring data for plant {code}, which is not in the registry");
            continue;
        };

        if let Some(value) = value {
            check_value(value).with_context(|| format!("Invalid value for plant {code}"))?;
        }
        *entry = value;
    }

    Ok(values)
}
