//! The module responsible for writing output data to disk.
use crate::model::RetirementModel;
use crate::optimisation::{Output, SolverBackend};
use crate::plant::PlantCode;
use crate::site::SiteID;
use crate::units::{Capacity, Dimensionless, annual_generation};
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The output file name for the objective value and its components
const OBJECTIVE_FILE_NAME: &str = "objective.csv";

/// The output file name for coal retirement
const COAL_RETIREMENT_FILE_NAME: &str = "coal_retirement.csv";

/// The output file name for renewable capacity
const RENEWABLE_CAPACITY_FILE_NAME: &str = "renewable_capacity.csv";

/// The output file name for site selection
const SITE_SELECTION_FILE_NAME: &str = "site_selection.csv";

/// The output file name for parameter dimensions
const DIMENSIONS_FILE_NAME: &str = "debug_dimensions.csv";

/// Capacities smaller than this are not written to file
const CAPACITY_TOLERANCE: f64 = 1e-9;

/// Get the default output directory under `output_root` for the model specified at `model_dir`
pub fn get_output_dir(output_root: &Path, model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    Ok(get_named_output_dir(output_root, model_name))
}

/// Get the default output directory under `output_root` for a model with the given name
pub fn get_named_output_dir(output_root: &Path, name: &str) -> PathBuf {
    output_root.join(name)
}

/// Create a new output directory.
///
/// If the directory already exists and is not empty, its contents are only deleted if
/// `allow_overwrite` is true.
///
/// # Returns
///
/// Whether an existing directory was overwritten.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir).context("Could not delete folder")?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the objective CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ObjectiveRow {
    backend: SolverBackend,
    z: f64,
    cost: f64,
    health: f64,
    jobs: f64,
}

/// Represents a row in the coal retirement CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct CoalRetirementRow {
    plant_code: PlantCode,
    year: u32,
    retired_fraction: f64,
    coal_generation: f64,
}

/// Represents a row in the renewable capacity CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct RenewableCapacityRow {
    site_id: SiteID,
    plant_code: PlantCode,
    year: u32,
    capacity: f64,
    new_capacity: f64,
    generation: f64,
}

/// Represents a row in the site selection CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct SiteSelectionRow {
    site_id: SiteID,
    plant_code: PlantCode,
    used: f64,
}

/// Represents a row in the dimensions CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct DimensionRow {
    parameter: String,
    shape: String,
}

/// An object for writing results to file
pub struct DataWriter {
    objective_writer: csv::Writer<File>,
    retirement_writer: csv::Writer<File>,
    capacity_writer: csv::Writer<File>,
    site_selection_writer: csv::Writer<File>,
    dimensions_writer: Option<csv::Writer<File>>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `save_debug_info` - Whether to include extra CSV files for debugging model
    pub fn create(output_path: &Path, save_debug_info: bool) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        let dimensions_writer = if save_debug_info {
            Some(new_writer(DIMENSIONS_FILE_NAME)?)
        } else {
            None
        };

        Ok(Self {
            objective_writer: new_writer(OBJECTIVE_FILE_NAME)?,
            retirement_writer: new_writer(COAL_RETIREMENT_FILE_NAME)?,
            capacity_writer: new_writer(RENEWABLE_CAPACITY_FILE_NAME)?,
            site_selection_writer: new_writer(SITE_SELECTION_FILE_NAME)?,
            dimensions_writer,
        })
    }

    /// Write the objective value and its components
    pub fn write_objective(&mut self, output: &Output) -> Result<()> {
        self.objective_writer.serialize(ObjectiveRow {
            backend: output.backend,
            z: output.z,
            cost: output.cost,
            health: output.health,
            jobs: output.jobs,
        })?;

        Ok(())
    }

    /// Write the retired fraction and remaining generation of each coal unit in each year
    pub fn write_retirement(&mut self, model: &RetirementModel, output: &Output) -> Result<()> {
        for (c, plant_code) in model.units.iter().enumerate() {
            for (y, year) in model.years.iter().enumerate() {
                let row = CoalRetirementRow {
                    plant_code: plant_code.clone(),
                    year: *year,
                    retired_fraction: output.retired[[c, y]],
                    coal_generation: output.coal_generation(&model.params, c, y),
                };
                self.retirement_writer.serialize(row)?;
            }
        }

        Ok(())
    }

    /// Write renewable capacity replacing each coal unit.
    ///
    /// Only rows with non-zero capacity are written.
    pub fn write_capacity(&mut self, model: &RetirementModel, output: &Output) -> Result<()> {
        for ((r, c, y), capacity) in output.capacity.indexed_iter() {
            let new_capacity = output.new_capacity[[r, c, y]];
            if capacity.abs() < CAPACITY_TOLERANCE && new_capacity.abs() < CAPACITY_TOLERANCE {
                continue;
            }

            let generation =
                annual_generation(Capacity(*capacity), Dimensionless(model.params.cf[r]));
            let row = RenewableCapacityRow {
                site_id: model.sites[r].clone(),
                plant_code: model.units[c].clone(),
                year: model.years[y],
                capacity: *capacity,
                new_capacity,
                generation: generation.value(),
            };
            self.capacity_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write how far each site is used to replace each coal unit.
    ///
    /// This is 0 or 1 unless site selection was relaxed.
    pub fn write_site_selection(
        &mut self,
        model: &RetirementModel,
        output: &Output,
    ) -> Result<()> {
        for ((r, c), used) in output.site_used.indexed_iter() {
            self.site_selection_writer.serialize(SiteSelectionRow {
                site_id: model.sites[r].clone(),
                plant_code: model.units[c].clone(),
                used: *used,
            })?;
        }

        Ok(())
    }

    /// Write the shape of each index set and parameter, if debug info is enabled
    pub fn write_dimensions(&mut self, model: &RetirementModel) -> Result<()> {
        let Some(wtr) = &mut self.dimensions_writer else {
            return Ok(());
        };

        for (name, shape) in model.dimensions() {
            wtr.serialize(DimensionRow {
                parameter: name.into(),
                shape: shape.to_string(),
            })?;
        }

        Ok(())
    }

    /// Write all results for a solved model
    pub fn write_all(&mut self, model: &RetirementModel, output: &Output) -> Result<()> {
        self.write_dimensions(model)?;
        self.write_objective(output)?;
        self.write_retirement(model, output)?;
        self.write_capacity(model, output)?;
        self.write_site_selection(model, output)?;
        self.flush()
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.objective_writer.flush()?;
        self.retirement_writer.flush()?;
        self.capacity_writer.flush()?;
        self.site_selection_writer.flush()?;
        if let Some(wtr) = &mut self.dimensions_writer {
            wtr.flush()?;
        }

        Ok(())
    }
}
