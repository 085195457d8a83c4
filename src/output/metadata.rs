//! Code for writing metadata about a run to file
use crate::optimisation::{ObjectiveWeights, SolverBackend};
use anyhow::{Context, Result};
use chrono::prelude::*;
use platform_info::{PlatformInfo, PlatformInfoAPI, UNameAPI};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The output file name for metadata
const METADATA_FILE_NAME: &str = "metadata.toml";

/// Information about the program build via `built` crate
mod built_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Get information about program version from git
fn get_git_hash() -> String {
    let Some(hash) = built_info::GIT_COMMIT_HASH_SHORT else {
        return "unknown".into();
    };

    if built_info::GIT_DIRTY == Some(true) {
        format!("{hash}-dirty")
    } else {
        hash.into()
    }
}

#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    objective: WeightsMetadata,
    program: ProgramMetadata<'a>,
    platform: PlatformMetadata,
}

/// Information about the model run
#[derive(Serialize)]
struct RunMetadata<'a> {
    /// Path to the model which was run, or "smoke test" for the built-in model
    model: String,
    /// The solver backend used
    backend: &'a str,
    /// The date and time on which the run started
    datetime: String,
}

impl<'a> RunMetadata<'a> {
    fn new(model_path: Option<&Path>, backend: &'a str) -> Self {
        let dt = Local::now();
        Self {
            model: model_path.map_or_else(
                || "smoke test".into(),
                |path| path.to_string_lossy().into(),
            ),
            backend,
            datetime: dt.to_rfc2822(),
        }
    }
}

/// The objective weights used for the run
#[derive(Serialize)]
struct WeightsMetadata {
    cost: f64,
    health: f64,
    jobs: f64,
}

impl From<&ObjectiveWeights> for WeightsMetadata {
    fn from(weights: &ObjectiveWeights) -> Self {
        Self {
            cost: weights.cost,
            health: weights.health,
            jobs: weights.jobs,
        }
    }
}

#[derive(Serialize)]
struct ProgramMetadata<'a> {
    /// The program name
    name: &'a str,
    /// The program version as specified in Cargo.toml
    version: &'a str,
    /// The target architecture for the build (e.g. x86_64-unknown-linux-gnu)
    target: &'a str,
    /// Whether it is a debug build
    is_debug: bool,
    /// The version of rustc used for compilation
    rustc_version: &'a str,
    /// When the program was built
    build_time_utc: &'a str,
    /// The git commit hash for this version (if known)
    git_commit_hash: String,
}

impl Default for ProgramMetadata<'_> {
    fn default() -> Self {
        Self {
            name: built_info::PKG_NAME,
            version: built_info::PKG_VERSION,
            target: built_info::TARGET,
            is_debug: built_info::DEBUG,
            rustc_version: built_info::RUSTC_VERSION,
            build_time_utc: built_info::BUILT_TIME_UTC,
            git_commit_hash: get_git_hash(),
        }
    }
}

/// Information about the platform on which the program is running.
///
/// The fields correspond to different data available from the [`PlatformInfo`] struct.
#[derive(Serialize)]
struct PlatformMetadata {
    sysname: String,
    nodename: String,
    release: String,
    version: String,
    machine: String,
    osname: String,
}

impl PlatformMetadata {
    fn new() -> Result<Self> {
        let info = PlatformInfo::new()
            .ok()
            .context("Unable to determine platform info")?;
        Ok(Self {
            sysname: info.sysname().to_string_lossy().into(),
            nodename: info.nodename().to_string_lossy().into(),
            release: info.release().to_string_lossy().into(),
            version: info.version().to_string_lossy().into(),
            machine: info.machine().to_string_lossy().into(),
            osname: info.osname().to_string_lossy().into(),
        })
    }
}

/// Write metadata to the specified output path in TOML format
///
/// # Arguments
///
/// * `output_path` - The folder to write to
/// * `model_path` - The path to the model, or `None` for the smoke test model
/// * `weights` - The objective weights used
/// * `backend` - The solver backend used
pub fn write_metadata(
    output_path: &Path,
    model_path: Option<&Path>,
    weights: &ObjectiveWeights,
    backend: SolverBackend,
) -> Result<()> {
    let backend = backend.to_string();
    let metadata = Metadata {
        run: RunMetadata::new(model_path, &backend),
        objective: weights.into(),
        program: ProgramMetadata::default(),
        platform: PlatformMetadata::new()?,
    };
    let file_path = output_path.join(METADATA_FILE_NAME);
    fs::write(&file_path, toml::to_string(&metadata)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_metadata() {
        let dir = tempdir().unwrap();
        write_metadata(
            dir.path(),
            None,
            &ObjectiveWeights::default(),
            SolverBackend::Highs,
        )
        .unwrap();

        let contents = fs::read_to_string(dir.path().join(METADATA_FILE_NAME)).unwrap();
        let value: toml::Table = toml::from_str(&contents).unwrap();
        assert_eq!(value["run"]["model"].as_str(), Some("smoke test"));
        assert_eq!(value["run"]["backend"].as_str(), Some("highs"));
        assert_eq!(value["objective"]["cost"].as_float(), Some(1.0));
        assert_eq!(
            value["program"]["name"].as_str(),
            Some("equitable-retirement")
        );
    }
}
