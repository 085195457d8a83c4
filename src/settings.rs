//! Program settings, read from `settings.toml` in the user's config folder.
use crate::get_config_dir;
use crate::input::read_toml;
use crate::log::DEFAULT_LOG_LEVEL;
use crate::optimisation::SolverBackend;
use anyhow::{Context, Result};
use documented::DocumentedFields;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};

const SETTINGS_FILE_NAME: &str = "settings.toml";

const DEFAULT_SETTINGS_FILE_HEADER: &str =
    "# Program settings for the equitable retirement model.
# Uncomment a line to change its value.
";

/// The folder in which output folders are created, unless set otherwise
const DEFAULT_OUTPUT_ROOT: &str = "eqret_results";

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_output_root() -> PathBuf {
    DEFAULT_OUTPUT_ROOT.into()
}

fn default_smoke_backend() -> SolverBackend {
    SolverBackend::HighsSimplex
}

/// Get the path to where the settings file will be read from
pub fn get_settings_file_path() -> PathBuf {
    get_config_dir().join(SETTINGS_FILE_NAME)
}

/// Program settings.
///
/// Every field is optional in the file. Command-line options take precedence.
#[derive(Debug, Clone, DocumentedFields, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// The program log level (off, error, warn, info, debug or trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Whether to replace the contents of an existing output folder
    #[serde(default)]
    pub overwrite: bool,
    /// Whether to write the shape of every parameter to debug_dimensions.csv
    #[serde(default)]
    pub debug_model: bool,
    /// Folder in which output folders for models are created
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    /// Solver backend for the smoke command when --backend is not given
    #[serde(default = "default_smoke_backend")]
    pub smoke_backend: SolverBackend,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            overwrite: false,
            debug_model: false,
            output_root: default_output_root(),
            smoke_backend: default_smoke_backend(),
        }
    }
}

impl Settings {
    /// Load settings from the user's settings file, or use defaults if there isn't one
    pub fn load() -> Result<Settings> {
        Self::load_from_path(&get_settings_file_path())
    }

    fn load_from_path(file_path: &Path) -> Result<Settings> {
        if file_path.is_file() {
            read_toml(file_path)
        } else {
            Ok(Settings::default())
        }
    }

    /// A settings file with every field commented out and its documentation above it
    pub fn default_file_contents() -> Result<String> {
        let toml = toml::to_string(&Settings::default())
            .context("Could not convert default settings to TOML")?;

        let mut out = DEFAULT_SETTINGS_FILE_HEADER.to_string();
        for line in toml.lines().filter(|line| line.contains('=')) {
            let field = line.split('=').next().unwrap_or_default().trim();
            let docs = Settings::get_field_docs(field)
                .with_context(|| format!("Missing documentation for setting {field}"))?;
            write!(out, "\n# {docs}\n# {line}\n")?;
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_from_path_no_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(SETTINGS_FILE_NAME); // NB: doesn't exist
        assert_eq!(
            Settings::load_from_path(&file_path).unwrap(),
            Settings::default()
        );
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(
            &file_path,
            "log_level = \"warn\"\noutput_root = \"results\"\nsmoke_backend = \"highs-ipm\"\n",
        )
        .unwrap();

        assert_eq!(
            Settings::load_from_path(&file_path).unwrap(),
            Settings {
                log_level: "warn".to_string(),
                output_root: "results".into(),
                smoke_backend: SolverBackend::HighsIpm,
                ..Settings::default()
            }
        );
    }

    #[test]
    fn test_load_from_path_invalid() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(SETTINGS_FILE_NAME);

        fs::write(&file_path, "smoke_backend = \"cplex\"\n").unwrap();
        assert!(Settings::load_from_path(&file_path).is_err());

        fs::write(&file_path, "solver = \"highs\"\n").unwrap();
        assert!(Settings::load_from_path(&file_path).is_err());
    }

    #[test]
    fn test_default_file_contents() {
        let contents = Settings::default_file_contents().unwrap();
        assert!(contents.contains("# log_level = \"info\""));
        assert!(contents.contains("# output_root = \"eqret_results\""));
        assert!(contents.contains("# smoke_backend = \"highs-simplex\""));
        assert!(
            contents.contains("\n# Whether to replace the contents of an existing output folder\n")
        );

        // Uncommenting every line gives the default settings
        let uncommented = contents
            .lines()
            .filter_map(|line| line.strip_prefix("# "))
            .filter(|line| line.contains('='))
            .collect::<Vec<_>>()
            .join("\n");
        let settings: Settings = toml::from_str(&uncommented).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
