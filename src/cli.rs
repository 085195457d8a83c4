//! The command line interface for the model.
use crate::input::load_model;
use crate::log;
use crate::model::RetirementModel;
use crate::optimisation::{ObjectiveWeights, Output, SolverBackend};
use crate::output::metadata::write_metadata;
use crate::output::{DataWriter, create_output_directory, get_named_output_dir, get_output_dir};
use crate::settings::Settings;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the model.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// Whether to write additional information to CSV files
    #[arg(long)]
    pub debug_model: bool,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Build and solve a model.
    Run {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Validate a model without solving it.
    Validate {
        /// The path to the model directory.
        model_dir: PathBuf,
    },
    /// Solve a small built-in model to check that the solver works.
    Smoke {
        /// The solver backend to use [default: from settings, or highs-simplex]
        #[arg(long)]
        backend: Option<String>,
        /// Directory for output files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Whether to overwrite the output directory if it already exists
        #[arg(long)]
        overwrite: bool,
    },
    /// Manage example models.
    Example {
        /// The available subcommands for managing example models.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { model_dir, opts } => handle_run_command(&model_dir, &opts, None),
            Self::Validate { model_dir } => handle_validate_command(&model_dir, None),
            Self::Smoke {
                backend,
                output_dir,
                overwrite,
            } => handle_smoke_command(
                backend.as_deref(),
                output_dir.as_deref(),
                overwrite,
                None,
            ),
            Self::Example { subcommand } => subcommand.execute(),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start the program
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ eqret --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        // Output program help in markdown format
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load program settings, if not provided
fn load_settings(settings: Option<Settings>) -> Result<Settings> {
    if let Some(settings) = settings {
        Ok(settings)
    } else {
        Settings::load().context("Failed to load settings.")
    }
}

/// Create the output folder and start the logger, which writes its files there.
///
/// # Returns
///
/// Whether an existing output folder was overwritten
fn prepare_output(output_path: &Path, overwrite: bool, settings: &Settings) -> Result<bool> {
    let overwritten = create_output_directory(output_path, overwrite).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_path.display()
        )
    })?;

    // Initialise program logger
    log::init(&settings.log_level, Some(output_path))
        .context("Failed to initialise logging.")?;

    Ok(overwritten)
}

/// Solve a model and write the results to `output_path`
fn solve_and_write(
    model: &RetirementModel,
    model_path: Option<&Path>,
    weights: &ObjectiveWeights,
    backend: SolverBackend,
    output_path: &Path,
    debug_model: bool,
) -> Result<Output> {
    model.log_dimensions();
    let output = model.solve(weights, backend)?;
    info!("Z: {}", output.z);
    info!(
        "cost: {}, health: {}, jobs: {}",
        output.cost, output.health, output.jobs
    );

    let mut writer = DataWriter::create(output_path, debug_model)?;
    writer.write_all(model, &output)?;
    write_metadata(output_path, model_path, weights, backend)?;

    Ok(output)
}

/// Handle the `run` command.
pub fn handle_run_command(
    model_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let mut settings = load_settings(settings)?;

    // These settings can be overridden by command-line argument
    if opts.debug_model {
        settings.debug_model = true;
    }
    if opts.overwrite {
        settings.overwrite = true;
    }

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(&settings.output_root, model_path)?;
        &pathbuf
    };

    let overwritten = prepare_output(output_path, settings.overwrite, &settings)?;

    // Load the model to run
    let (model, parameters) = load_model(model_path).context("Failed to load model.")?;
    info!("Loaded model from {}", model_path.display());
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwritten {
        warn!("Output folder will be overwritten");
    }

    solve_and_write(
        &model,
        Some(model_path),
        &parameters.objective,
        parameters.solver.backend,
        output_path,
        settings.debug_model,
    )?;
    info!("Run complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(model_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = load_settings(settings)?;

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(&settings.log_level, None).context("Failed to initialise logging.")?;

    // Load/validate the model
    let (model, _) = load_model(model_path).context("Failed to validate model.")?;
    model.log_dimensions();
    model.validate().context("Failed to validate model.")?;
    info!("Model validation successful!");

    Ok(())
}

/// Handle the `smoke` command.
///
/// This solves a small model built from fixed values, minimising cost. The backend is the named
/// one if given, otherwise the one in the settings.
pub fn handle_smoke_command(
    backend: Option<&str>,
    output_path: Option<&Path>,
    overwrite: bool,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;
    let backend = match backend {
        Some(name) => SolverBackend::from_name(name)?,
        None => settings.smoke_backend,
    };

    let pathbuf: PathBuf;
    let output_path = if let Some(p) = output_path {
        p
    } else {
        pathbuf = get_named_output_dir(&settings.output_root, "smoke");
        &pathbuf
    };

    let overwritten = prepare_output(output_path, overwrite || settings.overwrite, &settings)?;
    info!("Output folder: {}", output_path.display());
    if overwritten {
        warn!("Output folder will be overwritten");
    }

    let model = RetirementModel::smoke_test();
    solve_and_write(
        &model,
        None,
        &ObjectiveWeights::default(),
        backend,
        output_path,
        settings.debug_model,
    )?;
    info!("Smoke test complete!");

    Ok(())
}
