//! The command line interface for the program.
use crate::allocation::optimise_allocation;
use crate::log;
use crate::model::Model;
use crate::output::{create_output_directory, get_output_dir, write_allocation, write_schedule};
use crate::schedule::optimise_schedule;
use crate::settings::Settings;
use ::log::info;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(version, about)]
/// The command line interface for the program.
pub struct Cli {
    #[command(subcommand)]
    /// The available commands.
    pub command: Commands,
}

#[derive(Subcommand)]
/// The available commands.
pub enum Commands {
    /// Compute the profit-maximising production allocation for a model.
    Allocate {
        #[arg(help = "Path to the model directory")]
        /// Path to the model directory.
        model_dir: PathBuf,
    },
    /// Compute an allocation and a changeover-minimising schedule for it.
    Schedule {
        #[arg(help = "Path to the model directory")]
        /// Path to the model directory.
        model_dir: PathBuf,
    },
    /// Check that a model directory loads and validates.
    Validate {
        #[arg(help = "Path to the model directory")]
        /// Path to the model directory.
        model_dir: PathBuf,
    },
}

/// Load settings and the model, initialising logging along the way
fn load(model_dir: &Path) -> Result<(Settings, Model)> {
    let settings = Settings::from_path(model_dir)?;
    if !log::is_logger_initialised() {
        log::init(settings.log_level.as_deref()).context("Failed to initialise logging.")?;
    }
    let model = Model::from_path(model_dir).context("Failed to load model.")?;
    info!("Model loaded successfully.");

    Ok((settings, model))
}

/// Handle the `allocate` command.
pub fn handle_allocate_command(model_dir: &Path) -> Result<()> {
    let (settings, model) = load(model_dir)?;
    let allocation = optimise_allocation(&model, &settings.backend())?;

    let output_dir = get_output_dir(model_dir)?;
    create_output_directory(&output_dir).context("Failed to create output directory.")?;
    write_allocation(&output_dir, &allocation)?;
    info!("Allocation written to {}", output_dir.display());

    Ok(())
}

/// Handle the `schedule` command.
///
/// The allocation is computed first and its quantities become the production targets for the
/// scheduling model.
pub fn handle_schedule_command(model_dir: &Path) -> Result<()> {
    let (settings, model) = load(model_dir)?;
    let backend = settings.backend();
    let allocation = optimise_allocation(&model, &backend)?;
    let schedule = optimise_schedule(&model, &allocation, &backend)?;

    let output_dir = get_output_dir(model_dir)?;
    create_output_directory(&output_dir).context("Failed to create output directory.")?;
    write_allocation(&output_dir, &allocation)?;
    write_schedule(&output_dir, &schedule)?;
    info!("Allocation and schedule written to {}", output_dir.display());

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(model_dir: &Path) -> Result<()> {
    let (_, model) = load(model_dir)?;
    info!(
        "Model is valid: {} product(s), {} mold(s), {} slot(s)",
        model.products.len(),
        model.molds.len(),
        model.parameters.n_slots()
    );

    Ok(())
}
