//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::input::{input_err_msg, read_toml};
use crate::units::Hours;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

/// Default length of a scheduling slot
fn default_slot_hours() -> Hours {
    Hours(1.0)
}

/// Capacity and scheduling parameters for a production run.
///
/// These are fixed at construction time and immutable for the life of a model instance.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// Number of molding arms available
    pub arms: u32,
    /// Number of mold-holding mounts on each arm
    pub mounts_per_arm: u32,
    /// Length of the production run
    pub run_hours: Hours,
    /// Length of one scheduling slot; the run is discretised into whole slots
    #[serde(default = "default_slot_hours")]
    pub slot_hours: Hours,
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
        let params: ModelParameters = read_toml(&file_path)?;

        params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(params)
    }

    /// Check the capacity parameters are valid
    pub fn validate(&self) -> Result<()> {
        ensure!(self.arms > 0, "`arms` must be a positive integer");
        ensure!(
            self.mounts_per_arm > 0,
            "`mounts_per_arm` must be a positive integer"
        );
        ensure!(
            self.run_hours.is_finite() && self.run_hours > Hours(0.0),
            "`run_hours` must be a finite number greater than zero"
        );
        ensure!(
            self.slot_hours.is_finite() && self.slot_hours > Hours(0.0),
            "`slot_hours` must be a finite number greater than zero"
        );
        ensure!(
            self.slot_hours <= self.run_hours,
            "`slot_hours` cannot exceed `run_hours`"
        );

        Ok(())
    }

    /// Total mount-hours available over the run (arms x mounts x hours)
    pub fn total_mount_hours(&self) -> Hours {
        self.run_hours * f64::from(self.arms * self.mounts_per_arm)
    }

    /// The number of whole scheduling slots the run divides into
    pub fn n_slots(&self) -> u32 {
        (self.run_hours / self.slot_hours).floor() as u32
    }
}
