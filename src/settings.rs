//! Code for loading program settings.
use crate::input::{input_err_msg, read_toml};
use crate::solver::HighsBackend;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Program settings from the optional `settings.toml` in the model directory.
///
/// Solver options are passthroughs to the backend; this program implements no timeout logic of
/// its own.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Settings {
    /// The program log level
    pub log_level: Option<String>,
    /// Wall-clock limit for a single solve, in seconds
    pub solver_time_limit: Option<f64>,
    /// Relative MIP gap at which the solver may stop early
    pub solver_mip_gap: Option<f64>,
}

impl Settings {
    /// Read the settings file from the model directory.
    ///
    /// If the file is not present, default values for settings will be used.
    ///
    /// # Returns
    ///
    /// The program settings as a `Settings` struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<Settings> {
        let file_path = model_dir.as_ref().join(SETTINGS_FILE_NAME);
        if !file_path.is_file() {
            return Ok(Settings::default());
        }

        let settings: Settings = read_toml(&file_path)?;
        settings
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(settings)
    }

    /// Check the settings are valid
    fn validate(&self) -> Result<()> {
        if let Some(time_limit) = self.solver_time_limit {
            ensure!(
                time_limit.is_finite() && time_limit > 0.0,
                "`solver_time_limit` must be a finite number greater than zero"
            );
        }
        if let Some(mip_gap) = self.solver_mip_gap {
            ensure!(
                mip_gap.is_finite() && mip_gap >= 0.0,
                "`solver_mip_gap` must be a finite non-negative number"
            );
        }

        Ok(())
    }

    /// The solver backend configured by these settings
    pub fn backend(&self) -> HighsBackend {
        HighsBackend {
            time_limit: self.solver_time_limit,
            mip_gap: self.solver_mip_gap,
        }
    }
}
