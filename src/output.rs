//! The module responsible for writing output data to disk.
use crate::allocation::AllocationTable;
use crate::model::{MoldID, ProductID};
use crate::schedule::ScheduleTable;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "rotoplan_results";

/// The output file name for the allocation table
const ALLOCATION_FILE_NAME: &str = "allocation.csv";

/// The output file name for the schedule table
const SCHEDULE_FILE_NAME: &str = "schedule.csv";

/// Get the output directory for the model specified at `model_dir`
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
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

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model specified at `model_dir`.
pub fn create_output_directory(output_dir: &Path) -> Result<()> {
    if output_dir.is_dir() {
        // already exists
        return Ok(());
    }

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(())
}

/// Represents a row in the allocation CSV file
#[derive(Serialize, Debug, PartialEq)]
struct AllocationRow {
    product_id: ProductID,
    produced: u32,
}

/// Represents a row in the schedule CSV file
#[derive(Serialize, Debug, PartialEq)]
struct ScheduleRow {
    arm: u32,
    slot: u32,
    mold_id: MoldID,
    product_id: ProductID,
    quantity: f64,
}

/// Write the allocation table to the allocation CSV file.
///
/// # Arguments
///
/// * `output_dir` - The directory to write output files to
/// * `allocation` - The allocation table from a successful solve
pub fn write_allocation(output_dir: &Path, allocation: &AllocationTable) -> Result<()> {
    let file_path = output_dir.join(ALLOCATION_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)?;
    for (product_id, produced) in &allocation.quantities {
        writer.serialize(AllocationRow {
            product_id: product_id.clone(),
            produced: *produced,
        })?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the schedule table to the schedule CSV file.
///
/// # Arguments
///
/// * `output_dir` - The directory to write output files to
/// * `schedule` - The schedule table from a successful solve
pub fn write_schedule(output_dir: &Path, schedule: &ScheduleTable) -> Result<()> {
    let file_path = output_dir.join(SCHEDULE_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)?;
    for entry in &schedule.entries {
        writer.serialize(ScheduleRow {
            arm: entry.arm,
            slot: entry.slot,
            mold_id: entry.mold_id.clone(),
            product_id: entry.product_id.clone(),
            quantity: entry.quantity,
        })?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleEntry;
    use crate::units::Money;
    use indexmap::IndexMap;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_get_output_dir() {
        let dir = tempdir().unwrap();
        let output_dir = get_output_dir(dir.path()).unwrap();
        assert!(output_dir.starts_with(OUTPUT_DIRECTORY_ROOT));
    }

    #[test]
    fn test_create_output_directory() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("results");
        create_output_directory(&output_dir).unwrap();
        assert!(output_dir.is_dir());

        // Idempotent
        create_output_directory(&output_dir).unwrap();
    }

    #[test]
    fn test_write_allocation() {
        let dir = tempdir().unwrap();
        let allocation = AllocationTable {
            quantities: IndexMap::from_iter([("part1".into(), 20)]),
            objective: Money(100.0),
        };
        write_allocation(dir.path(), &allocation).unwrap();

        let contents = fs::read_to_string(dir.path().join(ALLOCATION_FILE_NAME)).unwrap();
        assert_eq!(contents, "product_id,produced\npart1,20\n");
    }

    #[test]
    fn test_write_schedule() {
        let dir = tempdir().unwrap();
        let schedule = ScheduleTable {
            entries: vec![ScheduleEntry {
                arm: 0,
                slot: 0,
                mold_id: "mold1".into(),
                product_id: "part1".into(),
                quantity: 2.0,
            }],
            changeovers: 0,
        };
        write_schedule(dir.path(), &schedule).unwrap();

        let contents = fs::read_to_string(dir.path().join(SCHEDULE_FILE_NAME)).unwrap();
        assert_eq!(
            contents,
            "arm,slot,mold_id,product_id,quantity\n0,0,mold1,part1,2.0\n"
        );
    }
}
