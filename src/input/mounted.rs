//! Code for reading the optional table of molds left mounted by the previous run.
use crate::id::IDCollection;
use crate::input::{input_err_msg, read_csv_allow_missing};
use crate::model::{MoldID, PreviousMounts};
use anyhow::{Context, Result, ensure};
use indexmap::IndexSet;
use serde::Deserialize;
use std::path::Path;

const MOUNTED_FILE_NAME: &str = "mounted.csv";

/// Represents a single row of the previous-mounts table
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct MountedRecord {
    /// The arm the mold was left on (zero-based)
    arm: u32,
    /// The mold left mounted
    mold_id: String,
}

/// Read the mounted.csv file, if present.
///
/// The file records which mold the previous production run left on each arm; the scheduler uses
/// it to avoid charging a changeover for keeping the same mold. A missing file means the
/// previous state is unknown.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `mold_ids` - All possible IDs of molds
/// * `arms` - Number of arms in the model
pub fn read_mounted(
    model_dir: &Path,
    mold_ids: &IndexSet<MoldID>,
    arms: u32,
) -> Result<PreviousMounts> {
    let file_path = model_dir.join(MOUNTED_FILE_NAME);
    let records = read_csv_allow_missing(&file_path)?;
    read_mounted_from_iter(records.into_iter(), mold_ids, arms)
        .with_context(|| input_err_msg(file_path))
}

/// Read previous-mount records from an iterator
fn read_mounted_from_iter<I>(
    iter: I,
    mold_ids: &IndexSet<MoldID>,
    arms: u32,
) -> Result<PreviousMounts>
where
    I: Iterator<Item = MountedRecord>,
{
    let mut mounts = PreviousMounts::new();
    for record in iter {
        ensure!(
            record.arm < arms,
            "Arm {} is out of range (model has {} arms)",
            record.arm,
            arms
        );

        let mold_id = mold_ids.get_id_by_str(&record.mold_id)?;

        ensure!(
            mounts.insert(record.arm, mold_id).is_none(),
            "Duplicate mounted entry for arm {}",
            record.arm
        );
    }

    Ok(mounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, mold_ids};
    use rstest::rstest;
    use tempfile::tempdir;

    fn record(arm: u32, mold_id: &str) -> MountedRecord {
        MountedRecord {
            arm,
            mold_id: mold_id.to_string(),
        }
    }

    #[rstest]
    fn test_read_mounted_from_iter(mold_ids: IndexSet<MoldID>) {
        let mounts =
            read_mounted_from_iter([record(0, "mold1")].into_iter(), &mold_ids, 2).unwrap();
        assert_eq!(mounts, PreviousMounts::from_iter([(0, "mold1".into())]));
    }

    #[rstest]
    fn test_read_mounted_from_iter_bad_arm(mold_ids: IndexSet<MoldID>) {
        assert_error!(
            read_mounted_from_iter([record(2, "mold1")].into_iter(), &mold_ids, 2),
            "Arm 2 is out of range (model has 2 arms)"
        );
    }

    #[rstest]
    fn test_read_mounted_from_iter_unknown_mold(mold_ids: IndexSet<MoldID>) {
        assert_error!(
            read_mounted_from_iter([record(0, "mold2")].into_iter(), &mold_ids, 2),
            "Unknown ID mold2"
        );
    }

    #[rstest]
    fn test_read_mounted_from_iter_duplicate(mold_ids: IndexSet<MoldID>) {
        assert_error!(
            read_mounted_from_iter(
                [record(0, "mold1"), record(0, "mold1")].into_iter(),
                &mold_ids,
                2
            ),
            "Duplicate mounted entry for arm 0"
        );
    }

    #[rstest]
    fn test_read_mounted_missing_file(mold_ids: IndexSet<MoldID>) {
        let dir = tempdir().unwrap();
        let mounts = read_mounted(dir.path(), &mold_ids, 2).unwrap();
        assert!(mounts.is_empty());
    }
}
