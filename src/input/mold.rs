//! Code for reading the mold table.
use crate::input::{input_err_msg, read_csv};
use crate::model::{Mold, MoldID, MoldMap};
use crate::units::Hours;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const MOLDS_FILE_NAME: &str = "molds.csv";

/// Represents a single row of the mold table
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct MoldRecord {
    /// A unique identifier for the mold
    mold_id: String,
    /// Hours required to produce one unit on one mount
    cycle_time: Hours,
    /// How many physical copies of the mold exist
    quantity: u32,
}

/// Read the molds.csv file.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// A [`MoldMap`] of validated molds, keyed and ordered by mold ID.
pub fn read_molds(model_dir: &Path) -> Result<MoldMap> {
    let file_path = model_dir.join(MOLDS_FILE_NAME);
    let records = read_csv(&file_path)?;
    read_molds_from_iter(records.into_iter()).with_context(|| input_err_msg(file_path))
}

/// Read molds from an iterator of [`MoldRecord`]s
fn read_molds_from_iter<I>(iter: I) -> Result<MoldMap>
where
    I: Iterator<Item = MoldRecord>,
{
    let mut molds = MoldMap::new();
    for record in iter {
        ensure!(
            record.cycle_time.is_finite() && record.cycle_time > Hours(0.0),
            "Cycle time for mold {} must be a finite number greater than zero",
            record.mold_id
        );
        ensure!(
            record.quantity > 0,
            "Quantity for mold {} must be a positive integer",
            record.mold_id
        );

        let id = MoldID::new(&record.mold_id);
        let mold = Mold {
            id: id.clone(),
            cycle_time: record.cycle_time,
            quantity: record.quantity,
        };

        ensure!(
            molds.insert(id, mold).is_none(),
            "Duplicate mold entry for {}",
            record.mold_id
        );
    }

    Ok(molds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn record(mold_id: &str, cycle_time: f64, quantity: u32) -> MoldRecord {
        MoldRecord {
            mold_id: mold_id.to_string(),
            cycle_time: Hours(cycle_time),
            quantity,
        }
    }

    #[test]
    fn test_read_molds_from_iter() {
        let records = [record("mold1", 1.0, 2), record("mold2", 2.5, 1)];
        let molds = read_molds_from_iter(records.into_iter()).unwrap();
        assert_eq!(molds.len(), 2);
        assert_eq!(
            molds["mold2"],
            Mold {
                id: "mold2".into(),
                cycle_time: Hours(2.5),
                quantity: 1
            }
        );
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_read_molds_from_iter_bad_cycle_time(#[case] cycle_time: f64) {
        assert_error!(
            read_molds_from_iter([record("mold1", cycle_time, 2)].into_iter()),
            "Cycle time for mold mold1 must be a finite number greater than zero"
        );
    }

    #[test]
    fn test_read_molds_from_iter_bad_quantity() {
        assert_error!(
            read_molds_from_iter([record("mold1", 1.0, 0)].into_iter()),
            "Quantity for mold mold1 must be a positive integer"
        );
    }

    #[test]
    fn test_read_molds_from_iter_duplicate() {
        assert_error!(
            read_molds_from_iter([record("mold1", 1.0, 2), record("mold1", 2.0, 1)].into_iter()),
            "Duplicate mold entry for mold1"
        );
    }

    #[test]
    fn test_read_molds() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(MOLDS_FILE_NAME)).unwrap();
            writeln!(file, "mold_id,cycle_time,quantity\nmold1,1.0,2").unwrap();
        }

        let molds = read_molds(dir.path()).unwrap();
        assert_eq!(molds.len(), 1);
        assert_eq!(molds["mold1"].quantity, 2);
    }
}
