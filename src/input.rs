//! Common routines for handling input data.
use anyhow::{Context, Result, ensure};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub mod demand;
pub mod inventory;
pub mod mold;
pub mod mounted;
pub mod product;
pub mod profit;

/// Generate the standard error message for a problem with an input file
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read a series of type `T`s from a CSV file into a `Vec<T>`.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
///
/// # Returns
///
/// The deserialised records, or an error if the file is missing, malformed or empty.
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(file_path).with_context(|| input_err_msg(file_path))?;

    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: T = result.with_context(|| input_err_msg(file_path))?;
        records.push(record);
    }

    ensure!(
        !records.is_empty(),
        "CSV file {} cannot be empty",
        file_path.display()
    );

    Ok(records)
}

/// Like [`read_csv`], but a missing or empty file yields an empty `Vec` rather than an error.
///
/// Used for optional input files such as `mounted.csv`.
pub fn read_csv_allow_missing<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    if !file_path.is_file() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(file_path).with_context(|| input_err_msg(file_path))?;

    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: T = result.with_context(|| input_err_msg(file_path))?;
        records.push(record);
    }

    Ok(records)
}

/// Parse a TOML file at the specified path.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let contents = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let parsed = toml::from_str(&contents).with_context(|| input_err_msg(file_path))?;

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Record {
        id: String,
        value: u32,
    }

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("data.csv");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id,value\na,1\nb,2").unwrap();
        }

        let records: Vec<Record> = read_csv(&file_path).unwrap();
        assert_eq!(
            records,
            vec![
                Record {
                    id: "a".to_string(),
                    value: 1
                },
                Record {
                    id: "b".to_string(),
                    value: 2
                }
            ]
        );
    }

    #[test]
    fn test_read_csv_empty() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("data.csv");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id,value").unwrap();
        }

        assert!(read_csv::<Record>(&file_path).is_err());
    }

    #[test]
    fn test_read_csv_missing() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("data.csv"); // NB: doesn't exist
        assert!(read_csv::<Record>(&file_path).is_err());
        assert_eq!(
            read_csv_allow_missing::<Record>(&file_path).unwrap(),
            Vec::new()
        );
    }

    #[test]
    fn test_read_csv_malformed() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("data.csv");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id,value\na,not_a_number").unwrap();
        }

        assert!(read_csv::<Record>(&file_path).is_err());
    }

    #[test]
    fn test_read_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("data.toml");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id = \"a\"\nvalue = 1").unwrap();
        }

        let record: Record = read_toml(&file_path).unwrap();
        assert_eq!(
            record,
            Record {
                id: "a".to_string(),
                value: 1
            }
        );
    }
}
