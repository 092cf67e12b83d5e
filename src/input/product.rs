//! Code for reading the product table, which maps each product to the mold it requires.
use crate::id::IDCollection;
use crate::input::{input_err_msg, read_csv};
use crate::model::{MoldID, ProductID};
use anyhow::{Context, Result, ensure};
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use std::path::Path;

const PRODUCTS_FILE_NAME: &str = "products.csv";

/// Represents a single row of the product table
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct ProductRecord {
    /// A unique identifier for the product
    product_id: String,
    /// The mold an arm must carry to produce this product
    mold_id: String,
}

/// A map relating product ID to the mold the product requires
pub type ProductMoldMap = IndexMap<ProductID, MoldID>;

/// Read the products.csv file.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `mold_ids` - All possible IDs of molds
///
/// # Returns
///
/// A [`ProductMoldMap`] keyed and ordered by product ID.
pub fn read_products(model_dir: &Path, mold_ids: &IndexSet<MoldID>) -> Result<ProductMoldMap> {
    let file_path = model_dir.join(PRODUCTS_FILE_NAME);
    let records = read_csv(&file_path)?;
    read_products_from_iter(records.into_iter(), mold_ids)
        .with_context(|| input_err_msg(file_path))
}

/// Read product records from an iterator, checking each references a known mold
fn read_products_from_iter<I>(iter: I, mold_ids: &IndexSet<MoldID>) -> Result<ProductMoldMap>
where
    I: Iterator<Item = ProductRecord>,
{
    let mut map = ProductMoldMap::new();
    for record in iter {
        let mold_id = mold_ids.get_id_by_str(&record.mold_id).with_context(|| {
            format!("Product {} references an unknown mold", record.product_id)
        })?;

        ensure!(
            map.insert(ProductID::new(&record.product_id), mold_id)
                .is_none(),
            "Duplicate product entry for {}",
            record.product_id
        );
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, mold_ids};
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn record(product_id: &str, mold_id: &str) -> ProductRecord {
        ProductRecord {
            product_id: product_id.to_string(),
            mold_id: mold_id.to_string(),
        }
    }

    #[rstest]
    fn test_read_products_from_iter(mold_ids: IndexSet<MoldID>) {
        let map =
            read_products_from_iter([record("part1", "mold1")].into_iter(), &mold_ids).unwrap();
        assert_eq!(map["part1"], "mold1".into());
    }

    #[rstest]
    fn test_read_products_from_iter_unknown_mold(mold_ids: IndexSet<MoldID>) {
        assert_error!(
            read_products_from_iter([record("part1", "mold2")].into_iter(), &mold_ids),
            "Product part1 references an unknown mold"
        );
    }

    #[rstest]
    fn test_read_products_from_iter_duplicate(mold_ids: IndexSet<MoldID>) {
        assert_error!(
            read_products_from_iter(
                [record("part1", "mold1"), record("part1", "mold1")].into_iter(),
                &mold_ids
            ),
            "Duplicate product entry for part1"
        );
    }

    #[rstest]
    fn test_read_products(mold_ids: IndexSet<MoldID>) {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(PRODUCTS_FILE_NAME)).unwrap();
            writeln!(file, "product_id,mold_id\npart1,mold1").unwrap();
        }

        let map = read_products(dir.path(), &mold_ids).unwrap();
        assert_eq!(map.len(), 1);
    }
}
