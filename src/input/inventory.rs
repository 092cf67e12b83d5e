//! Code for reading the inventory table.
use crate::id::IDCollection;
use crate::input::{input_err_msg, read_csv};
use crate::model::ProductID;
use anyhow::{Context, Result, ensure};
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use std::path::Path;

const INVENTORY_FILE_NAME: &str = "inventory.csv";

/// Represents a single inventory entry in the dataset
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct Inventory {
    /// The product this inventory entry refers to
    product_id: String,
    /// Starting on-hand quantity
    inventory: u32,
}

/// A map relating product ID to starting on-hand quantity
pub type InventoryMap = IndexMap<ProductID, u32>;

/// Read the inventory.csv file, requiring exactly one entry per product.
pub fn read_inventory(model_dir: &Path, product_ids: &IndexSet<ProductID>) -> Result<InventoryMap> {
    let file_path = model_dir.join(INVENTORY_FILE_NAME);
    let records = read_csv(&file_path)?;
    read_inventory_from_iter(records.into_iter(), product_ids)
        .with_context(|| input_err_msg(file_path))
}

/// Read inventory data from an iterator
fn read_inventory_from_iter<I>(iter: I, product_ids: &IndexSet<ProductID>) -> Result<InventoryMap>
where
    I: Iterator<Item = Inventory>,
{
    let mut map = InventoryMap::new();
    for entry in iter {
        let product_id = product_ids.get_id_by_str(&entry.product_id)?;

        ensure!(
            map.insert(product_id, entry.inventory).is_none(),
            "Duplicate inventory entry for product {}",
            entry.product_id
        );
    }

    for product_id in product_ids {
        ensure!(
            map.contains_key(product_id),
            "Missing inventory entry for product {product_id}"
        );
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, product_ids};
    use rstest::rstest;

    fn entry(product_id: &str, inventory: u32) -> Inventory {
        Inventory {
            product_id: product_id.to_string(),
            inventory,
        }
    }

    #[rstest]
    fn test_read_inventory_from_iter(product_ids: IndexSet<ProductID>) {
        let map = read_inventory_from_iter([entry("part1", 3)].into_iter(), &product_ids).unwrap();
        assert_eq!(map["part1"], 3);
    }

    #[rstest]
    fn test_read_inventory_from_iter_unknown_product(product_ids: IndexSet<ProductID>) {
        assert_error!(
            read_inventory_from_iter([entry("part2", 3)].into_iter(), &product_ids),
            "Unknown ID part2"
        );
    }

    #[rstest]
    fn test_read_inventory_from_iter_duplicate(product_ids: IndexSet<ProductID>) {
        assert_error!(
            read_inventory_from_iter(
                [entry("part1", 3), entry("part1", 4)].into_iter(),
                &product_ids
            ),
            "Duplicate inventory entry for product part1"
        );
    }

    #[rstest]
    fn test_read_inventory_from_iter_missing_product(product_ids: IndexSet<ProductID>) {
        assert_error!(
            read_inventory_from_iter(std::iter::empty(), &product_ids),
            "Missing inventory entry for product part1"
        );
    }
}
