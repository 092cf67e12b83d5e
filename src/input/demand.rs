//! Code for reading the demand table.
use crate::id::IDCollection;
use crate::input::{input_err_msg, read_csv};
use crate::model::ProductID;
use anyhow::{Context, Result, ensure};
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use std::path::Path;

const DEMAND_FILE_NAME: &str = "demand.csv";

/// Represents a single demand entry in the dataset
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct Demand {
    /// The product this demand entry refers to
    product_id: String,
    /// Demand quantity over the planning horizon
    demand: u32,
}

/// A map relating product ID to demand over the planning horizon
pub type DemandMap = IndexMap<ProductID, u32>;

/// Read the demand.csv file.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `product_ids` - All possible IDs of products
///
/// # Returns
///
/// A [`DemandMap`] with exactly one entry per product.
pub fn read_demand(model_dir: &Path, product_ids: &IndexSet<ProductID>) -> Result<DemandMap> {
    let file_path = model_dir.join(DEMAND_FILE_NAME);
    let records = read_csv(&file_path)?;
    read_demand_from_iter(records.into_iter(), product_ids)
        .with_context(|| input_err_msg(file_path))
}

/// Read demand data from an iterator.
///
/// Every entry must refer to a known product, no product may appear twice and every product must
/// be covered.
fn read_demand_from_iter<I>(iter: I, product_ids: &IndexSet<ProductID>) -> Result<DemandMap>
where
    I: Iterator<Item = Demand>,
{
    let mut map = DemandMap::new();
    for entry in iter {
        let product_id = product_ids.get_id_by_str(&entry.product_id)?;

        ensure!(
            map.insert(product_id, entry.demand).is_none(),
            "Duplicate demand entry for product {}",
            entry.product_id
        );
    }

    // Check that demand is specified for every product
    for product_id in product_ids {
        ensure!(
            map.contains_key(product_id),
            "Missing demand entry for product {product_id}"
        );
    }

    Ok(map)
}
