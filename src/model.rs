//! Code for loading and validating planning models.
//!
//! A model directory contains `model.toml` along with the demand, inventory, profit, product and
//! mold tables as CSV files. [`Model::from_path`] reads and cross-validates the lot.
use crate::id::define_id_type;
use crate::input::demand::read_demand;
use crate::input::inventory::read_inventory;
use crate::input::mold::read_molds;
use crate::input::mounted::read_mounted;
use crate::input::product::read_products;
use crate::input::profit::read_profit;
use crate::units::{Hours, MoneyPerUnit};
use anyhow::{Result, ensure};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use std::path::Path;

pub mod parameters;
pub use parameters::ModelParameters;

define_id_type!(ProductID);
define_id_type!(MoldID);

/// A product that can be molded, along with its demand, inventory and profit data
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// A unique identifier for the product
    pub id: ProductID,
    /// The mold an arm must carry to produce this product
    pub mold_id: MoldID,
    /// Demand over the planning horizon, in units
    pub demand: u32,
    /// Starting on-hand quantity, in units
    pub inventory: u32,
    /// Profit per unit produced
    pub profit: MoneyPerUnit,
}

/// A mold type and its physical availability
#[derive(Debug, Clone, PartialEq)]
pub struct Mold {
    /// A unique identifier for the mold
    pub id: MoldID,
    /// Hours required to produce one unit on one mount
    pub cycle_time: Hours,
    /// How many physical copies of the mold exist
    pub quantity: u32,
}

/// A map of [`Product`]s, keyed by product ID
pub type ProductMap = IndexMap<ProductID, Product>;

/// A map of [`Mold`]s, keyed by mold ID
pub type MoldMap = IndexMap<MoldID, Mold>;

/// The molds left on each arm by the previous production run, keyed by arm number
pub type PreviousMounts = HashMap<u32, MoldID>;

/// Check that the product and mold tables are consistent with one another.
///
/// Every product must reference a known mold and there must be at least one product. Callers
/// that assemble tables by hand (rather than via [`Model::from_path`]) get the same data errors
/// as the CSV readers produce.
pub fn check_tables_consistent(products: &ProductMap, molds: &MoldMap) -> Result<()> {
    ensure!(!products.is_empty(), "Product table cannot be empty");

    for product in products.values() {
        ensure!(
            molds.contains_key(&product.mold_id),
            "Product {} references unknown mold {}",
            product.id,
            product.mold_id
        );
    }

    Ok(())
}

/// Model definition
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Capacity and scheduling parameters
    pub parameters: ModelParameters,
    /// Product data, joined across the demand, inventory, profit and product tables
    pub products: ProductMap,
    /// Mold data
    pub molds: MoldMap,
    /// Molds left mounted by the previous run, if known
    pub previous_mounts: PreviousMounts,
}

impl Model {
    /// Read a model from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The validated model, or an error if any file is missing, malformed or inconsistent.
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
        let model_dir = model_dir.as_ref();
        let parameters = ModelParameters::from_path(model_dir)?;

        let molds = read_molds(model_dir)?;
        let mold_ids: IndexSet<MoldID> = molds.keys().cloned().collect();

        let product_molds = read_products(model_dir, &mold_ids)?;
        let product_ids: IndexSet<ProductID> = product_molds.keys().cloned().collect();

        // Each reader checks its table covers exactly the products in products.csv
        let demand = read_demand(model_dir, &product_ids)?;
        let inventory = read_inventory(model_dir, &product_ids)?;
        let profit = read_profit(model_dir, &product_ids)?;

        let products: ProductMap = product_molds
            .into_iter()
            .map(|(id, mold_id)| {
                let product = Product {
                    id: id.clone(),
                    mold_id,
                    // NB: completeness was checked by the readers, so these lookups cannot fail
                    demand: demand[&id],
                    inventory: inventory[&id],
                    profit: profit[&id],
                };
                (id, product)
            })
            .collect();

        let previous_mounts = read_mounted(model_dir, &mold_ids, parameters.arms)?;

        check_tables_consistent(&products, &molds)?;

        Ok(Model {
            parameters,
            products,
            molds,
            previous_mounts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, molds, products};
    use rstest::rstest;

    #[rstest]
    fn test_check_tables_consistent(products: ProductMap, molds: MoldMap) {
        assert!(check_tables_consistent(&products, &molds).is_ok());
    }

    #[rstest]
    fn test_check_tables_consistent_empty(molds: MoldMap) {
        assert_error!(
            check_tables_consistent(&ProductMap::new(), &molds),
            "Product table cannot be empty"
        );
    }

    #[rstest]
    fn test_check_tables_consistent_unknown_mold(products: ProductMap) {
        assert_error!(
            check_tables_consistent(&products, &MoldMap::new()),
            "Product part1 references unknown mold mold1"
        );
    }
}
