//! Code for reading the per-unit profit table.
use crate::id::IDCollection;
use crate::input::{input_err_msg, read_csv};
use crate::model::ProductID;
use crate::units::MoneyPerUnit;
use anyhow::{Context, Result, ensure};
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use std::path::Path;

const PROFIT_FILE_NAME: &str = "profit.csv";

/// Represents a single profit entry in the dataset
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct Profit {
    /// The product this profit entry refers to
    product_id: String,
    /// Profit per unit produced
    profit: MoneyPerUnit,
}

/// A map relating product ID to per-unit profit
pub type ProfitMap = IndexMap<ProductID, MoneyPerUnit>;

/// Read the profit.csv file, requiring exactly one entry per product.
pub fn read_profit(model_dir: &Path, product_ids: &IndexSet<ProductID>) -> Result<ProfitMap> {
    let file_path = model_dir.join(PROFIT_FILE_NAME);
    let records = read_csv(&file_path)?;
    read_profit_from_iter(records.into_iter(), product_ids)
        .with_context(|| input_err_msg(file_path))
}

/// Read profit data from an iterator
fn read_profit_from_iter<I>(iter: I, product_ids: &IndexSet<ProductID>) -> Result<ProfitMap>
where
    I: Iterator<Item = Profit>,
{
    let mut map = ProfitMap::new();
    for entry in iter {
        let product_id = product_ids.get_id_by_str(&entry.product_id)?;

        ensure!(
            entry.profit.is_finite(),
            "Profit for product {} must be a finite number",
            entry.product_id
        );

        ensure!(
            map.insert(product_id, entry.profit).is_none(),
            "Duplicate profit entry for product {}",
            entry.product_id
        );
    }

    for product_id in product_ids {
        ensure!(
            map.contains_key(product_id),
            "Missing profit entry for product {product_id}"
        );
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, product_ids};
    use rstest::rstest;

    fn entry(product_id: &str, profit: f64) -> Profit {
        Profit {
            product_id: product_id.to_string(),
            profit: MoneyPerUnit(profit),
        }
    }

    #[rstest]
    fn test_read_profit_from_iter(product_ids: IndexSet<ProductID>) {
        let map = read_profit_from_iter([entry("part1", 5.0)].into_iter(), &product_ids).unwrap();
        assert_eq!(map["part1"], MoneyPerUnit(5.0));
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn test_read_profit_from_iter_bad_profit(
        product_ids: IndexSet<ProductID>,
        #[case] profit: f64,
    ) {
        assert_error!(
            read_profit_from_iter([entry("part1", profit)].into_iter(), &product_ids),
            "Profit for product part1 must be a finite number"
        );
    }

    #[rstest]
    fn test_read_profit_from_iter_unknown_product(product_ids: IndexSet<ProductID>) {
        assert_error!(
            read_profit_from_iter([entry("part2", 5.0)].into_iter(), &product_ids),
            "Unknown ID part2"
        );
    }

    #[rstest]
    fn test_read_profit_from_iter_missing_product(product_ids: IndexSet<ProductID>) {
        assert_error!(
            read_profit_from_iter(std::iter::empty(), &product_ids),
            "Missing profit entry for product part1"
        );
    }
}
