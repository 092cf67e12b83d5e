//! Fixtures for tests

use crate::model::{Mold, MoldID, MoldMap, Product, ProductID, ProductMap};
use crate::model::parameters::ModelParameters;
use crate::units::{Hours, MoneyPerUnit};
use indexmap::{IndexSet, indexmap};
use rstest::fixture;
use std::iter;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn product_ids() -> IndexSet<ProductID> {
    iter::once("part1".into()).collect()
}

#[fixture]
pub fn mold_ids() -> IndexSet<MoldID> {
    iter::once("mold1".into()).collect()
}

#[fixture]
pub fn parameters() -> ModelParameters {
    ModelParameters {
        arms: 1,
        mounts_per_arm: 2,
        run_hours: Hours(10.0),
        slot_hours: Hours(1.0),
    }
}

#[fixture]
pub fn product() -> Product {
    Product {
        id: "part1".into(),
        mold_id: "mold1".into(),
        demand: 25,
        inventory: 0,
        profit: MoneyPerUnit(5.0),
    }
}

#[fixture]
pub fn products(product: Product) -> ProductMap {
    indexmap! { product.id.clone() => product }
}

#[fixture]
pub fn mold() -> Mold {
    Mold {
        id: "mold1".into(),
        cycle_time: Hours(1.0),
        quantity: 2,
    }
}

#[fixture]
pub fn molds(mold: Mold) -> MoldMap {
    indexmap! { mold.id.clone() => mold }
}
