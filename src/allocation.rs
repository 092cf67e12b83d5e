//! The profit-maximising allocation model.
//!
//! [`MaxProfit`] decides how much of each product to produce in one run so that total profit is
//! maximised, subject to the mount-hours the plant can supply, the availability of each mold and
//! a per-product demand ceiling (net of starting inventory).
use crate::model::{
    Model, ModelParameters, MoldMap, ProductID, ProductMap, check_tables_consistent,
};
use crate::solver::{Constraint, Sense, SolverBackend, VariableDefinition};
use crate::units::Money;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::info;

/// The result of a successful allocation optimisation
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationTable {
    /// Units of each product to produce, keyed by product ID
    pub quantities: IndexMap<ProductID, u32>,
    /// The total profit for the allocation
    pub objective: Money,
}

/// The input tables after loading
struct LoadedTables {
    products: ProductMap,
    molds: MoldMap,
}

/// The formulated problem, ready to hand to a solver backend
struct BuiltProblem {
    definitions: Vec<VariableDefinition>,
    constraints: Vec<Constraint>,
}

/// Builds and solves the profit-maximising allocation problem.
///
/// The lifecycle is load data, build model, solve, extract results; each step fails with a state
/// error if called out of order. A `MaxProfit` instance is built and solved once, then discarded.
pub struct MaxProfit {
    parameters: ModelParameters,
    tables: Option<LoadedTables>,
    problem: Option<BuiltProblem>,
    solution: Option<AllocationTable>,
}

impl MaxProfit {
    /// Create a new allocation model with the given capacity parameters.
    ///
    /// Fails with a configuration error if any capacity parameter is non-positive.
    pub fn new(parameters: ModelParameters) -> Result<Self> {
        parameters.validate()?;

        Ok(Self {
            parameters,
            tables: None,
            problem: None,
            solution: None,
        })
    }

    /// Load the product and mold tables, checking they are consistent with one another.
    pub fn load_data(&mut self, products: ProductMap, molds: MoldMap) -> Result<()> {
        check_tables_consistent(&products, &molds)?;

        self.tables = Some(LoadedTables { products, molds });
        self.problem = None;
        self.solution = None;

        Ok(())
    }

    /// Formulate the allocation problem from the loaded tables.
    ///
    /// One integer variable is created per product, bounded above by the demand remaining after
    /// the inventory offset. One capacity constraint limits cycle-time-weighted production to the
    /// total available mount-hours, and one constraint per mold limits production to the hours
    /// its physical copies can supply.
    pub fn build_model(&mut self) -> Result<()> {
        let tables = self.tables.as_ref().context("data not yet loaded")?;

        let mut definitions = Vec::with_capacity(tables.products.len());
        let mut capacity_terms = Vec::with_capacity(tables.products.len());
        for (index, product) in tables.products.values().enumerate() {
            // NB: consistency was checked in load_data, so the mold must exist
            let cycle_time = tables.molds[&product.mold_id].cycle_time;

            let remaining_demand = product.demand.saturating_sub(product.inventory);
            definitions.push(VariableDefinition::integer(
                0.0,
                f64::from(remaining_demand),
                product.profit.value(),
            ));
            capacity_terms.push((index, cycle_time.value()));
        }

        let mut constraints = Vec::with_capacity(tables.molds.len() + 1);
        constraints.push(Constraint::at_most(
            self.parameters.total_mount_hours().value(),
            capacity_terms,
        ));

        // Production using each mold is limited by the hours its copies can supply
        for (mold_id, mold) in &tables.molds {
            let terms: Vec<_> = tables
                .products
                .values()
                .enumerate()
                .filter(|(_, product)| product.mold_id == *mold_id)
                .map(|(index, _)| (index, mold.cycle_time.value()))
                .collect();
            if terms.is_empty() {
                continue;
            }

            constraints.push(Constraint::at_most(
                (self.parameters.run_hours * f64::from(mold.quantity)).value(),
                terms,
            ));
        }

        self.problem = Some(BuiltProblem {
            definitions,
            constraints,
        });
        self.solution = None;

        Ok(())
    }

    /// Solve the formulated problem with the given backend.
    pub fn solve(&mut self, backend: &dyn SolverBackend) -> Result<()> {
        let problem = self.problem.as_ref().context("model not yet built")?;
        let tables = self.tables.as_ref().context("data not yet loaded")?;

        let raw = backend.solve(&problem.definitions, &problem.constraints, Sense::Maximise)?;

        let quantities = tables
            .products
            .keys()
            .cloned()
            .zip(raw.values().iter().map(|value| value.round() as u32))
            .collect();

        self.solution = Some(AllocationTable {
            quantities,
            objective: raw.objective(),
        });

        Ok(())
    }

    /// Get the allocation table produced by a successful solve.
    ///
    /// Fails with a state error if no solve has completed.
    pub fn get_allocation(&self) -> Result<&AllocationTable> {
        self.solution.as_ref().context("solve not yet performed")
    }
}

/// Run the full allocation lifecycle for a loaded model.
///
/// # Arguments
///
/// * `model` - The model
/// * `backend` - The solver backend to use
///
/// # Returns
///
/// The allocation table, or an error if the model is invalid or the solve fails.
pub fn optimise_allocation(
    model: &Model,
    backend: &dyn SolverBackend,
) -> Result<AllocationTable> {
    info!("Performing allocation optimisation...");
    let mut max_profit = MaxProfit::new(model.parameters.clone())?;
    max_profit.load_data(model.products.clone(), model.molds.clone())?;
    max_profit.build_model()?;
    max_profit.solve(backend)?;

    let allocation = max_profit.get_allocation()?;
    info!("Optimal total profit: {}", allocation.objective);

    Ok(allocation.clone())
}
