//! The production scheduling model.
//!
//! [`ProductionSchedule`] assigns products to arms and discretised time slots so that production
//! targets (normally the output of [`crate::allocation`]) are met within the run horizon. Each
//! arm hosts at most one mold configuration per slot and each mold can be on no more arms than
//! there are physical copies of it. The objective minimises the number of mold changeovers, with
//! a small tie-breaking preference for leaving arms idle over producing unneeded units.
use crate::allocation::AllocationTable;
use crate::model::{
    Model, ModelParameters, MoldID, MoldMap, PreviousMounts, ProductID, ProductMap,
    check_tables_consistent,
};
use crate::solver::{Constraint, Sense, SolverBackend, VariableDefinition};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use itertools::iproduct;
use log::info;

/// One production assignment in the schedule: a single arm running a single product for one slot
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    /// The arm the product is produced on (zero-based)
    pub arm: u32,
    /// The time slot (zero-based)
    pub slot: u32,
    /// The mold mounted on the arm
    pub mold_id: MoldID,
    /// The product produced
    pub product_id: ProductID,
    /// Units produced during the slot, across all the arm's mounts
    pub quantity: f64,
}

/// The result of a successful scheduling optimisation
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleTable {
    /// Production assignments, ordered by arm then slot
    pub entries: Vec<ScheduleEntry>,
    /// The total number of mold changeovers the schedule requires
    pub changeovers: u32,
}

/// The input tables after loading
struct LoadedTables {
    products: ProductMap,
    molds: MoldMap,
    targets: IndexMap<ProductID, u32>,
    previous_mounts: PreviousMounts,
}

/// Maps (product/mold, arm, slot) combinations to variable indices.
///
/// Variables are laid out as all `run` variables, then all `mounted` variables, then all
/// `change` variables.
struct VariableLayout {
    n_products: usize,
    n_molds: usize,
    arms: usize,
    n_slots: usize,
}

impl VariableLayout {
    /// Index of the binary variable: arm `a` runs product `p` during slot `t`
    fn run(&self, p: usize, a: usize, t: usize) -> usize {
        (p * self.arms + a) * self.n_slots + t
    }

    /// Index of the binary variable: arm `a` carries mold `m` during slot `t`
    fn mounted(&self, m: usize, a: usize, t: usize) -> usize {
        self.n_products * self.arms * self.n_slots + (m * self.arms + a) * self.n_slots + t
    }

    /// Index of the binary variable: arm `a` changes mold at the start of slot `t`
    fn change(&self, a: usize, t: usize) -> usize {
        (self.n_products + self.n_molds) * self.arms * self.n_slots + a * self.n_slots + t
    }

    fn n_vars(&self) -> usize {
        (self.n_products + self.n_molds + 1) * self.arms * self.n_slots
    }
}

/// The formulated problem, ready to hand to a solver backend
struct BuiltProblem {
    definitions: Vec<VariableDefinition>,
    constraints: Vec<Constraint>,
    layout: VariableLayout,
    /// Units produced per active slot for each product, in product order
    rates: Vec<f64>,
}

/// Builds and solves the arm/time-slot scheduling problem.
///
/// The lifecycle mirrors [`crate::allocation::MaxProfit`]: load data, build model, solve,
/// extract results, with state errors for calls out of order.
pub struct ProductionSchedule {
    parameters: ModelParameters,
    tables: Option<LoadedTables>,
    problem: Option<BuiltProblem>,
    solution: Option<ScheduleTable>,
}

impl ProductionSchedule {
    /// Create a new scheduling model with the given capacity parameters.
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

    /// Load the input tables and production targets.
    ///
    /// # Arguments
    ///
    /// * `products` - The product table
    /// * `molds` - The mold table
    /// * `targets` - Units of each product the schedule must produce; missing products mean zero
    /// * `previous_mounts` - Molds left on each arm by the previous run, if known
    pub fn load_data(
        &mut self,
        products: ProductMap,
        molds: MoldMap,
        targets: IndexMap<ProductID, u32>,
        previous_mounts: PreviousMounts,
    ) -> Result<()> {
        check_tables_consistent(&products, &molds)?;

        for product_id in targets.keys() {
            ensure!(
                products.contains_key(product_id),
                "Production target given for unknown product {product_id}"
            );
        }

        for (arm, mold_id) in &previous_mounts {
            ensure!(
                *arm < self.parameters.arms,
                "Previous mount given for arm {} but the model has {} arms",
                arm,
                self.parameters.arms
            );
            ensure!(
                molds.contains_key(mold_id),
                "Previous mount for arm {arm} references unknown mold {mold_id}"
            );
        }

        self.tables = Some(LoadedTables {
            products,
            molds,
            targets,
            previous_mounts,
        });
        self.problem = None;
        self.solution = None;

        Ok(())
    }

    /// Formulate the scheduling problem from the loaded tables.
    pub fn build_model(&mut self) -> Result<()> {
        let tables = self.tables.as_ref().context("data not yet loaded")?;

        let layout = VariableLayout {
            n_products: tables.products.len(),
            n_molds: tables.molds.len(),
            arms: self.parameters.arms as usize,
            n_slots: self.parameters.n_slots() as usize,
        };

        // Units produced per active slot: every mount on the arm carries the product's mold
        let rates: Vec<f64> = tables
            .products
            .values()
            .map(|product| {
                let cycle_time = tables.molds[&product.mold_id].cycle_time;
                f64::from(self.parameters.mounts_per_arm) * (self.parameters.slot_hours / cycle_time)
            })
            .collect();

        // Small enough that avoiding idle production never trades off against a changeover
        let epsilon = 0.5 / (layout.arms * layout.n_slots) as f64;

        let mut definitions = Vec::with_capacity(layout.n_vars());
        definitions.resize_with(layout.n_products * layout.arms * layout.n_slots, || {
            VariableDefinition::binary(epsilon)
        });
        definitions.resize_with(
            (layout.n_products + layout.n_molds) * layout.arms * layout.n_slots,
            || VariableDefinition::binary(0.0),
        );
        definitions.resize_with(layout.n_vars(), || VariableDefinition::binary(1.0));

        let mut constraints = Vec::new();
        self.add_occupancy_constraints(&mut constraints, tables, &layout);
        self.add_mold_availability_constraints(&mut constraints, tables, &layout);
        self.add_target_constraints(&mut constraints, tables, &layout, &rates);
        self.add_changeover_constraints(&mut constraints, tables, &layout);

        self.problem = Some(BuiltProblem {
            definitions,
            constraints,
            layout,
            rates,
        });
        self.solution = None;

        Ok(())
    }

    /// Each arm/slot runs at most one product and carries at most one mold, and a product can
    /// only run on an arm carrying its mold.
    fn add_occupancy_constraints(
        &self,
        constraints: &mut Vec<Constraint>,
        tables: &LoadedTables,
        layout: &VariableLayout,
    ) {
        for (a, t) in iproduct!(0..layout.arms, 0..layout.n_slots) {
            let run_terms = (0..layout.n_products)
                .map(|p| (layout.run(p, a, t), 1.0))
                .collect();
            constraints.push(Constraint::at_most(1.0, run_terms));

            let mounted_terms = (0..layout.n_molds)
                .map(|m| (layout.mounted(m, a, t), 1.0))
                .collect();
            constraints.push(Constraint::at_most(1.0, mounted_terms));
        }

        for (p, product) in tables.products.values().enumerate() {
            // NB: consistency was checked in load_data, so the mold must exist
            let m = tables.molds.get_index_of(&product.mold_id).unwrap();
            for (a, t) in iproduct!(0..layout.arms, 0..layout.n_slots) {
                constraints.push(Constraint::at_most(
                    0.0,
                    vec![(layout.run(p, a, t), 1.0), (layout.mounted(m, a, t), -1.0)],
                ));
            }
        }
    }

    /// A mold can be mounted on no more arms at once than there are physical copies of it
    fn add_mold_availability_constraints(
        &self,
        constraints: &mut Vec<Constraint>,
        tables: &LoadedTables,
        layout: &VariableLayout,
    ) {
        for (m, mold) in tables.molds.values().enumerate() {
            // Can't bind with fewer arms than copies
            if u64::from(mold.quantity) >= layout.arms as u64 {
                continue;
            }

            for t in 0..layout.n_slots {
                let terms = (0..layout.arms)
                    .map(|a| (layout.mounted(m, a, t), 1.0))
                    .collect();
                constraints.push(Constraint::at_most(f64::from(mold.quantity), terms));
            }
        }
    }

    /// Cumulative production of each product must reach its target within the horizon
    fn add_target_constraints(
        &self,
        constraints: &mut Vec<Constraint>,
        tables: &LoadedTables,
        layout: &VariableLayout,
        rates: &[f64],
    ) {
        for (p, product_id) in tables.products.keys().enumerate() {
            let target = tables.targets.get(product_id).copied().unwrap_or(0);
            if target == 0 {
                continue;
            }

            let terms = iproduct!(0..layout.arms, 0..layout.n_slots)
                .map(|(a, t)| (layout.run(p, a, t), rates[p]))
                .collect();
            constraints.push(Constraint::at_least(f64::from(target), terms));
        }
    }

    /// A changeover is charged whenever an arm carries a mold it wasn't carrying in the previous
    /// slot. At slot zero the comparison is against the previous run's mounts; if those are
    /// unknown, the first mounting is free.
    fn add_changeover_constraints(
        &self,
        constraints: &mut Vec<Constraint>,
        tables: &LoadedTables,
        layout: &VariableLayout,
    ) {
        for (m, a) in iproduct!(0..layout.n_molds, 0..layout.arms) {
            for t in 1..layout.n_slots {
                constraints.push(Constraint::at_most(
                    0.0,
                    vec![
                        (layout.mounted(m, a, t), 1.0),
                        (layout.mounted(m, a, t - 1), -1.0),
                        (layout.change(a, t), -1.0),
                    ],
                ));
            }
        }

        for (arm, mold_id) in &tables.previous_mounts {
            let a = *arm as usize;
            // NB: validated in load_data
            let previous = tables.molds.get_index_of(mold_id).unwrap();
            for m in (0..layout.n_molds).filter(|&m| m != previous) {
                constraints.push(Constraint::at_most(
                    0.0,
                    vec![(layout.mounted(m, a, 0), 1.0), (layout.change(a, 0), -1.0)],
                ));
            }
        }
    }

    /// Solve the formulated problem with the given backend.
    pub fn solve(&mut self, backend: &dyn SolverBackend) -> Result<()> {
        let problem = self.problem.as_ref().context("model not yet built")?;
        let tables = self.tables.as_ref().context("data not yet loaded")?;

        let raw = backend.solve(&problem.definitions, &problem.constraints, Sense::Minimise)?;
        let values = raw.values();
        let layout = &problem.layout;

        let mut entries = Vec::new();
        for (a, t) in iproduct!(0..layout.arms, 0..layout.n_slots) {
            for (p, product) in tables.products.values().enumerate() {
                if values[layout.run(p, a, t)] > 0.5 {
                    entries.push(ScheduleEntry {
                        arm: a as u32,
                        slot: t as u32,
                        mold_id: product.mold_id.clone(),
                        product_id: product.id.clone(),
                        quantity: problem.rates[p],
                    });
                }
            }
        }

        let changeovers = iproduct!(0..layout.arms, 0..layout.n_slots)
            .map(|(a, t)| values[layout.change(a, t)].round() as u32)
            .sum();

        self.solution = Some(ScheduleTable {
            entries,
            changeovers,
        });

        Ok(())
    }

    /// Get the schedule table produced by a successful solve.
    ///
    /// Fails with a state error if no solve has completed.
    pub fn get_schedule(&self) -> Result<&ScheduleTable> {
        self.solution.as_ref().context("solve not yet performed")
    }
}

/// Run the full scheduling lifecycle for a loaded model.
///
/// # Arguments
///
/// * `model` - The model
/// * `allocation` - The allocation whose quantities become the production targets
/// * `backend` - The solver backend to use
///
/// # Returns
///
/// The schedule table, or an error if the model is invalid or the solve fails.
pub fn optimise_schedule(
    model: &Model,
    allocation: &AllocationTable,
    backend: &dyn SolverBackend,
) -> Result<ScheduleTable> {
    info!("Performing schedule optimisation...");
    let mut schedule = ProductionSchedule::new(model.parameters.clone())?;
    schedule.load_data(
        model.products.clone(),
        model.molds.clone(),
        allocation.quantities.clone(),
        model.previous_mounts.clone(),
    )?;
    schedule.build_model()?;
    schedule.solve(backend)?;

    let table = schedule.get_schedule()?;
    info!("Schedule requires {} mold changeover(s)", table.changeovers);

    Ok(table.clone())
}
