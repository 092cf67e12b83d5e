//! Provides data structures and functions for performing optimisation.
//!
//! The model builders in [`crate::allocation`] and [`crate::schedule`] describe their problems
//! with the types in this module and hand them to a [`SolverBackend`]. Any compliant LP/MILP
//! solver can sit behind the trait; the default implementation wraps the HiGHS solver.
use crate::units::Money;
pub use highs::Sense;
use highs::{HighsModelStatus, RowProblem};
use std::error::Error;
use std::fmt;

/// The definition of a variable to be optimised.
///
/// The objective coefficients represent the multiplying factors in the objective function to
/// maximise or minimise, i.e. the Cs in:
///
/// f = c1*x1 + c2*x2 + ...
///
/// with x1, x2... taking values between min and max.
#[derive(PartialEq, Debug)]
pub struct VariableDefinition {
    /// The variable's minimum value
    pub min: f64,
    /// The variable's maximum value
    pub max: f64,
    /// The coefficient of the variable in the objective
    pub objective: f64,
    /// Whether the variable is restricted to integer values
    pub integer: bool,
}

impl VariableDefinition {
    /// A continuous variable with the given bounds and objective coefficient
    pub fn continuous(min: f64, max: f64, objective: f64) -> Self {
        Self {
            min,
            max,
            objective,
            integer: false,
        }
    }

    /// An integer variable with the given bounds and objective coefficient
    pub fn integer(min: f64, max: f64, objective: f64) -> Self {
        Self {
            min,
            max,
            objective,
            integer: true,
        }
    }

    /// A binary variable with the given objective coefficient
    pub fn binary(objective: f64) -> Self {
        Self::integer(0.0, 1.0, objective)
    }
}

/// A constraint for an optimisation.
///
/// Each constraint adds an inequality equation to the problem to solve of the form:
///
/// min <= a1*x1 + a2*x2 + ... <= max
///
/// Often, constraints will impose only a min or a max value, with the other set to infinity or
/// minus infinity. Terms are sparse: each entry pairs a variable's index (its position in the
/// slice of [`VariableDefinition`]s) with its coefficient.
#[derive(PartialEq, Debug)]
pub struct Constraint {
    /// The minimum value for the constraint
    pub min: f64,
    /// The maximum value for the constraint
    pub max: f64,
    /// The variable indices and coefficients making up the constraint
    pub terms: Vec<(usize, f64)>,
}

impl Constraint {
    /// A constraint imposing only an upper bound on its terms
    pub fn at_most(max: f64, terms: Vec<(usize, f64)>) -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max,
            terms,
        }
    }

    /// A constraint imposing only a lower bound on its terms
    pub fn at_least(min: f64, terms: Vec<(usize, f64)>) -> Self {
        Self {
            min,
            max: f64::INFINITY,
            terms,
        }
    }
}

/// The variable values and objective value for a solved problem
#[derive(Debug, Clone, PartialEq)]
pub struct RawSolution {
    values: Vec<f64>,
    objective: Money,
}

impl RawSolution {
    /// The value assigned to each variable, in definition order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The objective value for the solution
    pub fn objective(&self) -> Money {
        self.objective
    }
}

/// An error signalled by the solver backend.
///
/// Infeasibility and unboundedness are properties of the model rather than bugs, so they get
/// their own variants which callers can downcast to.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// No variable assignment satisfies the constraints
    Infeasible,
    /// The objective can be improved without bound
    Unbounded,
    /// The solver's time limit was reached before an optimal solution was found
    TimeLimitReached,
    /// The solver failed for another reason (e.g. it is unavailable or mis-built)
    Backend(String),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SolveError::Infeasible => write!(f, "Model is infeasible"),
            SolveError::Unbounded => write!(f, "Model is unbounded"),
            SolveError::TimeLimitReached => write!(f, "Solver time limit reached"),
            SolveError::Backend(status) => write!(f, "Solver failed with status {status}"),
        }
    }
}

impl Error for SolveError {}

/// An LP/MILP solver capable of solving the problems this crate builds
pub trait SolverBackend {
    /// Solve the problem described by `definitions` and `constraints`.
    ///
    /// # Arguments
    ///
    /// * `definitions` - The definitions of the variables
    /// * `constraints` - The constraints for the optimisation problem
    /// * `sense` - Whether this is a maximisation or minimisation problem
    ///
    /// # Returns
    ///
    /// The variable values and objective value for an optimal solution, or a [`SolveError`].
    fn solve(
        &self,
        definitions: &[VariableDefinition],
        constraints: &[Constraint],
        sense: Sense,
    ) -> Result<RawSolution, SolveError>;
}

/// A [`SolverBackend`] wrapping the HiGHS solver
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighsBackend {
    /// Wall-clock limit for a single solve, in seconds
    pub time_limit: Option<f64>,
    /// Relative MIP gap at which the solver may stop early
    pub mip_gap: Option<f64>,
}

impl SolverBackend for HighsBackend {
    fn solve(
        &self,
        definitions: &[VariableDefinition],
        constraints: &[Constraint],
        sense: Sense,
    ) -> Result<RawSolution, SolveError> {
        let mut problem = RowProblem::default();

        // Add variables
        let mut vars = Vec::with_capacity(definitions.len());
        for def in definitions {
            let var = if def.integer {
                problem.add_integer_column(def.objective, def.min..=def.max)
            } else {
                problem.add_column(def.objective, def.min..=def.max)
            };
            vars.push(var);
        }

        // Add constraints
        for constraint in constraints {
            let row: Vec<_> = constraint
                .terms
                .iter()
                .map(|&(index, coeff)| (vars[index], coeff))
                .collect();
            problem.add_row(constraint.min..=constraint.max, row);
        }

        let mut model = problem.optimise(sense);
        model.set_option("output_flag", false);
        if let Some(time_limit) = self.time_limit {
            model.set_option("time_limit", time_limit);
        }
        if let Some(mip_gap) = self.mip_gap {
            model.set_option("mip_rel_gap", mip_gap);
        }

        let solved = model.solve();
        match solved.status() {
            HighsModelStatus::Optimal => {
                let values = solved.get_solution().columns().to_vec();

                // Recompute the objective from the column values rather than relying on the
                // solver reporting it
                let objective = definitions
                    .iter()
                    .zip(&values)
                    .map(|(def, value)| def.objective * value)
                    .sum();

                Ok(RawSolution {
                    values,
                    objective: Money(objective),
                })
            }
            HighsModelStatus::Infeasible => Err(SolveError::Infeasible),
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                Err(SolveError::Unbounded)
            }
            HighsModelStatus::ReachedTimeLimit => Err(SolveError::TimeLimitReached),
            status => Err(SolveError::Backend(format!("{status:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_solve_lp() {
        // maximise 2x + y s.t. x + y <= 4, x <= 3, 0 <= x, y
        let definitions = [
            VariableDefinition::continuous(0.0, 3.0, 2.0),
            VariableDefinition::continuous(0.0, f64::INFINITY, 1.0),
        ];
        let constraints = [Constraint::at_most(4.0, vec![(0, 1.0), (1, 1.0)])];

        let solution = HighsBackend::default()
            .solve(&definitions, &constraints, Sense::Maximise)
            .unwrap();
        assert_approx_eq!(f64, solution.values()[0], 3.0);
        assert_approx_eq!(f64, solution.values()[1], 1.0);
        assert_approx_eq!(f64, solution.objective().value(), 7.0);
    }

    #[test]
    fn test_solve_integer() {
        // maximise x over integer 0 <= x <= 2.5
        let definitions = [VariableDefinition::integer(0.0, 2.5, 1.0)];

        let solution = HighsBackend::default()
            .solve(&definitions, &[], Sense::Maximise)
            .unwrap();
        assert_approx_eq!(f64, solution.values()[0], 2.0);
    }

    #[test]
    fn test_solve_infeasible() {
        // x <= 1 with constraint x >= 2
        let definitions = [VariableDefinition::continuous(0.0, 1.0, 1.0)];
        let constraints = [Constraint::at_least(2.0, vec![(0, 1.0)])];

        let result = HighsBackend::default().solve(&definitions, &constraints, Sense::Maximise);
        assert_eq!(result.unwrap_err(), SolveError::Infeasible);
    }

    #[test]
    fn test_solve_unbounded() {
        let definitions = [VariableDefinition::continuous(0.0, f64::INFINITY, 1.0)];

        let result = HighsBackend::default().solve(&definitions, &[], Sense::Maximise);
        assert_eq!(result.unwrap_err(), SolveError::Unbounded);
    }
}
