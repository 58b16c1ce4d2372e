use crate::{
    SettlementError,
    builder::SettlementModel,
    model::{OrderedPair, Participant, UnorderedPair},
};
use good_lp::{ResolutionError, Solution, SolverModel, default_solver};
use std::collections::BTreeMap;

/// Solved variable assignments, decoupled from any solver handle.
/// Derived once from an optimal solve and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedModel {
    pub(crate) participants: Vec<Participant>,
    pub(crate) payout: BTreeMap<OrderedPair, f64>,
    pub(crate) payment: BTreeMap<OrderedPair, f64>,
    pub(crate) indicator: BTreeMap<UnorderedPair, f64>,
    pub(crate) objective_value: f64,
}

impl SolvedModel {
    /// The solved objective: the number of transaction indicators set.
    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }
}

impl SettlementModel {
    /// Runs the single blocking MIP solve and captures every variable
    /// value. The model is deterministic, so a failed solve is not
    /// retried here; retry policy belongs to the caller.
    pub fn solve(self) -> Result<SolvedModel, SettlementError> {
        let Self {
            participants,
            vars,
            payout,
            payment,
            indicator,
            constraints,
            objective,
            ..
        } = self;

        let mut problem = vars.minimise(objective).using(default_solver);
        for constraint in constraints {
            problem = problem.with(constraint);
        }
        let solution = problem.solve().map_err(map_resolution_error)?;

        let payout: BTreeMap<OrderedPair, f64> = payout
            .into_iter()
            .map(|(pair, var)| (pair, solution.value(var)))
            .collect();
        let payment: BTreeMap<OrderedPair, f64> = payment
            .into_iter()
            .map(|(pair, var)| (pair, solution.value(var)))
            .collect();
        let indicator: BTreeMap<UnorderedPair, f64> = indicator
            .into_iter()
            .map(|(pair, var)| (pair, solution.value(var)))
            .collect();
        let objective_value = indicator.values().sum();

        Ok(SolvedModel {
            participants,
            payout,
            payment,
            indicator,
            objective_value,
        })
    }
}

/// Infeasibility with a valid balance sheet means the constraint set
/// itself is defective; everything else is surfaced as a backend
/// failure verbatim.
fn map_resolution_error(err: ResolutionError) -> SettlementError {
    match err {
        ResolutionError::Infeasible => SettlementError::Infeasible,
        other => SettlementError::Solver(format!("{other:?}")),
    }
}
