use crate::{
    SettlementError,
    model::{BALANCE_TOLERANCE, BalanceSheet, OrderedPair, Participant, ParticipantId, UnorderedPair},
};
use good_lp::{Constraint, Expression, ProblemVariables, Variable, variable, variables};
use std::collections::BTreeMap;

/// Big-M coefficients bounding any single transfer amount.
///
/// No feasible solution ever needs a single transfer larger than the
/// largest single net imbalance: a participant's directional ledger
/// sums to exactly their net, so each entry in it is bounded by that
/// net. Taking the extremes over all participants therefore bounds
/// every pair amount without cutting off an optimum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TransferBounds {
    pub max_payout: f64,
    pub max_payment: f64,
}

impl TransferBounds {
    fn from_participants(participants: &[Participant]) -> Self {
        let max_payout = participants.iter().map(|p| p.net).fold(0.0, f64::max);
        let max_payment = -participants.iter().map(|p| p.net).fold(0.0, f64::min);
        Self {
            max_payout,
            max_payment,
        }
    }
}

/// Immutable minimum-transaction model: variables, constraints, and
/// objective are built once from a balance sheet and never mutated.
/// Solving consumes the model and yields a plain-value result.
pub struct SettlementModel {
    pub(crate) participants: Vec<Participant>,
    pub(crate) bounds: TransferBounds,
    pub(crate) vars: ProblemVariables,
    pub(crate) payout: BTreeMap<OrderedPair, Variable>,
    pub(crate) payment: BTreeMap<OrderedPair, Variable>,
    pub(crate) indicator: BTreeMap<UnorderedPair, Variable>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) objective: Expression,
}

// `ProblemVariables` (and other good_lp internals) don't implement
// `Debug`, so derive is unavailable; show only the plain-value fields.
impl std::fmt::Debug for SettlementModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettlementModel")
            .field("participants", &self.participants)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

impl SettlementModel {
    /// Builds the full variable and constraint set for a balance sheet.
    ///
    /// Rejects sheets with fewer than two participants or a total that
    /// departs from zero beyond [`BALANCE_TOLERANCE`].
    pub fn build(balances: &BalanceSheet) -> Result<Self, SettlementError> {
        let participants: Vec<Participant> = balances
            .iter()
            .map(|(name, net)| Participant {
                name: name.to_string(),
                net,
            })
            .collect();

        if participants.len() < 2 {
            return Err(SettlementError::TooFewParticipants(participants.len()));
        }
        let total = balances.total();
        if total.abs() > BALANCE_TOLERANCE {
            return Err(SettlementError::ImbalancedTotal(total));
        }

        let bounds = TransferBounds::from_participants(&participants);
        let mut vars = variables!();

        // One payout (>= 0) and one payment (<= 0) per directional ledger.
        let mut payout = BTreeMap::new();
        let mut payment = BTreeMap::new();
        for i in 0..participants.len() {
            for j in 0..participants.len() {
                let Some(pair) = OrderedPair::new(ParticipantId(i), ParticipantId(j)) else {
                    continue;
                };
                payout.insert(pair, vars.add(variable().min(0.0)));
                payment.insert(pair, vars.add(variable().max(0.0)));
            }
        }

        // One binary transaction indicator per unordered pair. Indexing
        // the indicator once per pair keeps the objective an exact
        // transaction count; no directional duplicates to reconcile.
        let mut indicator = BTreeMap::new();
        let mut objective = Expression::with_capacity(participants.len() * participants.len() / 2);
        for i in 0..participants.len() {
            for j in (i + 1)..participants.len() {
                let Some(pair) = UnorderedPair::new(ParticipantId(i), ParticipantId(j)) else {
                    continue;
                };
                let z = vars.add(variable().binary());
                objective.add_mul(1.0, z);
                indicator.insert(pair, z);
            }
        }

        let mut constraints = Vec::new();
        for (pair, &z) in &indicator {
            let (lo_side, hi_side) = pair.sides();
            constraints.push(net_zero_coupling(payout[&lo_side], payment[&hi_side]));
            constraints.push(net_zero_coupling(payout[&hi_side], payment[&lo_side]));
            constraints.push(payout_indicator_bound(payout[&lo_side], z, bounds.max_payout));
            constraints.push(payout_indicator_bound(payout[&hi_side], z, bounds.max_payout));
            constraints.push(payment_indicator_bound(payment[&lo_side], z, bounds.max_payment));
            constraints.push(payment_indicator_bound(payment[&hi_side], z, bounds.max_payment));
        }
        for (i, participant) in participants.iter().enumerate() {
            let owner = ParticipantId(i);
            let payouts = ledger_sum(&payout, owner);
            let payments = ledger_sum(&payment, owner);
            let (payout_row, payment_row) = balance_rows(participant.net, payouts, payments);
            constraints.push(payout_row);
            constraints.push(payment_row);
        }

        Ok(Self {
            participants,
            bounds,
            vars,
            payout,
            payment,
            indicator,
            constraints,
            objective,
        })
    }
}

/// The two directional ledgers describe one physical amount:
/// `payout(a, b) + payment(b, a) = 0`.
pub(crate) fn net_zero_coupling(payout: Variable, opposing_payment: Variable) -> Constraint {
    (Expression::from(payout) + opposing_payment).eq(0.0)
}

/// `payout - max_payout * z <= 0`: a strictly positive payout forces
/// the pair's indicator to 1. The bound alone does not force z back to
/// 0 at payout = 0; objective minimization does.
pub(crate) fn payout_indicator_bound(
    payout: Variable,
    indicator: Variable,
    max_payout: f64,
) -> Constraint {
    (payout - max_payout * indicator).leq(0.0)
}

/// `payment + max_payment * z >= 0`: the non-positive mirror of
/// [`payout_indicator_bound`].
pub(crate) fn payment_indicator_bound(
    payment: Variable,
    indicator: Variable,
    max_payment: f64,
) -> Constraint {
    (max_payment * indicator + payment).geq(0.0)
}

/// Sum of one participant's directional ledger entries.
fn ledger_sum(ledger: &BTreeMap<OrderedPair, Variable>, owner: ParticipantId) -> Expression {
    let mut sum = Expression::default();
    for (pair, &var) in ledger {
        if pair.owner() == owner {
            sum.add_mul(1.0, var);
        }
    }
    sum
}

/// Per-participant balance rows. A participant owed money collects it
/// entirely through payouts; a participant owing money discharges it
/// entirely through payments. The other ledger is pinned to zero.
fn balance_rows(net: f64, payouts: Expression, payments: Expression) -> (Constraint, Constraint) {
    if net >= 0.0 {
        (payouts.eq(net), payments.eq(0.0))
    } else {
        (payouts.eq(0.0), payments.eq(net))
    }
}
