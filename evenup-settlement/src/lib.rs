#![warn(clippy::uninlined_format_args)]

mod builder;
mod extract;
mod model;
mod solve;

use thiserror::Error;

pub use builder::SettlementModel;
pub use model::{
    AMOUNT_TOLERANCE, BALANCE_TOLERANCE, BalanceSheet, OrderedPair, Participant, ParticipantId,
    ReconciliationRecord, Settlement, Transfer, UnorderedPair,
};
pub use solve::SolvedModel;

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("At least two participants are required (found {0})")]
    TooFewParticipants(usize),
    #[error("Sum of balances must be zero (found {0})")]
    ImbalancedTotal(f64),
    #[error("Duplicate participant name '{0}'")]
    DuplicateParticipant(String),
    #[error("Solver reported the model infeasible; balance input or constraint generation is defective")]
    Infeasible,
    #[error("Solver failed: {0}")]
    Solver(String),
    #[error("Directional ledgers disagree for {from} -> {to} (payout {payout}, payment {payment})")]
    LedgerMismatch {
        from: String,
        to: String,
        payout: f64,
        payment: f64,
    },
    #[error("Settled transfers do not reconcile for {name} (required {required}, realized {realized})")]
    Reconciliation {
        name: String,
        required: f64,
        realized: f64,
    },
}

/// Builds the minimum-transaction model for a balance sheet, runs the
/// single blocking solve, and extracts the verified settlement.
pub fn settle(balances: &BalanceSheet) -> Result<Settlement, SettlementError> {
    let model = SettlementModel::build(balances)?;
    let solved = model.solve()?;
    Settlement::extract(&solved)
}

#[cfg(test)]
mod tests {
    use super::{AMOUNT_TOLERANCE, BalanceSheet, Settlement, SettlementError, settle};
    use proptest::prelude::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn sheet(entries: &[(&str, f64)]) -> BalanceSheet {
        BalanceSheet::from_entries(entries.iter().map(|&(name, net)| (name, net)))
            .expect("valid entries")
    }

    fn assert_balances_match(entries: &[(&str, f64)], settlement: &Settlement) {
        let mut realized: HashMap<&str, f64> =
            entries.iter().map(|&(name, _)| (name, 0.0)).collect();
        for transfer in &settlement.transfers {
            *realized.entry(transfer.from.as_str()).or_insert(0.0) -= transfer.amount;
            *realized.entry(transfer.to.as_str()).or_insert(0.0) += transfer.amount;
        }
        for &(name, net) in entries {
            let actual = realized.get(name).copied().unwrap_or(0.0);
            assert!(
                (actual - net).abs() <= AMOUNT_TOLERANCE,
                "balance mismatch for {name}: realized {actual}, required {net}"
            );
        }
    }

    #[rstest]
    #[case::one_creditor_two_debtors(&[("A", 1000.0), ("B", -500.0), ("C", -500.0)], 2)]
    #[case::two_creditors_one_debtor(&[("A", 300.0), ("B", 300.0), ("C", -600.0)], 2)]
    #[case::two_people(&[("A", 100.0), ("B", -100.0)], 1)]
    #[case::all_zero(&[("A", 0.0), ("B", 0.0), ("C", 0.0)], 0)]
    fn settles_with_minimum_transaction_count(
        #[case] entries: &[(&str, f64)],
        #[case] expected_count: usize,
    ) {
        let settlement = settle(&sheet(entries)).expect("expected solution");

        assert_eq!(settlement.transaction_count(), expected_count);
        for transfer in &settlement.transfers {
            assert!(transfer.amount > 0.0);
            assert_ne!(transfer.from, transfer.to);
        }
        assert_balances_match(entries, &settlement);
    }

    #[test]
    fn two_person_debt_flows_from_debtor_to_creditor() {
        let settlement = settle(&sheet(&[("A", 100.0), ("B", -100.0)])).expect("expected solution");

        assert_eq!(settlement.transaction_count(), 1);
        assert_eq!(settlement.transfers[0].from, "B");
        assert_eq!(settlement.transfers[0].to, "A");
        assert!((settlement.transfers[0].amount - 100.0).abs() <= AMOUNT_TOLERANCE);
    }

    #[test]
    fn single_debtor_pays_each_creditor_once() {
        let settlement =
            settle(&sheet(&[("A", 300.0), ("B", 300.0), ("C", -600.0)])).expect("expected solution");

        assert_eq!(settlement.transaction_count(), 2);
        for transfer in &settlement.transfers {
            assert_eq!(transfer.from, "C");
            assert!((transfer.amount - 300.0).abs() <= AMOUNT_TOLERANCE);
        }
    }

    #[test]
    fn chain_of_offsetting_debts_settles_below_star_bound() {
        // Two independent 100-unit debts; three transfers would also be
        // feasible but two are optimal.
        let entries = [("A", 100.0), ("B", 100.0), ("C", -100.0), ("D", -100.0)];
        let settlement = settle(&sheet(&entries)).expect("expected solution");

        assert_eq!(settlement.transaction_count(), 2);
        assert_balances_match(&entries, &settlement);
    }

    #[test]
    fn settlement_is_deterministic() {
        let entries = [("A", 700.0), ("B", 300.0), ("C", -400.0), ("D", -600.0)];
        let first = settle(&sheet(&entries)).expect("expected solution");
        let second = settle(&sheet(&entries)).expect("expected solution");

        assert_eq!(first, second);
    }

    #[test]
    fn reconciliation_reports_every_participant() {
        let entries = [("A", 100.0), ("B", -100.0), ("C", 0.0)];
        let settlement = settle(&sheet(&entries)).expect("expected solution");

        let names: Vec<&str> = settlement
            .reconciliation
            .iter()
            .map(|record| record.name.as_str())
            .collect();
        assert_eq!(names, ["A", "B", "C"]);
        for record in &settlement.reconciliation {
            assert!((record.realized - record.required).abs() <= AMOUNT_TOLERANCE);
        }
    }

    #[rstest]
    #[case::imbalanced(&[("A", 50.0), ("B", -40.0)])]
    fn rejects_imbalanced_total(#[case] entries: &[(&str, f64)]) {
        let result = settle(&sheet(entries));
        match result {
            Err(SettlementError::ImbalancedTotal(total)) => {
                assert!((total - 10.0).abs() < 1e-9);
            }
            other => panic!("expected imbalanced total error, got {other:?}"),
        }
    }

    #[rstest]
    #[case::empty(&[])]
    #[case::single(&[("A", 0.0)])]
    fn rejects_too_few_participants(#[case] entries: &[(&str, f64)]) {
        let result = settle(&sheet(entries));
        assert!(matches!(
            result,
            Err(SettlementError::TooFewParticipants(_))
        ));
    }

    proptest! {
        #[test]
        fn settlements_reconstruct_required_nets(
            people_count in 2usize..=5,
            balances in prop::collection::vec(-200i64..=200, 1..=4),
        ) {
            let names = ["A", "B", "C", "D", "E"];
            let mut entries = Vec::with_capacity(people_count);
            let mut sum = 0i64;
            for idx in 0..people_count - 1 {
                let balance = *balances.get(idx).unwrap_or(&0);
                sum += balance;
                entries.push((names[idx], balance as f64));
            }
            entries.push((names[people_count - 1], -sum as f64));

            let settlement = settle(&sheet(&entries)).expect("expected solution");

            for transfer in &settlement.transfers {
                prop_assert!(transfer.amount > 0.0);
                prop_assert_ne!(&transfer.from, &transfer.to);
            }
            assert_balances_match(&entries, &settlement);

            // Star bound: one designated participant settling with all
            // others is always feasible, so the optimum never needs
            // more than N - 1 transfers.
            prop_assert!(settlement.transaction_count() <= people_count - 1);

            // Every participant with a non-zero net is touched by at
            // least one transfer, and each transfer touches two.
            let nonzero = entries.iter().filter(|(_, net)| *net != 0.0).count();
            prop_assert!(settlement.transaction_count() >= nonzero.div_ceil(2));
            if nonzero == 0 {
                prop_assert_eq!(settlement.transaction_count(), 0);
            }
        }

        #[test]
        fn zero_balances_settle_without_transfers(people_count in 2usize..=5) {
            let names = ["A", "B", "C", "D", "E"];
            let entries: Vec<(&str, f64)> = names[..people_count]
                .iter()
                .map(|&name| (name, 0.0))
                .collect();

            let settlement = settle(&sheet(&entries)).expect("expected solution");
            prop_assert!(settlement.transfers.is_empty());
        }
    }
}
