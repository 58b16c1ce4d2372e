use crate::{
    SettlementError,
    model::{AMOUNT_TOLERANCE, ReconciliationRecord, Settlement, Transfer},
    solve::SolvedModel,
};
use std::collections::HashMap;

impl Settlement {
    /// Converts solved variable values into the canonical transfer list
    /// and verifies that it reconstructs every required net amount.
    pub fn extract(solved: &SolvedModel) -> Result<Self, SettlementError> {
        let mut transfers = Vec::new();

        for (pair, &z) in &solved.indicator {
            if z < 0.5 {
                continue;
            }
            let (lo_side, hi_side) = pair.sides();
            // payout(owner, partner) is what `owner` received from
            // `partner`, so the partner is the payer.
            let lo_received = solved.payout.get(&lo_side).copied().unwrap_or(0.0);
            let hi_received = solved.payout.get(&hi_side).copied().unwrap_or(0.0);

            let (receiver_side, payer_booked, amount) = if lo_received > AMOUNT_TOLERANCE {
                let booked = solved.payment.get(&hi_side).copied().unwrap_or(0.0);
                (lo_side, booked, lo_received)
            } else if hi_received > AMOUNT_TOLERANCE {
                let booked = solved.payment.get(&lo_side).copied().unwrap_or(0.0);
                (hi_side, booked, hi_received)
            } else {
                // Indicator slack: the solver may leave z at 1 with no
                // flow when another optimum has the same count.
                continue;
            };

            let receiver = &solved.participants[receiver_side.owner().0];
            let payer = &solved.participants[receiver_side.partner().0];
            if (payer_booked + amount).abs() > AMOUNT_TOLERANCE {
                return Err(SettlementError::LedgerMismatch {
                    from: payer.name.clone(),
                    to: receiver.name.clone(),
                    payout: amount,
                    payment: payer_booked,
                });
            }

            transfers.push(Transfer {
                from: payer.name.clone(),
                to: receiver.name.clone(),
                amount,
            });
        }

        transfers.sort_unstable_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));

        let reconciliation = reconcile(solved, &transfers)?;
        Ok(Self {
            transfers,
            reconciliation,
        })
    }
}

/// Recomputes each participant's realized net from the emitted
/// transfers and requires it to match the required net.
fn reconcile(
    solved: &SolvedModel,
    transfers: &[Transfer],
) -> Result<Vec<ReconciliationRecord>, SettlementError> {
    let mut realized: HashMap<&str, f64> = solved
        .participants
        .iter()
        .map(|p| (p.name.as_str(), 0.0))
        .collect();
    for transfer in transfers {
        *realized.entry(transfer.from.as_str()).or_insert(0.0) -= transfer.amount;
        *realized.entry(transfer.to.as_str()).or_insert(0.0) += transfer.amount;
    }

    let mut records = Vec::with_capacity(solved.participants.len());
    for participant in &solved.participants {
        let realized = realized
            .get(participant.name.as_str())
            .copied()
            .unwrap_or(0.0);
        if (realized - participant.net).abs() > AMOUNT_TOLERANCE {
            return Err(SettlementError::Reconciliation {
                name: participant.name.clone(),
                required: participant.net,
                realized,
            });
        }
        records.push(ReconciliationRecord {
            name: participant.name.clone(),
            required: participant.net,
            realized,
        });
    }
    Ok(records)
}
