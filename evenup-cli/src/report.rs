use evenup_settlement::Settlement;
use std::fmt::Write;

const SEPARATOR_WIDTH: usize = 20;

/// Renders the transfer list and the per-participant reconciliation as
/// a plain-text report with width-aligned names.
pub fn render(settlement: &Settlement) -> String {
    let name_width = settlement
        .reconciliation
        .iter()
        .map(|record| record.name.len())
        .max()
        .unwrap_or(0)
        + 1;

    let mut out = String::new();
    out.push_str("Transfers:\n");
    if settlement.transfers.is_empty() {
        out.push_str("(none)\n");
    }
    for transfer in &settlement.transfers {
        let _ = writeln!(
            out,
            "{:<name_width$} -> {:<name_width$} {}",
            transfer.from, transfer.to, transfer.amount
        );
    }

    let _ = writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH));
    out.push_str("Net transactions:\n");
    for record in &settlement.reconciliation {
        let _ = writeln!(
            out,
            "{:<name_width$} {} (Expected: {})",
            record.name, record.realized, record.required
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::render;
    use evenup_settlement::{ReconciliationRecord, Settlement, Transfer};

    fn settlement() -> Settlement {
        Settlement {
            transfers: vec![
                Transfer {
                    from: "Bob".to_string(),
                    to: "Al".to_string(),
                    amount: 500.0,
                },
                Transfer {
                    from: "Carol".to_string(),
                    to: "Al".to_string(),
                    amount: 500.0,
                },
            ],
            reconciliation: vec![
                ReconciliationRecord {
                    name: "Al".to_string(),
                    required: 1000.0,
                    realized: 1000.0,
                },
                ReconciliationRecord {
                    name: "Bob".to_string(),
                    required: -500.0,
                    realized: -500.0,
                },
                ReconciliationRecord {
                    name: "Carol".to_string(),
                    required: -500.0,
                    realized: -500.0,
                },
            ],
        }
    }

    #[test]
    fn aligns_names_to_widest_participant() {
        let report = render(&settlement());
        assert!(report.contains("Bob    -> Al     500"));
        assert!(report.contains("Carol  -> Al     500"));
        assert!(report.contains("Al     1000 (Expected: 1000)"));
    }

    #[test]
    fn empty_settlement_renders_placeholder() {
        let report = render(&Settlement {
            transfers: Vec::new(),
            reconciliation: Vec::new(),
        });
        assert!(report.contains("Transfers:\n(none)\n"));
        assert!(report.contains("Net transactions:"));
    }
}
