use evenup_settlement::BalanceSheet;
use std::{borrow::Cow, fs::File, io::Read};

/// Loads a two-column balance table (`name, net_amount`) with a header
/// row. Positive amounts are owed to the participant, negative amounts
/// are owed by them.
pub fn load_balances(path: &str) -> Result<BalanceSheet, Cow<'static, str>> {
    let file = File::open(path).map_err(|err| format!("Failed to read '{path}': {err}"))?;
    parse_balances(file)
}

fn parse_balances<R: Read>(input: R) -> Result<BalanceSheet, Cow<'static, str>> {
    // Flexible so short rows reach the column check below instead of
    // surfacing as an opaque length error.
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let mut entries = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|err| format!("Malformed CSV record: {err}"))?;
        // Row 1 is the header, already consumed by the reader.
        let line = row + 2;
        if record.len() != 2 {
            return Err(format!(
                "Expected 2 columns (name, net amount) on line {line}, found {}",
                record.len()
            )
            .into());
        }

        let name = record[0].trim().to_string();
        if name.is_empty() {
            return Err(format!("Empty participant name on line {line}").into());
        }
        let net: f64 = record[1]
            .trim()
            .parse()
            .map_err(|err| format!("Invalid net amount for '{name}' on line {line}: {err}"))?;
        entries.push((name, net));
    }

    BalanceSheet::from_entries(entries).map_err(|err| Cow::from(err.to_string()))
}
