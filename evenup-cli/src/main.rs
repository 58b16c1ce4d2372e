#![warn(clippy::uninlined_format_args)]

mod loader;
mod report;

use std::{borrow::Cow, env, process};

type CliResult<T> = Result<T, Cow<'static, str>>;

fn main() {
    tracing_subscriber::fmt::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let Some(path) = env::args().nth(1) else {
        return Err("Usage: evenup <balances.csv>".into());
    };

    let balances = loader::load_balances(&path)?;
    tracing::info!(participants = balances.len(), "Loaded balance sheet");

    let settlement = evenup_settlement::settle(&balances)
        .map_err(|err| Cow::from(format!("Settlement failed: {err}")))?;
    tracing::info!(
        transfers = settlement.transaction_count(),
        "Settlement solved"
    );

    print!("{}", report::render(&settlement));
    Ok(())
}
