//! Settle Engine CLI
//!
//! Reads itemized expenses from CSV and prints the reduced set of transfers
//! that settles them.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- expenses.csv --name trip > settlement.txt
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity
//! - `SETTLE_EPSILON`, `SETTLE_MIN_VALUE`: defaults for the matching flags

use clap::{Parser, ValueEnum};
use log::warn;
use settle_engine::{Amount, EngineConfig, Result, SettleError, SettlementEngine};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "settle-engine")]
#[command(about = "Settle shared expenses into a reduced set of transfers")]
struct Cli {
    /// CSV file with `name,amount,payer,payees` rows.
    input: PathBuf,

    /// Name of the resulting package.
    #[arg(long, default_value = "settlement")]
    name: String,

    /// Amounts at or below this magnitude count as zero.
    #[arg(long, env = "SETTLE_EPSILON", default_value = "0.000000001")]
    epsilon: Amount,

    /// Drop transfer inputs strictly below this value.
    #[arg(long, env = "SETTLE_MIN_VALUE")]
    min_value: Option<Amount>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Fail instead of warning when debt is left unsettled.
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Csv,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = EngineConfig::new(cli.epsilon);
    if let Some(min_value) = cli.min_value {
        config = config.with_min_value(min_value);
    }
    let engine = SettlementEngine::new(config);

    let file = File::open(&cli.input)?;
    let expenses = engine.read_expenses(BufReader::new(file))?;
    let outcome = engine.settle(&cli.name, &expenses)?;

    if !outcome.is_settled() {
        if cli.strict {
            return Err(SettleError::UnspentInput {
                remaining: outcome.remaining,
            });
        }
        warn!("{} of debt left unsettled", outcome.remaining);
        eprintln!("Warning: {} of debt left unsettled", outcome.remaining);
    }

    let stdout = io::stdout();
    let handle = stdout.lock();
    match cli.format {
        Format::Text => engine.write_text(&outcome.package, handle)?,
        Format::Csv => engine.write_csv(&outcome.package, handle)?,
    }

    Ok(())
}
