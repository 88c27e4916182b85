use std::{error::Error, path::PathBuf};

use clap::Parser;
use rusqlite::Connection;

use ledger_browser::load_csv_file;

/// Replace the transactions in a database with the rows of a bank CSV export.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database. Created if it does not exist.
    #[arg(long)]
    db_path: PathBuf,

    /// File path to the CSV export.
    #[arg(long)]
    csv_path: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let connection = Connection::open(&args.db_path)?;
    let row_count = load_csv_file(&args.csv_path, &connection)?;

    println!(
        "Loaded {row_count} transactions into {}",
        args.db_path.display()
    );

    Ok(())
}
