use std::{fs::File, io::BufReader, path::Path, time::Instant};

use rusqlite::Connection;

use crate::{
    Error,
    csv_import::parse_csv,
    db::initialize,
    transaction::{TransactionBuilder, replace_all_transactions},
};

/// Read and parse the CSV file at `path`.
///
/// # Errors
/// Returns [Error::InvalidCSV] if the file cannot be opened, plus any error
/// from [parse_csv].
pub fn read_csv_file(path: &Path) -> Result<Vec<TransactionBuilder>, Error> {
    let file = File::open(path).map_err(|error| {
        Error::InvalidCSV(format!("could not open {}: {error}", path.display()))
    })?;

    parse_csv(BufReader::new(file))
}

/// Replace every stored transaction with the rows of the CSV file at `path`.
///
/// The file is fully parsed before the database is touched, so a bad file
/// leaves the existing transactions in place.
///
/// Returns the number of transactions loaded.
pub fn load_csv_file(path: &Path, connection: &Connection) -> Result<usize, Error> {
    let start_time = Instant::now();
    let transactions = read_csv_file(path)?;

    initialize(connection)?;
    let row_count = replace_all_transactions(transactions, connection)?;

    tracing::info!(
        "Loaded {row_count} transactions from {} in {}ms",
        path.display(),
        start_time.elapsed().as_millis()
    );

    Ok(row_count)
}
