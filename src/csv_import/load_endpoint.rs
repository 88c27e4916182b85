//! Defines the route handler for reloading transactions from a CSV file on the server.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Instant,
};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, db::initialize, extract::ApiQuery, transaction::replace_all_transactions,
};

use super::read_csv_file;

/// The state needed for loading a CSV file.
#[derive(Debug, Clone)]
pub struct LoadCsvState {
    /// The database connection for replacing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoadCsvState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for [load_csv_endpoint].
#[derive(Debug, Clone, Deserialize)]
pub struct LoadCsvQuery {
    /// A path to a CSV file readable by the server process.
    pub csv_path: PathBuf,
}

/// The result of a successful load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCsvResponse {
    /// A human readable confirmation.
    pub message: String,
    /// The number of transactions now in the store.
    pub rows: usize,
}

/// Route handler that replaces every transaction with the rows of a CSV file.
///
/// The file is parsed before the database lock is taken, so readers are only
/// blocked while the rows are written.
pub async fn load_csv_endpoint(
    State(state): State<LoadCsvState>,
    ApiQuery(query): ApiQuery<LoadCsvQuery>,
) -> Result<Json<LoadCsvResponse>, Error> {
    let start_time = Instant::now();
    let transactions = read_csv_file(&query.csv_path)
        .inspect_err(|error| tracing::debug!("could not read CSV file: {error}"))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    initialize(&connection)?;
    let rows = replace_all_transactions(transactions, &connection)?;

    tracing::info!(
        "Loaded {rows} transactions from {} in {}ms",
        query.csv_path.display(),
        start_time.elapsed().as_millis()
    );

    Ok(Json(LoadCsvResponse {
        message: format!("Successfully loaded {rows} transactions"),
        rows,
    }))
}
