//! Defines the route handler for listing transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{AppState, Error, extract::ApiQuery, pagination::PaginationConfig};

use super::query::{PaginatedTransactions, TransactionListQuery, list_transactions};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls page sizes.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Route handler for a page of transactions matching the query parameters.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionsState>,
    ApiQuery(query): ApiQuery<TransactionListQuery>,
) -> Result<Json<PaginatedTransactions>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    list_transactions(&query, &state.pagination_config, &connection)
        .inspect_err(|error| tracing::debug!("could not list transactions: {error}"))
        .map(Json)
}
