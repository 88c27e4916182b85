//! Route handlers for the category summary and the configured category names.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    extract::ApiQuery,
    transaction::{TransactionFilter, TransactionType},
};

use super::{
    core::CategorySet,
    summary::{CategorySummary, summarize_categories},
};

/// The state needed for the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The categories a transaction may be assigned.
    pub categories: Arc<CategorySet>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            categories: state.categories.clone(),
        }
    }
}

/// The query parameters accepted by the category summary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategorySummaryQuery {
    /// Only include transactions on or after this `YYYY-MM-DD` date.
    pub start_date: Option<String>,
    /// Only include transactions on or before this `YYYY-MM-DD` date.
    pub end_date: Option<String>,
    /// Debits, credits or both. Defaults to debits.
    #[serde(default)]
    pub transaction_type: TransactionType,
}

/// The response body for the category summary.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategorySummaryResponse {
    /// The "All" row followed by one row per category.
    pub categories: Vec<CategorySummary>,
}

/// The response body listing the configured categories.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryNamesResponse {
    /// The revision of the category set.
    pub version: u32,
    /// The category names in alphabetical order.
    pub categories: Vec<String>,
}

/// Route handler for the per-category count and total of the filtered transactions.
pub async fn get_categories_endpoint(
    State(state): State<CategoryState>,
    ApiQuery(query): ApiQuery<CategorySummaryQuery>,
) -> Result<Json<CategorySummaryResponse>, Error> {
    let filter = TransactionFilter::new()
        .date_range(query.start_date.as_deref(), query.end_date.as_deref())
        .transaction_type(query.transaction_type);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = summarize_categories(&filter, &connection)?;

    Ok(Json(CategorySummaryResponse { categories }))
}

/// Route handler for the categories a transaction may be assigned.
pub async fn get_category_names_endpoint(
    State(state): State<CategoryState>,
) -> Json<CategoryNamesResponse> {
    Json(CategoryNamesResponse {
        version: state.categories.version(),
        categories: state.categories.names().map(str::to_owned).collect(),
    })
}
