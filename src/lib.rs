//! Ledger Browser is a small service for browsing bank transactions exported as CSV.
//!
//! The library loads a bank CSV export into SQLite and serves a JSON API for
//! listing, filtering, categorising and summarising transactions.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod category;
mod csv_import;
mod database_id;
mod db;
mod endpoints;
mod extract;
mod logging;
mod pagination;
mod routing;
mod transaction;

pub use app_state::AppState;
pub use category::{
    ALL_CATEGORY, CategoryNamesResponse, CategorySet, CategoryState, CategorySummary,
    CategorySummaryQuery, CategorySummaryResponse, summarize_categories,
};
pub use csv_import::{
    LoadCsvQuery, LoadCsvResponse, LoadCsvState, REQUIRED_COLUMNS, load_csv_file, normalize_date,
    parse_csv, read_csv_file,
};
pub use database_id::{DatabaseId, TransactionId};
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::{PageRequest, PaginationConfig};
pub use routing::build_router;
pub use transaction::{
    FilterClause, PaginatedTransactions, SortBy, SortOrder, Transaction, TransactionBuilder,
    TransactionFilter, TransactionListMetadata, TransactionListQuery, TransactionType,
    TransactionsState, UpdateCategoryRequest, UpdateCategoryState, list_transactions,
    replace_all_transactions, update_transaction_category,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The CSV had issues that prevented it from being parsed.
    ///
    /// The store is left untouched when a load fails with this error.
    #[error("Could not parse the CSV file: {0}")]
    InvalidCSV(String),

    /// The CSV header row is missing one or more required columns.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A filtered transaction listing matched zero rows.
    ///
    /// The string describes the filters that were active so the client can
    /// tell the user why nothing was found.
    #[error("No transactions found for {0}")]
    NoMatchingTransactions(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist
    #[error("transaction {0} does not exist")]
    UpdateMissingTransaction(TransactionId),

    /// Tried to store the "All" sentinel as a transaction category.
    ///
    /// "All" only ever appears in aggregate views and is never a real category.
    #[error("\"All\" is reserved and cannot be assigned to a transaction")]
    ReservedCategory,

    /// Tried to assign a category that is not in the configured category set.
    #[error("\"{0}\" is not a known category")]
    UnknownCategory(String),

    /// A query string, path segment or request body could not be parsed.
    #[error("{0}")]
    BadRequest(String),

    /// The page or page size is outside the allowed bounds.
    #[error("invalid pagination parameters: {0}")]
    InvalidPagination(String),

    /// The category configuration could not be loaded or is malformed.
    #[error("invalid category configuration: {0}")]
    InvalidCategoryConfig(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCSV(_)
            | Error::MissingColumns(_)
            | Error::ReservedCategory
            | Error::UnknownCategory(_)
            | Error::BadRequest(_)
            | Error::InvalidPagination(_) => StatusCode::BAD_REQUEST,
            Error::NoMatchingTransactions(_)
            | Error::NotFound
            | Error::UpdateMissingTransaction(_) => StatusCode::NOT_FOUND,
            Error::InvalidCategoryConfig(_) | Error::DatabaseLockError | Error::SqlError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal errors are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{body, http::StatusCode, response::IntoResponse};
    use serde_json::Value;

    use crate::Error;

    async fn detail_of(error: Error) -> (StatusCode, String) {
        let response = error.into_response();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("could not read response body");
        let json: Value = serde_json::from_slice(&bytes).expect("response body is not JSON");

        (status, json["detail"].as_str().unwrap_or_default().to_owned())
    }

    #[tokio::test]
    async fn missing_columns_lists_column_names() {
        let (status, detail) = detail_of(Error::MissingColumns(vec![
            "CAD$".to_owned(),
            "Category".to_owned(),
        ]))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail, "Missing required columns: CAD$, Category");
    }

    #[tokio::test]
    async fn reserved_category_is_bad_request() {
        let (status, _) = detail_of(Error::ReservedCategory).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn no_matches_is_not_found_with_reason() {
        let (status, detail) =
            detail_of(Error::NoMatchingTransactions("category: Groceries".to_owned())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(detail, "No transactions found for category: Groceries");
    }

    #[tokio::test]
    async fn internal_errors_are_not_echoed() {
        let (status, detail) = detail_of(Error::DatabaseLockError).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!detail.contains("lock"));
    }
}
