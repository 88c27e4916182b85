//! The paginated, filtered and sorted transaction listing.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    pagination::{PageRequest, PaginationConfig},
};

use super::{
    core::{TRANSACTION_COLUMNS, Transaction, map_transaction_row},
    filter::{TransactionFilter, TransactionType},
};

/// SQL expression for the sum of `cad_amount` in whole cents.
///
/// Each amount is rounded to cents before summing, which keeps per-category
/// totals, the grand total and the listing total in exact agreement. This is
/// not `ROUND(SUM(cad_amount), 2)`: sub-cent amounts are rounded away row by
/// row, so three credits of 0.004 total 0.00 rather than 0.01.
pub(crate) const SUM_CENTS_SQL: &str =
    "COALESCE(SUM(CAST(ROUND(cad_amount * 100) AS INTEGER)), 0)";

/// Convert a whole number of cents into a dollar amount with two decimal places.
pub(crate) fn cents_to_amount(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// The column to sort transactions by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Sort by the transaction date.
    #[default]
    Date,
    /// Sort by the CAD amount.
    Amount,
}

impl SortBy {
    fn column(self) -> &'static str {
        match self {
            SortBy::Date => "transaction_date",
            SortBy::Amount => "cad_amount",
        }
    }
}

/// The order to sort transactions in a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Asc,
    /// Sort in order of decreasing value.
    #[default]
    Desc,
}

impl SortOrder {
    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// One page of the rows matching a filter, plus the count and sum over every matching row.
#[derive(Debug, PartialEq)]
pub(crate) struct FilteredPage {
    /// The rows on the requested page.
    pub rows: Vec<Transaction>,
    /// The number of rows matching the filter across all pages.
    pub total_count: u64,
    /// The sum of `cad_amount` in cents across all pages.
    pub total_cents: i64,
}

/// Get a page of transactions matching `filter` along with the total count and sum.
///
/// Rows with the same sort key are ordered by ID so that repeated queries
/// return rows in the same order.
///
/// The count, sum and page are read inside a single read transaction so they
/// describe the same snapshot of the table.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub(crate) fn query_filtered(
    filter: &TransactionFilter,
    sort_by: SortBy,
    sort_order: SortOrder,
    limit: u64,
    offset: u64,
    connection: &Connection,
) -> Result<FilteredPage, Error> {
    let (where_clause, params) = filter.to_sql();
    let snapshot = connection.unchecked_transaction()?;

    let (total_count, total_cents) = snapshot
        .prepare(&format!(
            "SELECT COUNT(*), {SUM_CENTS_SQL} FROM transactions {where_clause}"
        ))?
        .query_row(params_from_iter(params.iter()), |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?;

    let mut page_params = params;
    page_params.push(Value::Integer(clamp_to_i64(limit)));
    page_params.push(Value::Integer(clamp_to_i64(offset)));

    let rows = snapshot
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions {where_clause} \
            ORDER BY {} {}, id ASC LIMIT ? OFFSET ?",
            sort_by.column(),
            sort_order.keyword()
        ))?
        .query_map(params_from_iter(page_params.iter()), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect::<Result<Vec<_>, _>>()?;

    snapshot.commit()?;

    Ok(FilteredPage {
        rows,
        total_count: total_count as u64,
        total_cents,
    })
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// The query parameters accepted by the transaction listing.
///
/// Every field is optional, missing fields fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionListQuery {
    /// Only include this category. "All" or absent means every category.
    pub category: Option<String>,
    /// Only include transactions on or after this `YYYY-MM-DD` date.
    pub start_date: Option<String>,
    /// Only include transactions on or before this `YYYY-MM-DD` date.
    pub end_date: Option<String>,
    /// Debits, credits or both. Defaults to debits.
    #[serde(default)]
    pub transaction_type: TransactionType,
    /// The column to sort by. Defaults to the date.
    #[serde(default)]
    pub sort_by: SortBy,
    /// The sort direction. Defaults to descending.
    #[serde(default)]
    pub sort_order: SortOrder,
    /// The 1-based page number.
    pub page: Option<u64>,
    /// The number of transactions per page.
    pub page_size: Option<u64>,
}

impl TransactionListQuery {
    /// The filter described by these parameters.
    pub fn filter(&self) -> TransactionFilter {
        TransactionFilter::new()
            .category(self.category.as_deref())
            .date_range(self.start_date.as_deref(), self.end_date.as_deref())
            .transaction_type(self.transaction_type)
    }
}

/// Describes a page of transactions and the filters used to select it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionListMetadata {
    /// The 1-based page number.
    pub page: u64,
    /// The maximum number of transactions per page.
    pub page_size: u64,
    /// The number of pages needed to show every matching transaction.
    pub total_pages: u64,
    /// The number of matching transactions across all pages.
    pub total_items: u64,
    /// The sum of the CAD amounts of every matching transaction, rounded to cents.
    pub category_total: f64,
    /// The category filter, if any.
    pub category: Option<String>,
    /// The transaction type filter.
    pub transaction_type: TransactionType,
    /// The start of the date range, if any.
    pub start_date: Option<String>,
    /// The end of the date range, if any.
    pub end_date: Option<String>,
    /// The column the transactions are sorted by.
    pub sort_by: SortBy,
    /// The sort direction.
    pub sort_order: SortOrder,
}

/// A page of transactions and its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedTransactions {
    /// The transactions on the requested page.
    pub data: Vec<Transaction>,
    /// Pagination details and the applied filters.
    pub metadata: TransactionListMetadata,
}

/// List the transactions matching `query`, one page at a time.
///
/// Requesting a page past the last page returns an empty page rather than an
/// error, as long as at least one transaction matches.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidPagination] if the page or page size is out of bounds,
/// - or [Error::NoMatchingTransactions] if no transaction matches the filters,
/// - or [Error::SqlError] if there is some SQL error.
pub fn list_transactions(
    query: &TransactionListQuery,
    pagination_config: &PaginationConfig,
    connection: &Connection,
) -> Result<PaginatedTransactions, Error> {
    let page_request = PageRequest::new(query.page, query.page_size, pagination_config)?;
    let filter = query.filter();

    let page = query_filtered(
        &filter,
        query.sort_by,
        query.sort_order,
        page_request.page_size,
        page_request.offset(),
        connection,
    )?;

    if page.total_count == 0 {
        return Err(Error::NoMatchingTransactions(filter.describe()));
    }

    Ok(PaginatedTransactions {
        data: page.rows,
        metadata: TransactionListMetadata {
            page: page_request.page,
            page_size: page_request.page_size,
            total_pages: page_request.total_pages(page.total_count),
            total_items: page.total_count,
            category_total: cents_to_amount(page.total_cents),
            category: query.category.clone(),
            transaction_type: query.transaction_type,
            start_date: query.start_date.clone(),
            end_date: query.end_date.clone(),
            sort_by: query.sort_by,
            sort_order: query.sort_order,
        },
    })
}
