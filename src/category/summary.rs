//! Groups transactions by category and totals them.

use rusqlite::{Connection, params_from_iter};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    transaction::{SUM_CENTS_SQL, TransactionFilter, cents_to_amount},
};

use super::core::ALL_CATEGORY;

/// The number of transactions in a category and their total CAD amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// The category name, or "All" for the row covering every category.
    pub name: String,
    /// The number of matching transactions in the category.
    pub transaction_count: u64,
    /// The sum of the CAD amounts in the category, rounded to cents.
    pub total: f64,
}

/// Summarise the transactions matching `filter` by category.
///
/// The category clause of `filter` is ignored since the summary spans every
/// category. The result has one row per category present in the filtered
/// transactions, sorted by name, preceded by an "All" row whose count and
/// total are the sums over every other row. The "All" row is present even
/// when nothing matches.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn summarize_categories(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<CategorySummary>, Error> {
    let (where_clause, params) = filter.without_category().to_sql();

    let groups = connection
        .prepare(&format!(
            "SELECT category, COUNT(*), {SUM_CENTS_SQL} FROM transactions {where_clause} \
            GROUP BY category ORDER BY category ASC"
        ))?
        .query_map(params_from_iter(params.iter()), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?
        .map(|group_result| group_result.map_err(Error::SqlError))
        .collect::<Result<Vec<_>, _>>()?;

    let all_count: i64 = groups.iter().map(|(_, count, _)| count).sum();
    let all_cents: i64 = groups.iter().map(|(_, _, cents)| cents).sum();

    let mut summaries = Vec::with_capacity(groups.len() + 1);
    summaries.push(CategorySummary {
        name: ALL_CATEGORY.to_owned(),
        transaction_count: all_count as u64,
        total: cents_to_amount(all_cents),
    });
    summaries.extend(
        groups
            .into_iter()
            .map(|(name, count, cents)| CategorySummary {
                name,
                transaction_count: count as u64,
                total: cents_to_amount(cents),
            }),
    );

    Ok(summaries)
}
