//! Builds the `WHERE` clause shared by the transaction listing and the category summary.
//!
//! Filters are a fixed set of tagged clauses joined with `AND`. Values are
//! always bound as SQL parameters, never spliced into the query text.

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::category::ALL_CATEGORY;

/// Which transactions to include based on the sign of their CAD amount.
///
/// Transactions with an amount of exactly zero are neither debits nor credits
/// and only appear under [TransactionType::All].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money leaving the account, `cad_amount < 0`.
    #[default]
    Debit,
    /// Money entering the account, `cad_amount > 0`.
    Credit,
    /// Every transaction regardless of amount.
    All,
}

impl TransactionType {
    fn as_str(self) -> &'static str {
        match self {
            TransactionType::Debit => "debit",
            TransactionType::Credit => "credit",
            TransactionType::All => "all",
        }
    }
}

/// A single condition on a transaction row.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    /// The category is exactly this string.
    CategoryEquals(String),
    /// The transaction date is on or after this `YYYY-MM-DD` string.
    DateOnOrAfter(String),
    /// The transaction date is on or before this `YYYY-MM-DD` string.
    DateOnOrBefore(String),
    /// The CAD amount is negative.
    Debit,
    /// The CAD amount is positive.
    Credit,
}

impl FilterClause {
    fn to_sql(&self) -> (&'static str, Option<Value>) {
        match self {
            FilterClause::CategoryEquals(category) => {
                ("category = ?", Some(Value::Text(category.clone())))
            }
            FilterClause::DateOnOrAfter(date) => {
                ("transaction_date >= ?", Some(Value::Text(date.clone())))
            }
            FilterClause::DateOnOrBefore(date) => {
                ("transaction_date <= ?", Some(Value::Text(date.clone())))
            }
            FilterClause::Debit => ("cad_amount < 0", None),
            FilterClause::Credit => ("cad_amount > 0", None),
        }
    }
}

/// The filters a client may apply to the transactions table.
///
/// Dates are compared as strings, which matches chronological order only for
/// normalised `YYYY-MM-DD` dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    category: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    transaction_type: TransactionType,
}

impl TransactionFilter {
    /// Create a filter that only selects debits, the default transaction type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only include transactions in `category`.
    ///
    /// `None` and the "All" sentinel remove the category filter.
    pub fn category(mut self, category: Option<&str>) -> Self {
        self.category = category
            .filter(|category| *category != ALL_CATEGORY)
            .map(str::to_owned);
        self
    }

    /// Only include transactions dated between `start_date` and `end_date` inclusive.
    ///
    /// Either bound may be omitted. Blank bounds are treated as omitted.
    pub fn date_range(mut self, start_date: Option<&str>, end_date: Option<&str>) -> Self {
        let non_blank = |date: Option<&str>| {
            date.map(str::trim)
                .filter(|date| !date.is_empty())
                .map(str::to_owned)
        };

        self.start_date = non_blank(start_date);
        self.end_date = non_blank(end_date);
        self
    }

    /// Only include debits, credits or both.
    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    /// The same filter without the category clause.
    pub fn without_category(&self) -> Self {
        Self {
            category: None,
            ..self.clone()
        }
    }

    /// The clauses that make up this filter, all of which must hold for a row to match.
    pub fn clauses(&self) -> Vec<FilterClause> {
        let mut clauses = Vec::new();

        if let Some(category) = &self.category {
            clauses.push(FilterClause::CategoryEquals(category.clone()));
        }

        if let Some(start_date) = &self.start_date {
            clauses.push(FilterClause::DateOnOrAfter(start_date.clone()));
        }

        if let Some(end_date) = &self.end_date {
            clauses.push(FilterClause::DateOnOrBefore(end_date.clone()));
        }

        match self.transaction_type {
            TransactionType::Debit => clauses.push(FilterClause::Debit),
            TransactionType::Credit => clauses.push(FilterClause::Credit),
            TransactionType::All => {}
        }

        clauses
    }

    /// The `WHERE` clause for this filter and the parameters to bind to it, in order.
    ///
    /// Returns an empty string if the filter matches every row.
    pub(crate) fn to_sql(&self) -> (String, Vec<Value>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        for clause in self.clauses() {
            let (condition, param) = clause.to_sql();
            conditions.push(condition);
            params.extend(param);
        }

        if conditions.is_empty() {
            (String::new(), params)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), params)
        }
    }

    /// A human readable summary of the active filters, e.g.
    /// "category: Groceries, transaction type: debit".
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();

        if let Some(category) = &self.category {
            parts.push(format!("category: {category}"));
        }

        parts.push(format!(
            "transaction type: {}",
            self.transaction_type.as_str()
        ));

        match (&self.start_date, &self.end_date) {
            (Some(start), Some(end)) => parts.push(format!("date range: {start} to {end}")),
            (Some(start), None) => parts.push(format!("date range: from {start}")),
            (None, Some(end)) => parts.push(format!("date range: until {end}")),
            (None, None) => {}
        }

        parts.join(", ")
    }
}
