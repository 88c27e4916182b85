//! Transaction management for the transaction browser.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Store functions for replacing, updating and querying transactions
//! - The filter builder and the paginated query engine
//! - Route handlers for the transaction endpoints

mod core;
mod filter;
mod list_endpoint;
mod query;
mod update_category_endpoint;

#[cfg(test)]
pub(crate) mod test_utils;

pub use self::core::{
    Transaction, TransactionBuilder, create_transaction_table, replace_all_transactions,
    update_transaction_category,
};
pub use filter::{FilterClause, TransactionFilter, TransactionType};
pub use list_endpoint::{TransactionsState, get_transactions_endpoint};
pub use query::{
    PaginatedTransactions, SortBy, SortOrder, TransactionListMetadata, TransactionListQuery,
    list_transactions,
};
pub use update_category_endpoint::{
    UpdateCategoryRequest, UpdateCategoryState, update_category_endpoint,
};

pub(crate) use query::{SUM_CENTS_SQL, cents_to_amount};

#[cfg(test)]
pub use self::core::{count_transactions, get_transaction};
#[cfg(test)]
pub(crate) use query::query_filtered;
