//! Spending categories.
//!
//! This module contains:
//! - The configured set of categories a transaction may be assigned
//! - The per-category summary of transactions and its route handlers

mod core;
mod summary;
mod summary_endpoint;

pub use self::core::{ALL_CATEGORY, CategorySet};
pub use summary::{CategorySummary, summarize_categories};
pub use summary_endpoint::{
    CategoryNamesResponse, CategoryState, CategorySummaryQuery, CategorySummaryResponse,
    get_categories_endpoint, get_category_names_endpoint,
};
