//! The API endpoints URIs.

/// The root route which describes the API.
pub const ROOT: &str = "/";
/// The route for listing transactions.
pub const TRANSACTIONS: &str = "/transactions";
/// The route for changing the category of a single transaction.
pub const TRANSACTION_CATEGORY: &str = "/transactions/{transaction_id}/category";
/// The route for the per-category summary.
pub const CATEGORIES: &str = "/categories";
/// The route listing the categories a transaction may be assigned.
pub const CATEGORY_NAMES: &str = "/categories/names";
/// The route for replacing all transactions with the contents of a CSV file.
pub const LOAD_CSV: &str = "/load-csv";
