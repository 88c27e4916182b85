//! Defines the core data model and store operations for transactions.

use rusqlite::{Connection, Row, Transaction as SqlTransaction, TransactionBehavior, params};
use serde::{Deserialize, Serialize};

use crate::{Error, category::CategorySet, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// One bank ledger entry.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction, assigned by the store.
    pub id: TransactionId,
    /// The kind of account, e.g. "Chequing" or "Visa".
    pub account_type: String,
    /// The account the transaction was made on.
    pub account_number: String,
    /// When the transaction happened.
    ///
    /// Normally a `YYYY-MM-DD` string, but dates that could not be normalised
    /// during loading are kept as they appeared in the CSV.
    pub transaction_date: String,
    /// The cheque number, if the transaction was a cheque.
    pub cheque_number: Option<String>,
    /// The primary merchant or description text.
    pub description_1: String,
    /// A secondary description.
    pub description_2: Option<String>,
    /// The amount in Canadian dollars. Negative amounts are debits and
    /// positive amounts are credits.
    pub cad_amount: f64,
    /// The amount in US dollars, for USD transactions.
    pub usd_amount: Option<f64>,
    /// The spending category, e.g. "Groceries".
    pub category: String,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(transaction_date: &str, description_1: &str, cad_amount: f64) -> TransactionBuilder {
        TransactionBuilder {
            account_type: String::new(),
            account_number: String::new(),
            transaction_date: transaction_date.to_owned(),
            cheque_number: None,
            description_1: description_1.to_owned(),
            description_2: None,
            cad_amount,
            usd_amount: None,
            category: String::new(),
        }
    }
}

/// A transaction that has not been stored yet and so has no ID.
///
/// The CSV loader produces these, and [replace_all_transactions] turns them into
/// [Transaction]s.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// See [Transaction::account_type].
    pub account_type: String,
    /// See [Transaction::account_number].
    pub account_number: String,
    /// See [Transaction::transaction_date].
    pub transaction_date: String,
    /// See [Transaction::cheque_number].
    pub cheque_number: Option<String>,
    /// See [Transaction::description_1].
    pub description_1: String,
    /// See [Transaction::description_2].
    pub description_2: Option<String>,
    /// See [Transaction::cad_amount].
    pub cad_amount: f64,
    /// See [Transaction::usd_amount].
    pub usd_amount: Option<f64>,
    /// The category as written in the CSV. Not checked against the
    /// configured category set.
    pub category: String,
}

impl TransactionBuilder {
    /// Set the account type and number.
    pub fn account(mut self, account_type: &str, account_number: &str) -> Self {
        self.account_type = account_type.to_owned();
        self.account_number = account_number.to_owned();
        self
    }

    /// Set the cheque number.
    pub fn cheque_number(mut self, cheque_number: Option<String>) -> Self {
        self.cheque_number = cheque_number;
        self
    }

    /// Set the secondary description.
    pub fn description_2(mut self, description_2: Option<String>) -> Self {
        self.description_2 = description_2;
        self
    }

    /// Set the USD amount.
    pub fn usd_amount(mut self, usd_amount: Option<f64>) -> Self {
        self.usd_amount = usd_amount;
        self
    }

    /// Set the category.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns of the transactions table in the order [map_transaction_row] expects.
pub(crate) const TRANSACTION_COLUMNS: &str = "id, account_type, account_number, transaction_date, \
    cheque_number, description_1, description_2, cad_amount, usd_amount, category";

/// Delete every transaction and insert `builders` in their place.
///
/// The delete and inserts run in a single write transaction. Readers see
/// either the old table or the new one, never a mix. If any insert fails
/// the old rows are kept.
///
/// IDs are assigned in insertion order and never reuse IDs from earlier loads.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error, in which case the
/// table is left as it was.
pub fn replace_all_transactions(
    builders: Vec<TransactionBuilder>,
    connection: &Connection,
) -> Result<usize, Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let deleted = transaction.execute("DELETE FROM transactions", ())?;

    let inserted = {
        let mut stmt = transaction.prepare(
            "INSERT INTO transactions (account_type, account_number, transaction_date, \
            cheque_number, description_1, description_2, cad_amount, usd_amount, category)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;

        let mut inserted = 0;
        for builder in builders {
            inserted += stmt.execute(params![
                builder.account_type,
                builder.account_number,
                builder.transaction_date,
                builder.cheque_number,
                builder.description_1,
                builder.description_2,
                builder.cad_amount,
                builder.usd_amount,
                builder.category,
            ])?;
        }

        inserted
    };

    transaction.commit()?;

    tracing::debug!("Replaced {deleted} transactions with {inserted} new transactions");

    Ok(inserted)
}

/// Set the category of the transaction with `id` to `category`.
///
/// `category` must be one of `categories` and must not be the "All" sentinel.
/// The check happens before the store is touched.
///
/// # Errors
/// This function will return a:
/// - [Error::ReservedCategory] if `category` is "All",
/// - or [Error::UnknownCategory] if `category` is not in `categories`,
/// - or [Error::UpdateMissingTransaction] if `id` does not refer to a transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction_category(
    id: TransactionId,
    category: &str,
    categories: &CategorySet,
    connection: &Connection,
) -> Result<Transaction, Error> {
    categories.validate(category)?;

    connection
        .prepare(&format!(
            "UPDATE transactions SET category = ?1 WHERE id = ?2 RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(params![category, id], map_transaction_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction(id),
            error => error.into(),
        })
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
#[cfg(test)]
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM transactions;", [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|count| count as u64)
        .map_err(|error| error.into())
}

/// Create the transactions table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_type TEXT NOT NULL,
                account_number TEXT NOT NULL,
                transaction_date TEXT NOT NULL,
                cheque_number TEXT,
                description_1 TEXT NOT NULL,
                description_2 TEXT,
                cad_amount REAL NOT NULL,
                usd_amount REAL,
                category TEXT NOT NULL
                )",
        (),
    )?;

    // Used by the date range filters and the category summary.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_date_category \
        ON transactions(transaction_date, category);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// The row must contain the columns in [TRANSACTION_COLUMNS] order.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        account_type: row.get(1)?,
        account_number: row.get(2)?,
        transaction_date: row.get(3)?,
        cheque_number: row.get(4)?,
        description_1: row.get(5)?,
        description_2: row.get(6)?,
        cad_amount: row.get(7)?,
        usd_amount: row.get(8)?,
        category: row.get(9)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        category::CategorySet,
        db::initialize,
        transaction::{
            Transaction, count_transactions, get_transaction, replace_all_transactions,
            update_transaction_category,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn builders(count: usize) -> Vec<crate::transaction::TransactionBuilder> {
        (1..=count)
            .map(|i| {
                Transaction::build("2024-03-14", &format!("transaction #{i}"), -(i as f64))
                    .account("Chequing", "00001-1234567")
                    .category("Groceries")
            })
            .collect()
    }

    #[test]
    fn replace_all_inserts_every_row() {
        let conn = get_test_connection();

        let inserted = replace_all_transactions(builders(5), &conn).unwrap();

        assert_eq!(inserted, 5);
        assert_eq!(count_transactions(&conn).unwrap(), 5);
    }

    #[test]
    fn replace_all_discards_previous_rows() {
        let conn = get_test_connection();
        replace_all_transactions(builders(7), &conn).unwrap();

        replace_all_transactions(builders(3), &conn).unwrap();

        assert_eq!(count_transactions(&conn).unwrap(), 3);
    }

    #[test]
    fn replace_all_never_reuses_ids() {
        let conn = get_test_connection();
        replace_all_transactions(builders(2), &conn).unwrap();

        replace_all_transactions(builders(2), &conn).unwrap();

        let ids: Vec<i64> = conn
            .prepare("SELECT id FROM transactions ORDER BY id")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn failed_replace_keeps_previous_rows() {
        let conn = get_test_connection();
        replace_all_transactions(
            vec![Transaction::build("2020-01-01", "OLD", -1.0).category("Other")],
            &conn,
        )
        .unwrap();
        conn.execute(
            "CREATE TRIGGER reject_second_row BEFORE INSERT ON transactions
            WHEN NEW.description_1 = 'transaction #2'
            BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            (),
        )
        .unwrap();

        let got = replace_all_transactions(builders(3), &conn);

        assert!(matches!(got, Err(Error::SqlError(_))), "got {got:?}");
        assert_eq!(count_transactions(&conn).unwrap(), 1);
        assert_eq!(get_transaction(1, &conn).unwrap().description_1, "OLD");
    }

    #[test]
    fn replace_all_keeps_optional_fields() {
        let conn = get_test_connection();
        let builder = Transaction::build("2024-03-14", "AMAZON", -12.5)
            .account("Visa", "4500")
            .cheque_number(Some("101".to_owned()))
            .description_2(Some("MARKETPLACE".to_owned()))
            .usd_amount(Some(-9.25))
            .category("Shopping");

        replace_all_transactions(vec![builder], &conn).unwrap();

        let got = get_transaction(1, &conn).unwrap();
        assert_eq!(
            got,
            Transaction {
                id: 1,
                account_type: "Visa".to_owned(),
                account_number: "4500".to_owned(),
                transaction_date: "2024-03-14".to_owned(),
                cheque_number: Some("101".to_owned()),
                description_1: "AMAZON".to_owned(),
                description_2: Some("MARKETPLACE".to_owned()),
                cad_amount: -12.5,
                usd_amount: Some(-9.25),
                category: "Shopping".to_owned(),
            }
        );
    }

    #[test]
    fn update_category_succeeds() {
        let conn = get_test_connection();
        replace_all_transactions(builders(1), &conn).unwrap();

        let got = update_transaction_category(1, "Restaurants", &CategorySet::default(), &conn)
            .expect("could not update category");

        assert_eq!(got.category, "Restaurants");
        assert_eq!(get_transaction(1, &conn).unwrap().category, "Restaurants");
    }

    #[test]
    fn update_category_fails_on_missing_id() {
        let conn = get_test_connection();

        let got = update_transaction_category(42, "Groceries", &CategorySet::default(), &conn);

        assert_eq!(got, Err(Error::UpdateMissingTransaction(42)));
    }

    #[test]
    fn update_category_rejects_all_sentinel() {
        let conn = get_test_connection();
        replace_all_transactions(builders(1), &conn).unwrap();

        let got = update_transaction_category(1, "All", &CategorySet::default(), &conn);

        assert_eq!(got, Err(Error::ReservedCategory));
        assert_eq!(get_transaction(1, &conn).unwrap().category, "Groceries");
    }

    #[test]
    fn update_category_rejects_sentinel_before_checking_id() {
        let conn = get_test_connection();

        let got = update_transaction_category(42, "All", &CategorySet::default(), &conn);

        assert_eq!(got, Err(Error::ReservedCategory));
    }

    #[test]
    fn update_category_rejects_unknown_category() {
        let conn = get_test_connection();
        replace_all_transactions(builders(1), &conn).unwrap();

        let got = update_transaction_category(1, "Yachts", &CategorySet::default(), &conn);

        assert_eq!(got, Err(Error::UnknownCategory("Yachts".to_owned())));
    }
}
