//! Fixtures shared by the transaction and category tests.

use rusqlite::Connection;

use super::{Transaction, replace_all_transactions};

/// Store three Groceries transactions (-10.00, -20.00 and +5.00) and one
/// Restaurants transaction (-7.50).
pub(crate) fn insert_scenario_transactions(connection: &Connection) {
    let builders = vec![
        Transaction::build("2024-03-01", "LOBLAWS", -10.0)
            .account("Chequing", "00001-1234567")
            .category("Groceries"),
        Transaction::build("2024-03-05", "NO FRILLS", -20.0)
            .account("Chequing", "00001-1234567")
            .category("Groceries"),
        Transaction::build("2024-03-09", "LOBLAWS REFUND", 5.0)
            .account("Chequing", "00001-1234567")
            .category("Groceries"),
        Transaction::build("2024-03-12", "PIZZA PIZZA", -7.5)
            .account("Visa", "4500123412341234")
            .category("Restaurants"),
    ];

    replace_all_transactions(builders, connection).expect("could not insert test transactions");
}
