//! Parses bank CSV exports into transactions.

use std::io::Read;

use csv::StringRecord;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    transaction::{Transaction, TransactionBuilder},
};

/// The columns a CSV export must have, in the bank's naming.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "Account Type",
    "Account Number",
    "Transaction Date",
    "Description 1",
    "CAD$",
    "Category",
];

const CHEQUE_NUMBER_COLUMN: &str = "Cheque Number";
const DESCRIPTION_2_COLUMN: &str = "Description 2";
const USD_AMOUNT_COLUMN: &str = "USD$";

const MONTH_DAY_YEAR_FORMAT: &[BorrowedFormatItem] =
    format_description!("[month padding:none]/[day padding:none]/[year]");
const ISO_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Where each column we keep appears in a CSV row. Other columns are dropped.
struct ColumnIndices {
    account_type: usize,
    account_number: usize,
    transaction_date: usize,
    cheque_number: Option<usize>,
    description_1: usize,
    description_2: Option<usize>,
    cad_amount: usize,
    usd_amount: Option<usize>,
    category: usize,
}

impl ColumnIndices {
    /// Locate the columns in `headers` by exact, case-sensitive name.
    ///
    /// Returns [Error::MissingColumns] naming every required column that is absent.
    fn from_headers(headers: &StringRecord) -> Result<Self, Error> {
        let find = |name: &str| headers.iter().position(|header| header == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&name| find(name).is_none())
            .map(|&name| name.to_owned())
            .collect();

        if !missing.is_empty() {
            return Err(Error::MissingColumns(missing));
        }

        let required =
            |name: &str| find(name).ok_or_else(|| Error::MissingColumns(vec![name.to_owned()]));

        Ok(Self {
            account_type: required("Account Type")?,
            account_number: required("Account Number")?,
            transaction_date: required("Transaction Date")?,
            cheque_number: find(CHEQUE_NUMBER_COLUMN),
            description_1: required("Description 1")?,
            description_2: find(DESCRIPTION_2_COLUMN),
            cad_amount: required("CAD$")?,
            usd_amount: find(USD_AMOUNT_COLUMN),
            category: required("Category")?,
        })
    }
}

/// Parses a bank CSV export with a header row.
///
/// Every data row becomes a transaction, including rows whose category is
/// empty or not one of the configured categories. Dates are normalised with
/// [normalize_date].
///
/// # Errors
/// Returns a:
/// - [Error::MissingColumns] if a column in [REQUIRED_COLUMNS] is absent,
/// - or [Error::InvalidCSV] if the CSV is malformed or an amount is not a number.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<TransactionBuilder>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|error| Error::InvalidCSV(format!("could not read the header row: {error}")))?
        .clone();
    let columns = ColumnIndices::from_headers(&headers)?;

    let mut transactions = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let row_number = index + 1;
        let record = record.map_err(|error| {
            Error::InvalidCSV(format!("could not read row {row_number}: {error}"))
        })?;
        let field = |column: usize| record.get(column).unwrap_or_default();
        let optional_field = |column: Option<usize>| {
            column
                .map(field)
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let cad_amount = parse_amount(field(columns.cad_amount), "CAD$", row_number)?;
        let usd_amount = optional_field(columns.usd_amount)
            .map(|value| parse_amount(value, USD_AMOUNT_COLUMN, row_number))
            .transpose()?;

        let transaction = Transaction::build(
            &normalize_date(field(columns.transaction_date)),
            field(columns.description_1),
            cad_amount,
        )
        .account(field(columns.account_type), field(columns.account_number))
        .cheque_number(optional_field(columns.cheque_number).map(str::to_owned))
        .description_2(optional_field(columns.description_2).map(str::to_owned))
        .usd_amount(usd_amount)
        .category(field(columns.category));

        transactions.push(transaction);
    }

    Ok(transactions)
}

fn parse_amount(text: &str, column: &str, row_number: usize) -> Result<f64, Error> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| {
            Error::InvalidCSV(format!(
                "could not parse {column} value '{text}' as an amount on row {row_number}"
            ))
        })
}

/// Convert a date to `YYYY-MM-DD` form.
///
/// Tries month/day/year (e.g. `3/14/2024`) first and then `YYYY-MM-DD`.
/// Dates in neither format are returned unchanged.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();

    Date::parse(trimmed, &MONTH_DAY_YEAR_FORMAT)
        .or_else(|_| Date::parse(trimmed, &ISO_DATE_FORMAT))
        .ok()
        .and_then(|date| date.format(&ISO_DATE_FORMAT).ok())
        .unwrap_or_else(|| {
            tracing::debug!("Could not normalise date '{raw}', keeping it as is");
            raw.to_owned()
        })
}

#[cfg(test)]
mod tests {
    use crate::{Error, transaction::Transaction};

    use super::{normalize_date, parse_csv};

    const RBC_CSV: &str = "\
Account Type,Account Number,Transaction Date,Cheque Number,Description 1,Description 2,CAD$,USD$,Category
Chequing,00001-1234567,3/14/2024,,LOBLAWS #123,,-54.32,,Groceries
Visa,4500123412341234,12/1/2023,,AMAZON.COM,MARKETPLACE,-20.00,-14.75,Shopping
Chequing,00001-1234567,2024-01-05,101,CHEQUE,,-500.00,,
";

    #[test]
    fn parses_every_row() {
        let got = parse_csv(RBC_CSV.as_bytes()).unwrap();

        assert_eq!(got.len(), 3);
    }

    #[test]
    fn maps_columns_to_fields() {
        let got = parse_csv(RBC_CSV.as_bytes()).unwrap();

        assert_eq!(
            got[1],
            Transaction::build("2023-12-01", "AMAZON.COM", -20.0)
                .account("Visa", "4500123412341234")
                .description_2(Some("MARKETPLACE".to_owned()))
                .usd_amount(Some(-14.75))
                .category("Shopping")
        );
    }

    #[test]
    fn keeps_rows_without_category() {
        let got = parse_csv(RBC_CSV.as_bytes()).unwrap();

        assert_eq!(got[2].category, "");
        assert_eq!(got[2].cheque_number.as_deref(), Some("101"));
        assert_eq!(got[2].transaction_date, "2024-01-05");
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let csv = "\
Category,CAD$,Description 1,Transaction Date,Account Number,Account Type,Extra
Restaurants,-7.50,PIZZA PIZZA,3/9/2024,4500,Visa,ignored
";

        let got = parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(
            got,
            vec![
                Transaction::build("2024-03-09", "PIZZA PIZZA", -7.5)
                    .account("Visa", "4500")
                    .category("Restaurants")
            ]
        );
    }

    #[test]
    fn reports_every_missing_column() {
        let csv = "Account Type,Account Number,Transaction Date,Description 1\nVisa,1,3/9/2024,X\n";

        let got = parse_csv(csv.as_bytes());

        assert_eq!(
            got,
            Err(Error::MissingColumns(vec![
                "CAD$".to_owned(),
                "Category".to_owned()
            ]))
        );
    }

    #[test]
    fn column_names_are_case_sensitive() {
        let csv = "account type,Account Number,Transaction Date,Description 1,CAD$,Category\n";

        let got = parse_csv(csv.as_bytes());

        assert_eq!(
            got,
            Err(Error::MissingColumns(vec!["Account Type".to_owned()]))
        );
    }

    #[test]
    fn rejects_non_numeric_amount() {
        let csv = "\
Account Type,Account Number,Transaction Date,Description 1,CAD$,Category
Visa,1,3/9/2024,X,-1.00,Other
Visa,1,3/9/2024,Y,abc,Other
";

        let got = parse_csv(csv.as_bytes());

        match got {
            Err(Error::InvalidCSV(message)) => {
                assert!(message.contains("row 2"), "got {message}");
                assert!(message.contains("abc"), "got {message}");
            }
            other => panic!("want InvalidCSV, got {other:?}"),
        }
    }

    #[test]
    fn header_only_csv_has_no_rows() {
        let csv = "Account Type,Account Number,Transaction Date,Description 1,CAD$,Category\n";

        assert_eq!(parse_csv(csv.as_bytes()), Ok(Vec::new()));
    }

    #[test]
    fn normalizes_month_day_year() {
        assert_eq!(normalize_date("3/14/2024"), "2024-03-14");
        assert_eq!(normalize_date("03/04/2024"), "2024-03-04");
        assert_eq!(normalize_date("12/31/2023"), "2023-12-31");
    }

    #[test]
    fn keeps_iso_dates() {
        assert_eq!(normalize_date("2024-03-14"), "2024-03-14");
    }

    #[test]
    fn preserves_unparseable_dates() {
        assert_eq!(normalize_date("14 March 2024"), "14 March 2024");
        assert_eq!(normalize_date("13/45/2024"), "13/45/2024");
        assert_eq!(normalize_date(""), "");
    }
}
