//! Loads bank CSV exports into the transactions table.

mod load;
mod load_endpoint;
mod parse;

pub use load::{load_csv_file, read_csv_file};
pub use load_endpoint::{LoadCsvQuery, LoadCsvResponse, LoadCsvState, load_csv_endpoint};
pub use parse::{REQUIRED_COLUMNS, normalize_date, parse_csv};
