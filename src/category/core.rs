//! The configurable set of categories a transaction may be assigned.

use std::{collections::BTreeSet, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The sentinel category that stands for "every category".
///
/// It is used by filters and the category summary, and may never be stored
/// on a transaction.
pub const ALL_CATEGORY: &str = "All";

const DEFAULT_CATEGORIES: [&str; 13] = [
    "Entertainment",
    "Groceries",
    "Healthcare",
    "Housing",
    "Insurance",
    "Other",
    "Restaurants",
    "Shopping",
    "Subscriptions",
    "Transfers",
    "Transportation",
    "Travel",
    "Utilities",
];

/// The closed set of categories that a user may assign to a transaction.
///
/// The set is configuration data rather than a fixed enum because it changes
/// over time. Each revision carries a version number so clients can tell
/// when their cached list is stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySet {
    version: u32,
    categories: BTreeSet<String>,
}

impl CategorySet {
    /// Create a category set from `categories`.
    ///
    /// Surrounding whitespace is trimmed from each name and duplicates are
    /// removed.
    ///
    /// # Errors
    /// Returns [Error::InvalidCategoryConfig] if the set is empty, contains a
    /// blank name, or contains the "All" sentinel.
    pub fn new<I, S>(version: u32, categories: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();

        for category in categories {
            let category = category.as_ref().trim();

            if category.is_empty() {
                return Err(Error::InvalidCategoryConfig(
                    "category names cannot be blank".to_owned(),
                ));
            }

            if category == ALL_CATEGORY {
                return Err(Error::InvalidCategoryConfig(format!(
                    "\"{ALL_CATEGORY}\" is reserved and cannot be a category"
                )));
            }

            set.insert(category.to_owned());
        }

        if set.is_empty() {
            return Err(Error::InvalidCategoryConfig(
                "at least one category is required".to_owned(),
            ));
        }

        Ok(Self {
            version,
            categories: set,
        })
    }

    /// Parse a category set from JSON of the form
    /// `{"version": 2, "categories": ["Groceries", "Rent"]}`.
    ///
    /// # Errors
    /// Returns [Error::InvalidCategoryConfig] if the JSON is malformed or the
    /// categories are invalid, see [CategorySet::new].
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let raw: CategorySet = serde_json::from_str(text)
            .map_err(|error| Error::InvalidCategoryConfig(error.to_string()))?;

        Self::new(raw.version, raw.categories)
    }

    /// Read a category set from the JSON file at `path`, see [CategorySet::from_json].
    ///
    /// # Errors
    /// Returns [Error::InvalidCategoryConfig] if the file cannot be read or is invalid.
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|error| {
            Error::InvalidCategoryConfig(format!("could not read {}: {error}", path.display()))
        })?;

        Self::from_json(&text)
    }

    /// The revision of the category set.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The category names in alphabetical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    /// Whether `category` is in the set.
    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    /// Check that `category` may be assigned to a transaction.
    ///
    /// # Errors
    /// Returns [Error::ReservedCategory] for the "All" sentinel and
    /// [Error::UnknownCategory] for any other category not in the set.
    pub fn validate(&self, category: &str) -> Result<(), Error> {
        if category == ALL_CATEGORY {
            return Err(Error::ReservedCategory);
        }

        if !self.contains(category) {
            return Err(Error::UnknownCategory(category.to_owned()));
        }

        Ok(())
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self {
            version: 1,
            categories: DEFAULT_CATEGORIES.iter().map(|&name| name.to_owned()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::Error;

    use super::{ALL_CATEGORY, CategorySet};

    #[test]
    fn default_set_excludes_sentinel() {
        let categories = CategorySet::default();

        assert!(categories.contains("Groceries"));
        assert!(!categories.contains(ALL_CATEGORY));
    }

    #[test]
    fn validate_rejects_sentinel() {
        assert_eq!(
            CategorySet::default().validate(ALL_CATEGORY),
            Err(Error::ReservedCategory)
        );
    }

    #[test]
    fn validate_rejects_unknown_category() {
        assert_eq!(
            CategorySet::default().validate("groceries"),
            Err(Error::UnknownCategory("groceries".to_owned()))
        );
    }

    #[test]
    fn new_rejects_sentinel() {
        let got = CategorySet::new(1, ["Groceries", "All"]);

        assert!(matches!(got, Err(Error::InvalidCategoryConfig(_))));
    }

    #[test]
    fn new_rejects_empty_set() {
        let got = CategorySet::new(1, Vec::<String>::new());

        assert!(matches!(got, Err(Error::InvalidCategoryConfig(_))));
    }

    #[test]
    fn parses_json() {
        let got =
            CategorySet::from_json(r#"{"version": 3, "categories": ["Rent", " Groceries ", "Rent"]}"#)
                .unwrap();

        assert_eq!(got.version(), 3);
        assert_eq!(got.names().collect::<Vec<_>>(), vec!["Groceries", "Rent"]);
    }

    #[test]
    fn json_with_sentinel_is_rejected() {
        let got = CategorySet::from_json(r#"{"version": 1, "categories": ["All"]}"#);

        assert!(matches!(got, Err(Error::InvalidCategoryConfig(_))));
    }

    #[test]
    fn reads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"version": 2, "categories": ["Pets"]}}"#).unwrap();

        let got = CategorySet::from_json_file(file.path()).unwrap();

        assert_eq!(got.version(), 2);
        assert!(got.contains("Pets"));
    }

    #[test]
    fn missing_file_is_config_error() {
        let got = CategorySet::from_json_file(std::path::Path::new("does/not/exist.json"));

        assert!(matches!(got, Err(Error::InvalidCategoryConfig(_))));
    }
}
