//! This modules defines the common functionality for paging data.

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of transactions to display per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a client may request.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

/// A validated, 1-based page of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The page number, starting at 1.
    pub page: u64,
    /// The number of items per page, at least 1.
    pub page_size: u64,
}

impl PageRequest {
    /// Apply the defaults in `config` to the optional `page` and `page_size`
    /// and check they are within bounds.
    ///
    /// # Errors
    /// Returns [Error::InvalidPagination] if `page` is zero, or if `page_size`
    /// is zero or larger than [PaginationConfig::max_page_size].
    pub fn new(
        page: Option<u64>,
        page_size: Option<u64>,
        config: &PaginationConfig,
    ) -> Result<Self, Error> {
        let page = page.unwrap_or(config.default_page);
        let page_size = page_size.unwrap_or(config.default_page_size);

        if page < 1 {
            return Err(Error::InvalidPagination(
                "page must be at least 1".to_owned(),
            ));
        }

        if page_size < 1 || page_size > config.max_page_size {
            return Err(Error::InvalidPagination(format!(
                "page_size must be between 1 and {}, got {page_size}",
                config.max_page_size
            )));
        }

        Ok(Self { page, page_size })
    }

    /// The number of rows to skip to reach the start of this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// The number of pages needed to show `total_items` rows.
    pub fn total_pages(&self, total_items: u64) -> u64 {
        total_items.div_ceil(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        pagination::{PageRequest, PaginationConfig},
    };

    #[test]
    fn applies_defaults() {
        let config = PaginationConfig::default();

        let got = PageRequest::new(None, None, &config).unwrap();

        assert_eq!(
            got,
            PageRequest {
                page: 1,
                page_size: 10
            }
        );
    }

    #[test]
    fn rejects_page_zero() {
        let got = PageRequest::new(Some(0), None, &PaginationConfig::default());

        assert!(matches!(got, Err(Error::InvalidPagination(_))));
    }

    #[test]
    fn rejects_page_size_zero() {
        let got = PageRequest::new(None, Some(0), &PaginationConfig::default());

        assert!(matches!(got, Err(Error::InvalidPagination(_))));
    }

    #[test]
    fn rejects_page_size_over_limit() {
        let config = PaginationConfig::default();

        assert!(PageRequest::new(None, Some(100), &config).is_ok());
        assert!(matches!(
            PageRequest::new(None, Some(101), &config),
            Err(Error::InvalidPagination(_))
        ));
    }

    #[test]
    fn computes_offset() {
        let request = PageRequest {
            page: 3,
            page_size: 20,
        };

        assert_eq!(request.offset(), 40);
    }

    #[test]
    fn total_pages_rounds_up() {
        let request = PageRequest {
            page: 1,
            page_size: 10,
        };

        assert_eq!(request.total_pages(0), 0);
        assert_eq!(request.total_pages(1), 1);
        assert_eq!(request.total_pages(10), 1);
        assert_eq!(request.total_pages(11), 2);
    }
}
