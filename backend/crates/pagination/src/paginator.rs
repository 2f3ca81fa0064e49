//! Page arithmetic over a counted listing.

use crate::page::Page;
use crate::request::PageRequest;

/// Errors raised by strict page validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// A paginator was built with a page size of zero.
    #[error("items per page must be greater than zero")]
    ZeroPerPage,
    /// The request was not an integer.
    #[error("that page number is not an integer")]
    NotAnInteger,
    /// The request was zero or negative.
    #[error("that page number is less than 1")]
    BelowFirst,
    /// The request pointed past the last page.
    #[error("that page contains no results (last page is {num_pages})")]
    PastLast {
        /// Number of pages that do exist.
        num_pages: u64,
    },
}

/// Splits `count` items into pages of `per_page`.
///
/// A listing always has at least one page, even when empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: u64,
    per_page: u32,
}

impl Paginator {
    /// Build a paginator for a listing of `count` items.
    ///
    /// # Errors
    /// Returns [`PageError::ZeroPerPage`] when `per_page` is zero.
    pub const fn new(count: u64, per_page: u32) -> Result<Self, PageError> {
        if per_page == 0 {
            return Err(PageError::ZeroPerPage);
        }
        Ok(Self { count, per_page })
    }

    /// Total number of items in the listing.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Maximum number of items on one page.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of pages, never less than one.
    #[must_use]
    pub const fn num_pages(&self) -> u64 {
        if self.count == 0 {
            1
        } else {
            self.count.div_ceil(self.per_page as u64)
        }
    }

    /// Resolve a request to a page number without any fallback.
    ///
    /// # Errors
    /// Returns [`PageError::NotAnInteger`] for unparsable input,
    /// [`PageError::BelowFirst`] for zero or negative numbers and
    /// [`PageError::PastLast`] for numbers beyond [`Self::num_pages`].
    pub fn validate_number(&self, request: PageRequest) -> Result<u64, PageError> {
        let num_pages = self.num_pages();
        match request {
            PageRequest::First => Ok(1),
            PageRequest::Last => Ok(num_pages),
            PageRequest::Invalid => Err(PageError::NotAnInteger),
            PageRequest::Number(number) => {
                let number = u64::try_from(number).map_err(|_| PageError::BelowFirst)?;
                if number == 0 {
                    Err(PageError::BelowFirst)
                } else if number > num_pages {
                    Err(PageError::PastLast { num_pages })
                } else {
                    Ok(number)
                }
            }
        }
    }

    /// Resolve a request to the window of items to load.
    ///
    /// Input that is not an integer yields the first page. Any other invalid
    /// number yields the last page.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageRequest, Paginator};
    ///
    /// let paginator = Paginator::new(13, 10).expect("non-zero page size");
    /// assert_eq!(paginator.get_page(PageRequest::Number(9)).number(), 2);
    /// assert_eq!(paginator.get_page(PageRequest::Invalid).number(), 1);
    /// ```
    #[must_use]
    pub fn get_page(&self, request: PageRequest) -> PageWindow {
        let number = match self.validate_number(request) {
            Ok(number) => number,
            Err(PageError::NotAnInteger) => 1,
            Err(_) => self.num_pages(),
        };
        self.window(number)
    }

    fn window(&self, number: u64) -> PageWindow {
        let per_page = u64::from(self.per_page);
        let offset = number.saturating_sub(1).saturating_mul(per_page);
        let limit = per_page.min(self.count.saturating_sub(offset));
        PageWindow {
            number,
            num_pages: self.num_pages(),
            count: self.count,
            per_page: self.per_page,
            offset,
            limit,
        }
    }
}

/// A resolved page: which slice of the ordered listing to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    number: u64,
    num_pages: u64,
    count: u64,
    per_page: u32,
    offset: u64,
    limit: u64,
}

impl PageWindow {
    /// One-based page number.
    #[must_use]
    pub const fn number(&self) -> u64 {
        self.number
    }

    /// Total number of pages in the listing.
    #[must_use]
    pub const fn num_pages(&self) -> u64 {
        self.num_pages
    }

    /// Total number of items in the listing.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Number of items to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of items expected on this page.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Wrap the loaded items.
    #[must_use]
    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        Page::new(
            items,
            self.number,
            self.num_pages,
            self.count,
            self.per_page,
        )
    }
}
