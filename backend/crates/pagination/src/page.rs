//! A loaded page of items plus navigation metadata.

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// One page of an ordered listing.
///
/// Serialises as an object with the items and every navigation field a
/// template needs, so adapters never recompute page arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    number: u64,
    num_pages: u64,
    count: u64,
    per_page: u32,
}

impl<T> Page<T> {
    pub(crate) const fn new(
        items: Vec<T>,
        number: u64,
        num_pages: u64,
        count: u64,
        per_page: u32,
    ) -> Self {
        Self {
            items,
            number,
            num_pages,
            count,
            per_page,
        }
    }

    /// Items on this page, in listing order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page and return its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// One-based page number.
    #[must_use]
    pub const fn number(&self) -> u64 {
        self.number
    }

    /// Total number of pages.
    #[must_use]
    pub const fn num_pages(&self) -> u64 {
        self.num_pages
    }

    /// Total number of items across all pages.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Configured page size.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Next page number, if any.
    #[must_use]
    pub const fn next_page_number(&self) -> Option<u64> {
        if self.has_next() {
            Some(self.number + 1)
        } else {
            None
        }
    }

    /// Previous page number, if any.
    #[must_use]
    pub const fn previous_page_number(&self) -> Option<u64> {
        if self.has_previous() {
            Some(self.number - 1)
        } else {
            None
        }
    }

    /// One-based index of the first item on this page, or 0 when empty.
    #[must_use]
    pub fn start_index(&self) -> u64 {
        if self.count == 0 {
            return 0;
        }
        u64::from(self.per_page)
            .saturating_mul(self.number.saturating_sub(1))
            .saturating_add(1)
    }

    /// One-based index of the last item on this page, or 0 when empty.
    #[must_use]
    pub fn end_index(&self) -> u64 {
        if self.number == self.num_pages {
            return self.count;
        }
        self.number.saturating_mul(u64::from(self.per_page))
    }

    /// Transform the items while keeping the navigation metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            per_page: self.per_page,
        }
    }
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Page", 11)?;
        state.serialize_field("items", &self.items)?;
        state.serialize_field("number", &self.number)?;
        state.serialize_field("num_pages", &self.num_pages)?;
        state.serialize_field("count", &self.count)?;
        state.serialize_field("per_page", &self.per_page)?;
        state.serialize_field("has_next", &self.has_next())?;
        state.serialize_field("has_previous", &self.has_previous())?;
        state.serialize_field("next_page_number", &self.next_page_number())?;
        state.serialize_field("previous_page_number", &self.previous_page_number())?;
        state.serialize_field("start_index", &self.start_index())?;
        state.serialize_field("end_index", &self.end_index())?;
        state.end()
    }
}
