//! Page-number pagination primitives for listing endpoints.
//!
//! The crate is framework agnostic. Inbound adapters parse the raw `page`
//! query value into a [`PageRequest`], services ask a [`Paginator`] for the
//! [`PageWindow`] to load, and the loaded rows are wrapped in a [`Page`]
//! that serialises with everything a template needs to render navigation.
//!
//! Out-of-range requests never fail: a page number past the end, or below
//! one, resolves to the last page, and a value that is not an integer
//! resolves to the first page. Use [`Paginator::validate_number`] when the
//! caller needs the strict behaviour instead.
//!
//! # Examples
//! ```
//! use pagination::{PageRequest, Paginator};
//!
//! let paginator = Paginator::new(13, 10).expect("non-zero page size");
//! let window = paginator.get_page(PageRequest::parse(Some("3")));
//! assert_eq!(window.number(), 2);
//! assert_eq!(window.offset(), 10);
//! assert_eq!(window.limit(), 3);
//! ```

mod links;
mod page;
mod paginator;
mod request;

pub use links::PageLinks;
pub use page::Page;
pub use paginator::{PageError, PageWindow, Paginator};
pub use request::PageRequest;

/// Number of posts shown on every listing page.
pub const DEFAULT_PER_PAGE: u32 = 10;
