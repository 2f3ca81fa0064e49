//! Navigation links for a page.

use serde::Serialize;
use url::Url;

use crate::page::Page;

/// Absolute links to neighbouring pages.
///
/// Every other query parameter on the base URL is preserved; only `page`
/// is rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    /// Link to the current page.
    #[serde(rename = "self")]
    pub current: Url,
    /// Link to page one.
    pub first: Url,
    /// Link to the previous page, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Url>,
    /// Link to the next page, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Url>,
    /// Link to the last page.
    pub last: Url,
}

impl PageLinks {
    /// Build links for `page` relative to the request URL `base`.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageLinks, PageRequest, Paginator};
    /// use url::Url;
    ///
    /// let base = Url::parse("http://blog.test/?page=1").expect("valid url");
    /// let page = Paginator::new(25, 10)
    ///     .expect("non-zero page size")
    ///     .get_page(PageRequest::First)
    ///     .into_page(vec![(); 10]);
    /// let links = PageLinks::for_page(&base, &page);
    /// assert_eq!(links.next.expect("next").as_str(), "http://blog.test/?page=2");
    /// ```
    #[must_use]
    pub fn for_page<T>(base: &Url, page: &Page<T>) -> Self {
        Self {
            current: with_page(base, page.number()),
            first: with_page(base, 1),
            previous: page
                .previous_page_number()
                .map(|number| with_page(base, number)),
            next: page.next_page_number().map(|number| with_page(base, number)),
            last: with_page(base, page.num_pages()),
        }
    }
}

fn with_page(base: &Url, number: u64) -> Url {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("page", &number.to_string());
    url
}
