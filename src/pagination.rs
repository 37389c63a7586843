//! Paging of the dashboard's transaction list.

use serde::Serialize;

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of transactions to display per page.
    pub default_page_size: u64,
    /// The maximum number of page numbers to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_pages: 5,
        }
    }
}

/// One element of the pagination control.
///
/// Every element the client can click carries the link to that page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaginationIndicator {
    Page { page: u64, href: String },
    CurrPage { page: u64 },
    Ellipsis,
    NextButton { page: u64, href: String },
    BackButton { page: u64, href: String },
}

/// The number of pages needed to show `item_count` items, `page_size` at a
/// time. There is always at least one page.
pub fn page_count(item_count: usize, page_size: u64) -> u64 {
    let page_size = page_size.max(1);
    (item_count as u64).div_ceil(page_size).max(1)
}

/// Move `page` into the range `1..=page_count`.
pub fn clamp_page(page: u64, page_count: u64) -> u64 {
    page.clamp(1, page_count.max(1))
}

/// The items shown on `page` (1-based), `page_size` at a time.
///
/// Pages past the end are empty.
pub fn page_slice<T>(items: &[T], page: u64, page_size: u64) -> &[T] {
    let page_size = page_size.max(1) as usize;
    let start = (page.max(1) as usize - 1).saturating_mul(page_size);

    if start >= items.len() {
        return &[];
    }

    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Build the pagination control for `curr_page` out of `page_count` pages.
///
/// At most `max_pages` consecutive page numbers are shown around the current
/// page. The first and last pages are always reachable, with an ellipsis
/// standing in for any pages skipped. `href` creates the link for a page.
///
/// # Errors
/// Returns the first error from `href`.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
    href: impl Fn(u64) -> Result<String, Error>,
) -> Result<Vec<PaginationIndicator>, Error> {
    let max_pages = max_pages.max(1);
    let (first, last) = page_window(curr_page, page_count, max_pages);

    let page = |page: u64| -> Result<PaginationIndicator, Error> {
        if page == curr_page {
            Ok(PaginationIndicator::CurrPage { page })
        } else {
            Ok(PaginationIndicator::Page {
                page,
                href: href(page)?,
            })
        }
    };

    let mut indicators = Vec::new();

    if curr_page > 1 {
        indicators.push(PaginationIndicator::BackButton {
            page: curr_page - 1,
            href: href(curr_page - 1)?,
        });
    }

    if first > 1 {
        indicators.push(page(1)?);
        if first > 2 {
            indicators.push(PaginationIndicator::Ellipsis);
        }
    }

    for number in first..=last {
        indicators.push(page(number)?);
    }

    if last < page_count {
        if last + 1 < page_count {
            indicators.push(PaginationIndicator::Ellipsis);
        }
        indicators.push(page(page_count)?);
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton {
            page: curr_page + 1,
            href: href(curr_page + 1)?,
        });
    }

    Ok(indicators)
}

/// The first and last page numbers of the window centred on `curr_page`.
fn page_window(curr_page: u64, page_count: u64, max_pages: u64) -> (u64, u64) {
    if page_count <= max_pages {
        return (1, page_count);
    }

    let first = curr_page
        .saturating_sub(max_pages / 2)
        .max(1)
        .min(page_count - max_pages + 1);

    (first, first + max_pages - 1)
}
