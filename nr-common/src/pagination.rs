//! Pagination utilities
//!
//! Collections are fetched whole from the content store and paged in memory.

use serde::{Deserialize, Serialize};

/// Page sizes used by the catalog views
pub const BOOKS_PAGE_SIZE: usize = 10;
pub const NEW_RELEASES_PAGE_SIZE: usize = 8;
pub const SEARCH_PAGE_SIZE: usize = 6;
pub const LISTS_PAGE_SIZE: usize = 15;
pub const LIST_DETAIL_PAGE_SIZE: usize = 10;
pub const GENRES_PAGE_SIZE: usize = 8;
pub const SHELF_PAGE_SIZE: usize = 5;

/// Upper bound for a caller-supplied page size
pub const MAX_PAGE_SIZE: usize = 100;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: usize,
    /// Total number of pages
    pub total_pages: usize,
    /// Index of the first item on the page
    pub offset: usize,
}

/// Calculate pagination metadata from total results and requested page
///
/// Ensures page is within valid bounds [1, total_pages]
///
/// # Examples
/// ```
/// use nr_common::pagination::calculate_pagination;
///
/// // 25 results, 10 per page = 3 pages (10 + 10 + 5)
/// let p = calculate_pagination(25, 2, 10);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 10);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(25, 99, 10);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 20);
/// ```
pub fn calculate_pagination(total_results: usize, requested_page: usize, page_size: usize) -> Pagination {
    let page_size = page_size.max(1);
    let total_pages = total_results.div_ceil(page_size);
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * page_size;

    Pagination {
        page,
        total_pages,
        offset,
    }
}

/// Clamp a caller-supplied page size, falling back to `default`
pub fn page_size_or(requested: Option<usize>, default: usize) -> usize {
    requested.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
}

/// One page of a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slice a collection into the requested page
pub fn paginate<T: Clone>(items: &[T], requested_page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let p = calculate_pagination(items.len(), requested_page, page_size);
    let end = (p.offset + page_size).min(items.len());

    Page {
        items: items[p.offset..end].to_vec(),
        page: p.page,
        page_size,
        total_items: items.len(),
        total_pages: p.total_pages,
    }
}

/// Marker in a pagination bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "page")]
pub enum PageLink {
    Number(usize),
    Ellipsis,
}

/// Visible page markers: first, last, and one page either side of the current
/// page, with ellipses over the gaps. Empty when there is only one page.
pub fn page_links(current: usize, total_pages: usize) -> Vec<PageLink> {
    const DELTA: usize = 1;

    if total_pages <= 1 {
        return Vec::new();
    }

    let current = current.clamp(1, total_pages);
    let mut links = vec![PageLink::Number(1)];

    let start = current.saturating_sub(DELTA).max(2);
    let end = (current + DELTA).min(total_pages - 1);

    if current > DELTA + 2 {
        links.push(PageLink::Ellipsis);
    }
    links.extend((start..=end).map(PageLink::Number));
    if current + DELTA < total_pages - 1 {
        links.push(PageLink::Ellipsis);
    }

    links.push(PageLink::Number(total_pages));
    links
}
