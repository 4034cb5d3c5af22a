//! Search endpoints
//!
//! - `GET /api/search?q=<text>&limit=<n>`: header dropdown. Books whose title
//!   and authors whose name contain the text, books first.
//! - `GET /api/search/results?q=<text>&page=<n>&pageSize=<n>`: the results
//!   page, up to 100 hits paged 6 at a time, with the pagination bar markers.
//!
//! A blank query answers no hits.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use nr_common::api::SearchQuery;
use nr_common::content::gateway::DEFAULT_SEARCH_LIMIT;
use nr_common::content::MAX_PAGE_LIMIT;
use nr_common::models::SearchResult;
use nr_common::pagination::{page_links, page_size_or, paginate, Page, PageLink, SEARCH_PAGE_SIZE};
use serde::Serialize;

use crate::{ApiError, ApiResult, AppState};

/// One page of search results plus the markers of the pagination bar
#[derive(Debug, Serialize)]
pub struct SearchResultsPage {
    pub results: Page<SearchResult>,
    pub pages: Vec<PageLink>,
}

/// GET /api/search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<Vec<SearchResult>>> {
    let q = params.q.unwrap_or_default();
    let limit = params.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_SEARCH_LIMIT);

    let results = state
        .content
        .search(&q, limit)
        .await
        .map_err(|e| ApiError::Internal(format!("Search failed: {}", e)))?;
    Ok(Json(results))
}

/// GET /api/search/results
pub async fn search_results(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<SearchResultsPage>> {
    let q = params.q.unwrap_or_default();
    let hits = state
        .content
        .search(&q, MAX_PAGE_LIMIT as usize)
        .await
        .map_err(|e| ApiError::Internal(format!("Search failed: {}", e)))?;

    let results = paginate(
        &hits,
        params.page.unwrap_or(1),
        page_size_or(params.page_size, SEARCH_PAGE_SIZE),
    );
    let pages = page_links(results.page, results.total_pages);
    Ok(Json(SearchResultsPage { results, pages }))
}

/// Build search routes
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/api/search", get(search))
        .route("/api/search/results", get(search_results))
}
