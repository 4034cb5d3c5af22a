//! Catalog read endpoints
//!
//! Collections are fetched whole from the Content Gateway and paged in
//! memory. A `genre` filter is a genre name, matched ignoring case.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Datelike;
use nr_common::api::PageQuery;
use nr_common::models::{Author, Book, BookList, Genre, Series, Tag, UserProfile};
use nr_common::pagination::{
    page_size_or, paginate, Page, BOOKS_PAGE_SIZE, GENRES_PAGE_SIZE, LISTS_PAGE_SIZE,
    LIST_DETAIL_PAGE_SIZE, NEW_RELEASES_PAGE_SIZE,
};
use serde::Serialize;

use crate::{ApiResult, AppState};

/// Book with the series it belongs to
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetail {
    pub book: Book,
    pub series: Option<Series>,
}

/// Genre page: the genre, a page of its books, and the lists carrying it
#[derive(Debug, Serialize)]
pub struct GenreDetail {
    pub genre: Genre,
    pub books: Page<Book>,
    pub lists: Vec<BookList>,
}

/// List page: the list without its books, plus a page of them
#[derive(Debug, Serialize)]
pub struct ListDetail {
    pub list: BookList,
    pub books: Page<Book>,
}

fn page_of<T: Clone>(items: &[T], params: &PageQuery, default_size: usize) -> Page<T> {
    paginate(
        items,
        params.page.unwrap_or(1),
        page_size_or(params.page_size, default_size),
    )
}

/// Resolve a genre name to its id
async fn genre_id(state: &AppState, name: Option<&str>) -> ApiResult<Option<String>> {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => Ok(Some(state.content.genre_by_name(name).await?.id)),
        None => Ok(None),
    }
}

/// GET /api/books
pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> ApiResult<Json<Page<Book>>> {
    let books = match genre_id(&state, params.genre.as_deref()).await? {
        Some(id) => state.content.books_by_genre(&id).await?,
        None => state.content.books().await?,
    };
    Ok(Json(page_of(&books, &params, BOOKS_PAGE_SIZE)))
}

/// GET /api/books/:id
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BookDetail>> {
    let book = state.content.book(&id).await?;
    let series = state.content.series_for_book(&id).await?;
    Ok(Json(BookDetail { book, series }))
}

/// GET /api/new-releases
pub async fn new_releases(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> ApiResult<Json<Page<Book>>> {
    let genre = genre_id(&state, params.genre.as_deref()).await?;
    let year = chrono::Local::now().year();
    let books = state.content.new_releases(year, genre.as_deref()).await?;
    Ok(Json(page_of(&books, &params, NEW_RELEASES_PAGE_SIZE)))
}

/// GET /api/authors
pub async fn list_authors(State(state): State<AppState>) -> ApiResult<Json<Vec<Author>>> {
    Ok(Json(state.content.authors().await?))
}

/// GET /api/authors/:id
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Author>> {
    Ok(Json(state.content.author(&id).await?))
}

/// GET /api/authors/:id/books
pub async fn author_books(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Book>>> {
    Ok(Json(state.content.books_by_author(&id).await?))
}

/// GET /api/authors/:id/series
pub async fn author_series(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Series>>> {
    Ok(Json(state.content.series_by_author(&id).await?))
}

/// GET /api/series
pub async fn list_series(State(state): State<AppState>) -> ApiResult<Json<Vec<Series>>> {
    Ok(Json(state.content.series_list().await?))
}

/// GET /api/series/:id
pub async fn get_series(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Series>> {
    Ok(Json(state.content.series(&id).await?))
}

/// GET /api/genres
pub async fn list_genres(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> ApiResult<Json<Page<Genre>>> {
    let genres = state.content.genres().await?;
    Ok(Json(page_of(&genres, &params, GENRES_PAGE_SIZE)))
}

/// GET /api/genres/:name
pub async fn get_genre(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<PageQuery>,
) -> ApiResult<Json<GenreDetail>> {
    let genre = state.content.genre_by_name(&name).await?;
    let books = state.content.books_by_genre(&genre.id).await?;
    let lists = state.content.lists_by_genre(&genre.id).await?;
    Ok(Json(GenreDetail {
        books: page_of(&books, &params, BOOKS_PAGE_SIZE),
        genre,
        lists,
    }))
}

/// GET /api/lists
pub async fn list_lists(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> ApiResult<Json<Page<BookList>>> {
    let lists = state.content.lists().await?;
    Ok(Json(page_of(&lists, &params, LISTS_PAGE_SIZE)))
}

/// GET /api/lists/:id
pub async fn get_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PageQuery>,
) -> ApiResult<Json<ListDetail>> {
    let mut list = state.content.list(&id).await?;
    let books = std::mem::take(&mut list.books);
    Ok(Json(ListDetail {
        books: page_of(&books, &params, LIST_DETAIL_PAGE_SIZE),
        list,
    }))
}

/// GET /api/tags
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(state.content.tags().await?))
}

/// GET /api/tags/:name/lists
pub async fn tag_lists(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<BookList>>> {
    Ok(Json(state.content.lists_by_tag_name(&name).await?))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.content.user(&id).await?))
}

/// Build catalog routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/books", get(list_books))
        .route("/api/books/:id", get(get_book))
        .route("/api/new-releases", get(new_releases))
        .route("/api/authors", get(list_authors))
        .route("/api/authors/:id", get(get_author))
        .route("/api/authors/:id/books", get(author_books))
        .route("/api/authors/:id/series", get(author_series))
        .route("/api/series", get(list_series))
        .route("/api/series/:id", get(get_series))
        .route("/api/genres", get(list_genres))
        .route("/api/genres/:name", get(get_genre))
        .route("/api/lists", get(list_lists))
        .route("/api/lists/:id", get(get_list))
        .route("/api/tags", get(list_tags))
        .route("/api/tags/:name/lists", get(tag_lists))
        .route("/api/users/:id", get(get_user))
}
