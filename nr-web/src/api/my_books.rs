//! Bookshelf endpoints
//!
//! - `GET  /api/my-books/isFavorite?userId&bookId`
//! - `POST /api/my-books/moveCategory`
//! - `POST /api/my-books/removeFromCategory`
//! - `POST /api/my-books/updateCategory`
//! - `GET  /api/my-books/shelves?userId`
//!
//! Missing fields answer 400 `{"error": "Missing parameters"}`; a failed
//! mutation answers 500 with the gateway's message.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use nr_common::api::{
    CategoryRequest, IsFavoriteResponse, MessageResponse, MoveCategoryRequest, MyBooksQuery,
    BOOK_REMOVED, CATEGORY_MOVED, CATEGORY_UPDATED,
};
use nr_common::models::Shelves;
use tracing::{debug, warn};

use crate::{ApiError, ApiResult, AppState};

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        debug!("Rejected request body: {}", rejection);
        ApiError::MissingParameters
    })
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    params
        .map(|Query(query)| query)
        .map_err(|_| ApiError::MissingParameters)
}

/// GET /api/my-books/isFavorite
pub async fn is_favorite(
    State(state): State<AppState>,
    params: Result<Query<MyBooksQuery>, QueryRejection>,
) -> ApiResult<Json<IsFavoriteResponse>> {
    let params = query(params)?;
    let (Ok(user_id), Ok(book_id)) = (params.user(), params.book()) else {
        return Err(ApiError::MissingParameters);
    };

    match state.categories.is_favourite(user_id, book_id).await {
        Ok(is_favorite) => Ok(Json(IsFavoriteResponse { is_favorite })),
        Err(e) => {
            warn!(user = %user_id, book = %book_id, "Favourite lookup failed: {}", e);
            Err(ApiError::Internal(
                "Failed to fetch favorite status".to_string(),
            ))
        }
    }
}

/// POST /api/my-books/moveCategory
pub async fn move_category(
    State(state): State<AppState>,
    payload: Result<Json<MoveCategoryRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let request = body(payload)?;
    let (user_id, book_id, old, new) = request
        .validate()
        .map_err(|_| ApiError::MissingParameters)?;

    state
        .categories
        .move_book(user_id, book_id, old, new)
        .await
        .map_err(ApiError::gateway)?;

    Ok(Json(MessageResponse::new(CATEGORY_MOVED)))
}

/// POST /api/my-books/removeFromCategory
pub async fn remove_from_category(
    State(state): State<AppState>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let request = body(payload)?;
    let (user_id, book_id, category) = request
        .validate()
        .map_err(|_| ApiError::MissingParameters)?;

    state
        .categories
        .remove(user_id, book_id, category)
        .await
        .map_err(ApiError::gateway)?;

    Ok(Json(MessageResponse::new(BOOK_REMOVED)))
}

/// POST /api/my-books/updateCategory
///
/// An empty `category` removes the book from favourites.
pub async fn update_category(
    State(state): State<AppState>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let request = body(payload)?;
    let (user_id, book_id, category) = request
        .validate_allow_empty_category()
        .map_err(|_| ApiError::MissingParameters)?;

    state
        .categories
        .update_category(user_id, book_id, category)
        .await
        .map_err(ApiError::gateway)?;

    Ok(Json(MessageResponse::new(CATEGORY_UPDATED)))
}

/// GET /api/my-books/shelves
pub async fn shelves(
    State(state): State<AppState>,
    params: Result<Query<MyBooksQuery>, QueryRejection>,
) -> ApiResult<Json<Shelves>> {
    let params = query(params)?;
    let user_id = params.user().map_err(|_| ApiError::MissingParameters)?;
    Ok(Json(state.content.shelves(user_id).await?))
}

/// Build bookshelf routes
pub fn my_books_routes() -> Router<AppState> {
    Router::new()
        .route("/api/my-books/isFavorite", get(is_favorite))
        .route("/api/my-books/moveCategory", post(move_category))
        .route("/api/my-books/removeFromCategory", post(remove_from_category))
        .route("/api/my-books/updateCategory", post(update_category))
        .route("/api/my-books/shelves", get(shelves))
}
