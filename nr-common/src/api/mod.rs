//! Internal HTTP API shared by the web service and the shelf client
//!
//! Request and response bodies of the `/api/my-books/*` routes, plus the
//! query types of the catalog routes. Pure types, no HTTP framework.

pub mod types;

pub use types::{
    CategoryRequest, ErrorResponse, IsFavoriteResponse, MessageResponse, MoveCategoryRequest,
    MyBooksQuery, PageQuery, SearchQuery,
};

/// Route prefix of the bookshelf endpoints
pub const MY_BOOKS_PREFIX: &str = "/api/my-books";

/// Body of every 400 answer from the bookshelf endpoints
pub const MISSING_PARAMETERS: &str = "Missing parameters";

pub const CATEGORY_UPDATED: &str = "Category updated";
pub const CATEGORY_MOVED: &str = "Category moved successfully";
pub const BOOK_REMOVED: &str = "Book removed from category";
