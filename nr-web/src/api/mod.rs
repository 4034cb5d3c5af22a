//! HTTP API handlers for nr-web

pub mod catalog;
pub mod health;
pub mod my_books;
pub mod search;

pub use catalog::catalog_routes;
pub use health::health_routes;
pub use my_books::my_books_routes;
pub use search::search_routes;
