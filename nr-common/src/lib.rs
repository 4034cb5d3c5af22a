//! # Next Reads Common Library
//!
//! Shared code for the Next Reads web service and shelf client including:
//! - Error type and result alias
//! - Bootstrap configuration loading
//! - Reading-status categories
//! - Content data-transfer objects, validated at ingestion
//! - Content Gateway (read access to the external content store)
//! - Category Mutation Gateway (writes through the management API)
//! - Pagination helpers
//! - Internal HTTP request/response types

pub mod api;
pub mod category;
pub mod config;
pub mod content;
pub mod error;
pub mod management;
pub mod models;
pub mod pagination;

pub use category::Category;
pub use error::{Error, Result};
