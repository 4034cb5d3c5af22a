//! Request/response types of the internal HTTP API

use crate::{Category, Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

// ========================================
// Bookshelf Types
// ========================================

/// Query of `GET /api/my-books/isFavorite` and `GET /api/my-books/shelves`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyBooksQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_id: Option<String>,
}

impl MyBooksQuery {
    pub fn user(&self) -> Result<&str> {
        non_empty(&self.user_id, "userId")
    }

    pub fn book(&self) -> Result<&str> {
        non_empty(&self.book_id, "bookId")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsFavoriteResponse {
    pub is_favorite: bool,
}

/// Body of `POST /api/my-books/moveCategory`
///
/// `oldCategory` must be present, but `""` or `null` means the book had no
/// prior category.
///
/// # Examples
///
/// ```
/// use nr_common::api::MoveCategoryRequest;
///
/// let body: MoveCategoryRequest = serde_json::from_str(
///     r#"{"userId":"u1","bookId":"b1","oldCategory":null,"newCategory":"read"}"#,
/// ).unwrap();
/// let (_, _, old, new) = body.validate().unwrap();
/// assert_eq!(old, None);
/// assert_eq!(new, "read");
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCategoryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_id: Option<String>,
    /// Outer `None`: field absent. Inner `None`: field was `null`.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub old_category: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_category: Option<String>,
}

impl MoveCategoryRequest {
    pub fn new(user_id: &str, book_id: &str, old: Option<Category>, new: Category) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            book_id: Some(book_id.to_string()),
            old_category: Some(Some(old.map(|c| c.as_str()).unwrap_or_default().to_string())),
            new_category: Some(new.as_str().to_string()),
        }
    }

    /// `(user, book, old, new)`, with a blank `old` reported as `None`
    pub fn validate(&self) -> Result<(&str, &str, Option<&str>, &str)> {
        let user = non_empty(&self.user_id, "userId")?;
        let book = non_empty(&self.book_id, "bookId")?;
        let new = non_empty(&self.new_category, "newCategory")?;
        let old = match &self.old_category {
            None => return Err(Error::MissingParameter("oldCategory".to_string())),
            Some(old) => old.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        };
        Ok((user, book, old, new))
    }
}

/// Body of `POST /api/my-books/removeFromCategory` and `/updateCategory`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl CategoryRequest {
    pub fn new(user_id: &str, book_id: &str, category: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            book_id: Some(book_id.to_string()),
            category: Some(category.to_string()),
        }
    }

    /// All three fields present and non-empty
    pub fn validate(&self) -> Result<(&str, &str, &str)> {
        Ok((
            non_empty(&self.user_id, "userId")?,
            non_empty(&self.book_id, "bookId")?,
            non_empty(&self.category, "category")?,
        ))
    }

    /// Like [`validate`](Self::validate) but the category may be `""`
    /// (remove from favourites)
    pub fn validate_allow_empty_category(&self) -> Result<(&str, &str, &str)> {
        let category = self
            .category
            .as_deref()
            .ok_or_else(|| Error::MissingParameter("category".to_string()))?;
        Ok((
            non_empty(&self.user_id, "userId")?,
            non_empty(&self.book_id, "bookId")?,
            category,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Flat error body: `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ========================================
// Catalog Types
// ========================================

/// Paging (and optional genre filter) for catalog listings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub genre: Option<String>,
}

/// Header search (`limit`) and the paged results page (`page`, `pageSize`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

fn non_empty<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::MissingParameter(name.to_string()))
}

/// Present-but-null becomes `Some(None)`; absence falls back to `default`
fn deserialize_present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_move(json: &str) -> MoveCategoryRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_move_requires_old_category_field() {
        let absent = parse_move(r#"{"userId":"u1","bookId":"b1","newCategory":"read"}"#);
        assert!(matches!(
            absent.validate(),
            Err(Error::MissingParameter(ref f)) if f == "oldCategory"
        ));

        let empty = parse_move(r#"{"userId":"u1","bookId":"b1","oldCategory":"","newCategory":"read"}"#);
        assert_eq!(empty.validate().unwrap(), ("u1", "b1", None, "read"));

        let given = parse_move(
            r#"{"userId":"u1","bookId":"b1","oldCategory":"wantToRead","newCategory":"read"}"#,
        );
        assert_eq!(
            given.validate().unwrap(),
            ("u1", "b1", Some("wantToRead"), "read")
        );
    }

    #[test]
    fn test_move_missing_book_id() {
        let body = parse_move(r#"{"userId":"u1","oldCategory":"","newCategory":"read"}"#);
        assert!(matches!(body.validate(), Err(Error::MissingParameter(_))));
    }

    #[test]
    fn test_move_constructor_sends_empty_old_category() {
        let body = MoveCategoryRequest::new("u1", "b1", None, Category::CurrentlyReading);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["oldCategory"], "");
        assert_eq!(json["newCategory"], "currentlyReading");
    }

    #[test]
    fn test_update_category_allows_empty_category_only_there() {
        let body = CategoryRequest::new("u1", "b1", "");
        assert!(body.validate().is_err());
        assert_eq!(
            body.validate_allow_empty_category().unwrap(),
            ("u1", "b1", "")
        );

        let no_category = CategoryRequest {
            category: None,
            ..CategoryRequest::new("u1", "b1", "")
        };
        assert!(no_category.validate_allow_empty_category().is_err());
    }
}
