//! Reading-status categories
//!
//! A book is "in" a category for a user when its link appears in the matching
//! array field of the user entry. The wire name and the entry field differ for
//! `read` (stored as `readBooks`).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four bookshelf buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    WantToRead,
    CurrentlyReading,
    Read,
    Favourites,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 4] = [
        Category::WantToRead,
        Category::CurrentlyReading,
        Category::Read,
        Category::Favourites,
    ];

    /// Name used by the HTTP API and the front end
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::WantToRead => "wantToRead",
            Category::CurrentlyReading => "currentlyReading",
            Category::Read => "read",
            Category::Favourites => "favourites",
        }
    }

    /// Field of the user entry holding this category's book links
    pub fn field_name(&self) -> &'static str {
        match self {
            Category::WantToRead => "wantToRead",
            Category::CurrentlyReading => "currentlyReading",
            Category::Read => "readBooks",
            Category::Favourites => "favourites",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::WantToRead => "Want To Read",
            Category::CurrentlyReading => "Currently Reading",
            Category::Read => "Read",
            Category::Favourites => "Favourites",
        }
    }

    /// Parse a category that may legitimately be absent.
    ///
    /// Empty (or whitespace-only) input means "no category".
    pub fn parse_optional(value: &str) -> Result<Option<Category>> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            trimmed.parse().map(Some)
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::InvalidCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_maps_to_read_books_field() {
        assert_eq!(Category::Read.as_str(), "read");
        assert_eq!(Category::Read.field_name(), "readBooks");
        assert_eq!(Category::WantToRead.field_name(), "wantToRead");
    }

    #[test]
    fn test_parse_known_names() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_parse_rejects_field_name_and_unknown() {
        // The entry field name is not a valid wire name
        assert!(matches!(
            "readBooks".parse::<Category>(),
            Err(Error::InvalidCategory(_))
        ));
        assert!(matches!(
            "WantToRead".parse::<Category>(),
            Err(Error::InvalidCategory(_))
        ));
    }

    #[test]
    fn test_parse_optional_empty_is_none() {
        assert_eq!(Category::parse_optional("").unwrap(), None);
        assert_eq!(Category::parse_optional("  ").unwrap(), None);
        assert_eq!(
            Category::parse_optional("favourites").unwrap(),
            Some(Category::Favourites)
        );
        assert!(Category::parse_optional("shelf").is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&Category::CurrentlyReading).unwrap();
        assert_eq!(json, "\"currentlyReading\"");
        let parsed: Category = serde_json::from_str("\"favourites\"").unwrap();
        assert_eq!(parsed, Category::Favourites);
    }
}
