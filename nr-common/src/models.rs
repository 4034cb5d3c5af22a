//! Content data-transfer objects
//!
//! Entries from the content store arrive as open-ended records. They are
//! converted into these types once, at the gateway boundary (see
//! [`crate::content::resolve`]); render sites never see raw fields.

use crate::Category;
use serde::{Deserialize, Serialize};

/// Media asset (cover image, profile picture)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Resolved link to an author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRef {
    pub id: String,
    pub full_name: String,
}

/// Resolved link to a genre
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreRef {
    pub id: String,
    pub name: String,
}

/// Resolved link to a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub author: Option<AuthorRef>,
    #[serde(default)]
    pub genres: Vec<GenreRef>,
    #[serde(default)]
    pub cover: Option<Asset>,
}

impl Book {
    pub fn href(&self) -> String {
        format!("/books/{}", self.id)
    }

    pub fn has_genre(&self, genre_id: &str) -> bool {
        self.genres.iter().any(|g| g.id == genre_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub profile_image: Option<Asset>,
    #[serde(default)]
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover: Option<Asset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<AuthorRef>,
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover: Option<Asset>,
    #[serde(default)]
    pub genres: Vec<GenreRef>,
}

impl Series {
    pub fn contains_book(&self, book_id: &str) -> bool {
        self.books.iter().any(|b| b.id == book_id)
    }
}

/// Curated reading list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genres: Vec<GenreRef>,
    #[serde(default)]
    pub tags: Vec<TagRef>,
    #[serde(default)]
    pub books: Vec<Book>,
}

/// Public profile of a user (never carries the password hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<Asset>,
    #[serde(default)]
    pub favorite_genres: Vec<GenreRef>,
    #[serde(default)]
    pub joined_date: Option<String>,
    #[serde(default)]
    pub account_status: Option<bool>,
}

/// The four category lists of one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shelves {
    #[serde(default)]
    pub want_to_read: Vec<Book>,
    #[serde(default)]
    pub currently_reading: Vec<Book>,
    #[serde(default)]
    pub read: Vec<Book>,
    #[serde(default)]
    pub favourites: Vec<Book>,
}

impl Shelves {
    pub fn get(&self, category: Category) -> &Vec<Book> {
        match category {
            Category::WantToRead => &self.want_to_read,
            Category::CurrentlyReading => &self.currently_reading,
            Category::Read => &self.read,
            Category::Favourites => &self.favourites,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut Vec<Book> {
        match category {
            Category::WantToRead => &mut self.want_to_read,
            Category::CurrentlyReading => &mut self.currently_reading,
            Category::Read => &mut self.read,
            Category::Favourites => &mut self.favourites,
        }
    }

    pub fn contains(&self, category: Category, book_id: &str) -> bool {
        self.get(category).iter().any(|b| b.id == book_id)
    }

    /// Categories currently holding the book
    pub fn categories_of(&self, book_id: &str) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.contains(*c, book_id))
            .collect()
    }

    /// Look a book up in any list
    pub fn find(&self, book_id: &str) -> Option<&Book> {
        Category::ALL
            .into_iter()
            .flat_map(|c| self.get(c).iter())
            .find(|b| b.id == book_id)
    }

    /// True when the three reading-status lists are empty (favourites ignored)
    pub fn is_empty(&self) -> bool {
        self.want_to_read.is_empty() && self.currently_reading.is_empty() && self.read.is_empty()
    }
}

/// One hit from the header search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchResult {
    #[serde(rename_all = "camelCase")]
    Book {
        id: String,
        title: String,
        href: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        year: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        author_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        author_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Author {
        id: String,
        title: String,
        href: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        profile_image_url: Option<String>,
    },
}

impl SearchResult {
    pub fn title(&self) -> &str {
        match self {
            SearchResult::Book { title, .. } | SearchResult::Author { title, .. } => title,
        }
    }

    pub fn href(&self) -> &str {
        match self {
            SearchResult::Book { href, .. } | SearchResult::Author { href, .. } => href,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str) -> Book {
        Book {
            id: id.to_string(),
            title: format!("Title {id}"),
            description: None,
            rating: None,
            language: None,
            isbn: None,
            publication_year: None,
            author: None,
            genres: Vec::new(),
            cover: None,
        }
    }

    #[test]
    fn test_shelves_membership() {
        let mut shelves = Shelves::default();
        shelves.want_to_read.push(book("b1"));
        shelves.favourites.push(book("b1"));
        shelves.read.push(book("b2"));

        assert_eq!(
            shelves.categories_of("b1"),
            vec![Category::WantToRead, Category::Favourites]
        );
        assert!(shelves.contains(Category::Read, "b2"));
        assert!(shelves.find("b3").is_none());
        assert!(!shelves.is_empty());
    }

    #[test]
    fn test_favourites_only_counts_as_empty() {
        let mut shelves = Shelves::default();
        shelves.favourites.push(book("b1"));
        assert!(shelves.is_empty());
    }

    #[test]
    fn test_search_result_tagging() {
        let hit = SearchResult::Author {
            id: "a1".to_string(),
            title: "Ivo Andrić".to_string(),
            href: "/author/a1".to_string(),
            profile_image_url: None,
        };
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["type"], "author");
        assert_eq!(json["href"], "/author/a1");
        assert!(json.get("profileImageUrl").is_none());
    }
}
