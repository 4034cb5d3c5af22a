//! Conversion of raw entries into validated DTOs
//!
//! Links are looked up among the query's items and includes. A link whose
//! target was not delivered (deleted, unpublished, or beyond the include
//! depth) is dropped, never surfaced half-populated.

use super::{link_ids, EntryCollection, Link, RawAsset, RawEntry};
use crate::models::{
    Asset, Author, AuthorRef, Book, BookList, Genre, GenreRef, Series, Shelves, Tag, TagRef,
    UserProfile,
};
use crate::{Category, Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// Link lookup over one query result
pub struct LinkResolver<'a> {
    entries: HashMap<&'a str, &'a RawEntry>,
    assets: HashMap<&'a str, &'a RawAsset>,
}

impl<'a> LinkResolver<'a> {
    pub fn new(collection: &'a EntryCollection) -> Self {
        let entries = collection
            .items
            .iter()
            .chain(collection.includes.entries.iter())
            .map(|e| (e.id(), e))
            .collect();
        let assets = collection
            .includes
            .assets
            .iter()
            .map(|a| (a.sys.id.as_str(), a))
            .collect();
        Self { entries, assets }
    }

    fn entry(&self, id: &str) -> Option<&'a RawEntry> {
        self.entries.get(id).copied()
    }

    fn linked_entry(&self, value: Option<&Value>) -> Option<&'a RawEntry> {
        value
            .and_then(Link::from_value)
            .and_then(|link| self.entry(&link.sys.id))
    }

    fn linked_entries(&self, value: Option<&Value>) -> Vec<&'a RawEntry> {
        link_ids(value)
            .iter()
            .filter_map(|id| self.entry(id))
            .collect()
    }

    fn asset(&self, value: Option<&Value>) -> Option<Asset> {
        let link = value.and_then(Link::from_value)?;
        let asset = self.assets.get(link.sys.id.as_str())?;
        let file = asset.fields.file.as_ref()?;
        Some(Asset {
            id: asset.sys.id.clone(),
            url: normalize_asset_url(&file.url),
            title: asset.fields.title.clone(),
        })
    }

    pub fn book(&self, entry: &RawEntry) -> Result<Book> {
        let title = required_text(entry, "title")?;
        Ok(Book {
            id: entry.id().to_string(),
            title,
            description: text(entry, "description"),
            rating: entry.field("rating").and_then(Value::as_f64),
            language: text(entry, "language"),
            isbn: text(entry, "isbn"),
            publication_year: year(entry.field("publicationYear")),
            author: self
                .linked_entry(entry.field("author"))
                .and_then(|a| self.author_ref(a)),
            genres: self.genre_refs(entry.field("genre")),
            cover: self.asset(entry.field("coverImage")),
        })
    }

    /// Books behind a link field, skipping entries that fail validation
    pub fn books(&self, value: Option<&Value>) -> Vec<Book> {
        self.linked_entries(value)
            .into_iter()
            .filter_map(|e| keep_valid(self.book(e)))
            .collect()
    }

    fn author_ref(&self, entry: &RawEntry) -> Option<AuthorRef> {
        Some(AuthorRef {
            id: entry.id().to_string(),
            full_name: text(entry, "fullName")?,
        })
    }

    fn genre_refs(&self, value: Option<&Value>) -> Vec<GenreRef> {
        self.linked_entries(value)
            .into_iter()
            .filter_map(|e| {
                Some(GenreRef {
                    id: e.id().to_string(),
                    name: text(e, "name")?,
                })
            })
            .collect()
    }

    fn tag_refs(&self, value: Option<&Value>) -> Vec<TagRef> {
        self.linked_entries(value)
            .into_iter()
            .filter_map(|e| {
                Some(TagRef {
                    id: e.id().to_string(),
                    name: text(e, "tagName")?,
                })
            })
            .collect()
    }

    pub fn author(&self, entry: &RawEntry) -> Result<Author> {
        Ok(Author {
            id: entry.id().to_string(),
            full_name: required_text(entry, "fullName")?,
            bio: text(entry, "bio"),
            nationality: text(entry, "nationality"),
            date_of_birth: text(entry, "dateOfBirth"),
            profile_image: self.asset(entry.field("profileImage")),
            books: self.books(entry.field("books")),
        })
    }

    pub fn genre(&self, entry: &RawEntry) -> Result<Genre> {
        Ok(Genre {
            id: entry.id().to_string(),
            name: required_text(entry, "name")?,
            description: text(entry, "description"),
            cover: self.asset(entry.field("coverImage")),
        })
    }

    pub fn tag(&self, entry: &RawEntry) -> Result<Tag> {
        Ok(Tag {
            id: entry.id().to_string(),
            name: required_text(entry, "tagName")?,
        })
    }

    pub fn series(&self, entry: &RawEntry) -> Result<Series> {
        Ok(Series {
            id: entry.id().to_string(),
            title: required_text(entry, "title")?,
            authors: self
                .linked_entries(entry.field("author"))
                .into_iter()
                .filter_map(|a| self.author_ref(a))
                .collect(),
            books: self.books(entry.field("books")),
            description: entry.field("description").and_then(rich_text_to_plain),
            cover: self.asset(entry.field("coverImage")),
            genres: self.genre_refs(entry.field("genres")),
        })
    }

    pub fn list(&self, entry: &RawEntry) -> Result<BookList> {
        Ok(BookList {
            id: entry.id().to_string(),
            name: required_text(entry, "name")?,
            description: entry.field("description").and_then(rich_text_to_plain),
            genres: self.genre_refs(entry.field("genres")),
            tags: self.tag_refs(entry.field("tag")),
            books: self.books(entry.field("books")),
        })
    }

    pub fn user(&self, entry: &RawEntry) -> Result<UserProfile> {
        Ok(UserProfile {
            id: entry.id().to_string(),
            full_name: required_text(entry, "fullName")?,
            email: required_text(entry, "email")?,
            bio: text(entry, "bio"),
            profile_picture: self.asset(entry.field("profilePicture")),
            favorite_genres: self.genre_refs(entry.field("favoriteGenres")),
            joined_date: text(entry, "joinedDate"),
            account_status: entry.field("accountStatus").and_then(Value::as_bool),
        })
    }

    /// The four category lists of a user entry.
    ///
    /// `currentlyReading` may hold a single link (older entries) or an array.
    pub fn shelves(&self, user: &RawEntry) -> Shelves {
        let mut shelves = Shelves::default();
        for category in Category::ALL {
            *shelves.get_mut(category) = self.books(user.field(category.field_name()));
        }
        shelves
    }
}

pub(crate) fn keep_valid<T>(result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Skipping entry: {}", e);
            None
        }
    }
}

fn text(entry: &RawEntry, field: &str) -> Option<String> {
    entry
        .field(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required_text(entry: &RawEntry, field: &str) -> Result<String> {
    text(entry, field).ok_or_else(|| Error::InvalidEntry {
        id: entry.id().to_string(),
        reason: format!("missing required field '{}'", field),
    })
}

/// Publication year stored as an integer or a numeric string
fn year(value: Option<&Value>) -> Option<i32> {
    match value? {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Protocol-relative asset URLs get an explicit scheme
pub fn normalize_asset_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    }
}

/// Flatten a rich-text document (or plain string) to text.
///
/// Top-level blocks become paragraphs separated by a blank line.
pub fn rich_text_to_plain(value: &Value) -> Option<String> {
    fn collect(node: &Value, out: &mut String) {
        if let Some(text) = node.get("value").and_then(Value::as_str) {
            out.push_str(text);
        }
        if let Some(children) = node.get("content").and_then(Value::as_array) {
            for child in children {
                collect(child, out);
            }
        }
    }

    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Object(_) => {
            let blocks = value.get("content").and_then(Value::as_array)?;
            blocks
                .iter()
                .map(|block| {
                    let mut paragraph = String::new();
                    collect(block, &mut paragraph);
                    paragraph.trim().to_string()
                })
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n")
        }
        _ => return None,
    };

    (!text.is_empty()).then_some(text)
}
