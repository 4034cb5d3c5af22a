//! Typed read operations over a [`ContentSource`]

use super::resolve::keep_valid;
use super::{content_types, ContentSource, EntryCollection, EntryQuery, LinkResolver, RawEntry, MAX_PAGE_LIMIT};
use crate::models::{
    Author, Book, BookList, Genre, SearchResult, Series, Shelves, Tag, UserProfile,
};
use crate::{Error, Result};
use std::sync::Arc;
use tracing::debug;

/// Number of search hits returned when the caller gives no limit
pub const DEFAULT_SEARCH_LIMIT: usize = 3;

/// Content Gateway
#[derive(Clone)]
pub struct ContentGateway {
    source: Arc<dyn ContentSource>,
}

impl ContentGateway {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    /// Run a query page by page until `total` items are collected
    async fn fetch_all(&self, query: EntryQuery) -> Result<EntryCollection> {
        let mut merged = EntryCollection::default();
        let mut skip = 0u32;
        loop {
            let page = self
                .source
                .entries(&query.clone().limit(MAX_PAGE_LIMIT).skip(skip))
                .await?;
            let received = page.items.len();
            merged.total = page.total;
            merged.items.extend(page.items);
            merged.includes.entries.extend(page.includes.entries);
            merged.includes.assets.extend(page.includes.assets);

            if received == 0 || merged.items.len() as u64 >= merged.total {
                break;
            }
            skip += received as u32;
        }
        merged.limit = merged.items.len() as u64;
        debug!(
            content_type = ?query.content_type,
            items = merged.items.len(),
            "Fetched collection"
        );
        Ok(merged)
    }

    /// Every entry matching `query`, converted with `convert`; invalid entries are skipped
    async fn collect<T, F>(&self, query: EntryQuery, convert: F) -> Result<Vec<T>>
    where
        F: Fn(&LinkResolver<'_>, &RawEntry) -> Result<T>,
    {
        let collection = self.fetch_all(query).await?;
        let resolver = LinkResolver::new(&collection);
        Ok(collection
            .items
            .iter()
            .filter_map(|entry| keep_valid(convert(&resolver, entry)))
            .collect())
    }

    /// First entry matching `query`, or `NotFound(what)`
    async fn first<T, F>(&self, query: EntryQuery, what: String, convert: F) -> Result<T>
    where
        F: Fn(&LinkResolver<'_>, &RawEntry) -> Result<T>,
    {
        let collection = self.source.entries(&query.limit(1)).await?;
        let resolver = LinkResolver::new(&collection);
        match collection.items.first() {
            Some(entry) => convert(&resolver, entry),
            None => Err(Error::NotFound(what)),
        }
    }

    // Books

    pub async fn book(&self, id: &str) -> Result<Book> {
        self.first(
            EntryQuery::of_type(content_types::BOOK).with_id(id).include(2),
            format!("book {}", id),
            |r, e| r.book(e),
        )
        .await
    }

    pub async fn books(&self) -> Result<Vec<Book>> {
        self.collect(EntryQuery::of_type(content_types::BOOK).include(1), |r, e| r.book(e))
            .await
    }

    pub async fn books_by_genre(&self, genre_id: &str) -> Result<Vec<Book>> {
        self.collect(
            EntryQuery::of_type(content_types::BOOK)
                .links_to("genre", genre_id)
                .include(1),
            |r, e| r.book(e),
        )
        .await
    }

    /// Books published in `current_year` or the year before, newest first
    pub async fn new_releases(&self, current_year: i32, genre_id: Option<&str>) -> Result<Vec<Book>> {
        let mut books: Vec<Book> = self
            .books()
            .await?
            .into_iter()
            .filter(|b| matches!(b.publication_year, Some(y) if y == current_year || y == current_year - 1))
            .filter(|b| genre_id.map_or(true, |g| b.has_genre(g)))
            .collect();
        books.sort_by(|a, b| b.publication_year.cmp(&a.publication_year));
        Ok(books)
    }

    /// Series that lists the book, if any
    pub async fn series_for_book(&self, book_id: &str) -> Result<Option<Series>> {
        let mut series = self
            .collect(
                EntryQuery::of_type(content_types::SERIES)
                    .links_to("books", book_id)
                    .include(2),
                |r, e| r.series(e),
            )
            .await?;
        Ok((!series.is_empty()).then(|| series.remove(0)))
    }

    // Authors

    pub async fn authors(&self) -> Result<Vec<Author>> {
        self.collect(EntryQuery::of_type(content_types::AUTHOR).include(2), |r, e| r.author(e))
            .await
    }

    pub async fn author(&self, id: &str) -> Result<Author> {
        self.first(
            EntryQuery::of_type(content_types::AUTHOR).with_id(id).include(2),
            format!("author {}", id),
            |r, e| r.author(e),
        )
        .await
    }

    pub async fn books_by_author(&self, author_id: &str) -> Result<Vec<Book>> {
        Ok(self.author(author_id).await?.books)
    }

    pub async fn series_by_author(&self, author_id: &str) -> Result<Vec<Series>> {
        self.collect(
            EntryQuery::of_type(content_types::SERIES)
                .links_to("author", author_id)
                .include(2),
            |r, e| r.series(e),
        )
        .await
    }

    // Series

    pub async fn series_list(&self) -> Result<Vec<Series>> {
        self.collect(EntryQuery::of_type(content_types::SERIES).include(2), |r, e| r.series(e))
            .await
    }

    pub async fn series(&self, id: &str) -> Result<Series> {
        self.first(
            EntryQuery::of_type(content_types::SERIES).with_id(id).include(2),
            format!("series {}", id),
            |r, e| r.series(e),
        )
        .await
    }

    // Genres

    pub async fn genres(&self) -> Result<Vec<Genre>> {
        self.collect(EntryQuery::of_type(content_types::GENRE).include(1), |r, e| r.genre(e))
            .await
    }

    pub async fn genre(&self, id: &str) -> Result<Genre> {
        self.first(
            EntryQuery::of_type(content_types::GENRE).with_id(id).include(1),
            format!("genre {}", id),
            |r, e| r.genre(e),
        )
        .await
    }

    /// Genre whose name equals `name`, ignoring case
    pub async fn genre_by_name(&self, name: &str) -> Result<Genre> {
        let wanted = name.trim().to_lowercase();
        self.genres()
            .await?
            .into_iter()
            .find(|g| g.name.to_lowercase() == wanted)
            .ok_or_else(|| Error::NotFound(format!("genre '{}'", name)))
    }

    // Lists

    pub async fn lists(&self) -> Result<Vec<BookList>> {
        self.collect(EntryQuery::of_type(content_types::LIST).include(2), |r, e| r.list(e))
            .await
    }

    pub async fn list(&self, id: &str) -> Result<BookList> {
        self.first(
            EntryQuery::of_type(content_types::LIST).with_id(id).include(3),
            format!("list {}", id),
            |r, e| r.list(e),
        )
        .await
    }

    pub async fn lists_by_genre(&self, genre_id: &str) -> Result<Vec<BookList>> {
        self.collect(
            EntryQuery::of_type(content_types::LIST)
                .links_to("genres", genre_id)
                .include(2),
            |r, e| r.list(e),
        )
        .await
    }

    /// Lists carrying the tag named `tag_name`; an unknown tag yields no lists
    pub async fn lists_by_tag_name(&self, tag_name: &str) -> Result<Vec<BookList>> {
        let tags = self
            .source
            .entries(
                &EntryQuery::of_type(content_types::TAG)
                    .field_eq("tagName", tag_name)
                    .limit(1),
            )
            .await?;
        let Some(tag) = tags.items.first() else {
            debug!(tag = %tag_name, "No tag with this name");
            return Ok(Vec::new());
        };

        self.collect(
            EntryQuery::of_type(content_types::LIST)
                .links_to("tag", tag.id())
                .include(3),
            |r, e| r.list(e),
        )
        .await
    }

    // Tags

    pub async fn tags(&self) -> Result<Vec<Tag>> {
        self.collect(EntryQuery::of_type(content_types::TAG), |r, e| r.tag(e))
            .await
    }

    // Users

    pub async fn user(&self, id: &str) -> Result<UserProfile> {
        self.first(
            EntryQuery::of_type(content_types::USER).with_id(id).include(1),
            format!("user {}", id),
            |r, e| r.user(e),
        )
        .await
    }

    /// The four category lists of a user, with books resolved
    pub async fn shelves(&self, user_id: &str) -> Result<Shelves> {
        self.first(
            EntryQuery::of_type(content_types::USER)
                .with_id(user_id)
                .include(3),
            format!("user {}", user_id),
            |r, e| Ok(r.shelves(e)),
        )
        .await
    }

    // Search

    /// Books whose title and authors whose name contain `query`, books first.
    ///
    /// A blank query returns no hits; a `limit` of 0 means [`DEFAULT_SEARCH_LIMIT`].
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let limit = if limit == 0 { DEFAULT_SEARCH_LIMIT } else { limit };
        let per_type = limit.min(MAX_PAGE_LIMIT as usize) as u32;

        let books = self
            .source
            .entries(
                &EntryQuery::of_type(content_types::BOOK)
                    .matching("title", query)
                    .limit(per_type)
                    .include(2),
            )
            .await?;
        let authors = self
            .source
            .entries(
                &EntryQuery::of_type(content_types::AUTHOR)
                    .matching("fullName", query)
                    .limit(per_type)
                    .include(1),
            )
            .await?;

        let book_resolver = LinkResolver::new(&books);
        let author_resolver = LinkResolver::new(&authors);

        let book_hits = books
            .items
            .iter()
            .filter_map(|e| keep_valid(book_resolver.book(e)))
            .map(|book| SearchResult::Book {
                href: book.href(),
                image_url: book.cover.map(|c| c.url),
                description: book.description,
                year: book.publication_year,
                author_name: book.author.as_ref().map(|a| a.full_name.clone()),
                author_id: book.author.map(|a| a.id),
                id: book.id,
                title: book.title,
            });
        let author_hits = authors
            .items
            .iter()
            .filter_map(|e| keep_valid(author_resolver.author(e)))
            .map(|author| SearchResult::Author {
                href: format!("/author/{}", author.id),
                profile_image_url: author.profile_image.map(|i| i.url),
                id: author.id,
                title: author.full_name,
            });

        let results: Vec<SearchResult> = book_hits.chain(author_hits).take(limit).collect();
        debug!(query = %query, hits = results.len(), "Search complete");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemorySpace;
    use serde_json::json;

    async fn gateway_with_books(count: usize) -> ContentGateway {
        let space = MemorySpace::new();
        for i in 0..count {
            space
                .insert_entry("books", &format!("b{i}"), json!({"title": format!("Book {i}")}))
                .await;
        }
        ContentGateway::new(Arc::new(space))
    }

    #[tokio::test]
    async fn test_books_pages_past_store_limit() {
        let gateway = gateway_with_books(230).await;
        let books = gateway.books().await.unwrap();
        assert_eq!(books.len(), 230);
        assert_eq!(books[229].id, "b229");
    }

    #[tokio::test]
    async fn test_missing_book_is_not_found() {
        let gateway = gateway_with_books(1).await;
        let err = gateway.book("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_blank_search_skips_store() {
        let gateway = gateway_with_books(3).await;
        assert!(gateway.search("   ", 3).await.unwrap().is_empty());
    }
}
