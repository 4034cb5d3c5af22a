//! Backends of the client-side state
//!
//! The view model, the control and the search box only see these traits.
//! [`ShelfClient`](crate::ShelfClient) implements them over HTTP; the
//! nr-common gateways implement them in-process.

use async_trait::async_trait;
use nr_common::content::ContentGateway;
use nr_common::management::CategoryGateway;
use nr_common::models::{SearchResult, Shelves};
use nr_common::Category;

use crate::Result;

/// Read side: the four category lists of a user
#[async_trait]
pub trait ShelfSource: Send + Sync {
    async fn shelves(&self, user_id: &str) -> Result<Shelves>;
}

/// Write side: the bookshelf mutations
#[async_trait]
pub trait CategoryMutations: Send + Sync {
    /// Move a book; `old == None` means it had no prior category
    async fn move_category(
        &self,
        user_id: &str,
        book_id: &str,
        old: Option<Category>,
        new: Category,
    ) -> Result<()>;

    async fn remove_from_category(
        &self,
        user_id: &str,
        book_id: &str,
        category: Category,
    ) -> Result<()>;

    /// Assign a category by name; `""` removes the book from favourites
    async fn update_category(&self, user_id: &str, book_id: &str, category: &str) -> Result<()>;

    async fn is_favorite(&self, user_id: &str, book_id: &str) -> Result<bool>;
}

/// Header search
#[async_trait]
pub trait SearchSource: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>>;
}

#[async_trait]
impl ShelfSource for ContentGateway {
    async fn shelves(&self, user_id: &str) -> Result<Shelves> {
        Ok(ContentGateway::shelves(self, user_id).await?)
    }
}

#[async_trait]
impl SearchSource for ContentGateway {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        Ok(ContentGateway::search(self, query, limit).await?)
    }
}

#[async_trait]
impl CategoryMutations for CategoryGateway {
    async fn move_category(
        &self,
        user_id: &str,
        book_id: &str,
        old: Option<Category>,
        new: Category,
    ) -> Result<()> {
        let old = old.map(|c| c.as_str());
        Ok(self.move_book(user_id, book_id, old, new.as_str()).await?)
    }

    async fn remove_from_category(
        &self,
        user_id: &str,
        book_id: &str,
        category: Category,
    ) -> Result<()> {
        Ok(self.remove(user_id, book_id, category.as_str()).await?)
    }

    async fn update_category(&self, user_id: &str, book_id: &str, category: &str) -> Result<()> {
        Ok(CategoryGateway::update_category(self, user_id, book_id, category).await?)
    }

    async fn is_favorite(&self, user_id: &str, book_id: &str) -> Result<bool> {
        Ok(self.is_favourite(user_id, book_id).await?)
    }
}
