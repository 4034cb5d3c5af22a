//! HTTP client for the nr-web bookshelf and search endpoints

use async_trait::async_trait;
use nr_common::api::{
    CategoryRequest, ErrorResponse, IsFavoriteResponse, MessageResponse, MoveCategoryRequest,
    MY_BOOKS_PREFIX,
};
use nr_common::models::{SearchResult, Shelves};
use nr_common::Category;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::backend::{CategoryMutations, SearchSource, ShelfSource};
use crate::{Result, ShelfError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client of a running nr-web service
#[derive(Clone)]
pub struct ShelfClient {
    http_client: Client,
    base_url: String,
}

impl ShelfClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ShelfError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn my_books_url(&self, route: &str) -> String {
        format!("{}{}/{}", self.base_url, MY_BOOKS_PREFIX, route)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String, query: &[(&str, &str)]) -> Result<T> {
        debug!(url = %url, "GET");
        let response = self.http_client.get(url).query(query).send().await?;
        decode(response).await
    }

    async fn post<B: Serialize>(&self, route: &str, body: &B) -> Result<()> {
        let url = self.my_books_url(route);
        debug!(url = %url, "POST");
        let response = self.http_client.post(url).json(body).send().await?;
        let message: MessageResponse = decode(response).await?;
        debug!("{}", message.message);
        Ok(())
    }
}

/// Decode a success body, or turn an error body into [`ShelfError::Api`]
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    Err(ShelfError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ShelfSource for ShelfClient {
    async fn shelves(&self, user_id: &str) -> Result<Shelves> {
        self.get_json(self.my_books_url("shelves"), &[("userId", user_id)])
            .await
    }
}

#[async_trait]
impl CategoryMutations for ShelfClient {
    async fn move_category(
        &self,
        user_id: &str,
        book_id: &str,
        old: Option<Category>,
        new: Category,
    ) -> Result<()> {
        self.post(
            "moveCategory",
            &MoveCategoryRequest::new(user_id, book_id, old, new),
        )
        .await
    }

    async fn remove_from_category(
        &self,
        user_id: &str,
        book_id: &str,
        category: Category,
    ) -> Result<()> {
        self.post(
            "removeFromCategory",
            &CategoryRequest::new(user_id, book_id, category.as_str()),
        )
        .await
    }

    async fn update_category(&self, user_id: &str, book_id: &str, category: &str) -> Result<()> {
        self.post(
            "updateCategory",
            &CategoryRequest::new(user_id, book_id, category),
        )
        .await
    }

    async fn is_favorite(&self, user_id: &str, book_id: &str) -> Result<bool> {
        let response: IsFavoriteResponse = self
            .get_json(
                self.my_books_url("isFavorite"),
                &[("userId", user_id), ("bookId", book_id)],
            )
            .await?;
        Ok(response.is_favorite)
    }
}

#[async_trait]
impl SearchSource for ShelfClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let limit = limit.to_string();
        self.get_json(
            format!("{}/api/search", self.base_url),
            &[("q", query), ("limit", limit.as_str())],
        )
        .await
    }
}
