//! Delivery API client
//!
//! Read-only access to published entries:
//! `GET {base}/spaces/{space}/environments/{env}/entries?{query}`
//! authenticated with a bearer delivery token.

use super::{ContentSource, EntryCollection, EntryQuery};
use crate::config::ContentCredentials;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Default timeout for delivery API requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Delivery API client
#[derive(Clone)]
pub struct DeliveryClient {
    http_client: Client,
    base_url: String,
    space_id: String,
    environment: String,
    access_token: String,
}

impl DeliveryClient {
    pub fn new(
        base_url: impl Into<String>,
        space_id: impl Into<String>,
        environment: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            space_id: space_id.into(),
            environment: environment.into(),
            access_token: access_token.into(),
        })
    }

    pub fn from_credentials(creds: &ContentCredentials) -> Result<Self> {
        Self::new(
            creds.delivery_url.clone(),
            creds.space_id.clone(),
            creds.environment.clone(),
            creds.delivery_token.clone(),
        )
    }

    fn entries_url(&self) -> String {
        format!(
            "{}/spaces/{}/environments/{}/entries",
            self.base_url, self.space_id, self.environment
        )
    }
}

#[async_trait]
impl ContentSource for DeliveryClient {
    async fn entries(&self, query: &EntryQuery) -> Result<EntryCollection> {
        let params = query.to_params();
        debug!(params = ?params, "Querying delivery API");

        let response = self
            .http_client
            .get(self.entries_url())
            .header(header::AUTHORIZATION, format!("Bearer {}", self.access_token))
            .query(&params)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Delivery API request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!(
                "Delivery API resource not found (space {}, environment {})",
                self.space_id, self.environment
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "Delivery API returned error {}: {}",
                status, body
            )));
        }

        let collection: EntryCollection = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("Failed to parse delivery response: {}", e)))?;

        debug!(
            total = collection.total,
            items = collection.items.len(),
            "Delivery query complete"
        );
        Ok(collection)
    }
}
