//! Management API client
//!
//! - `GET  {base}/spaces/{space}/environments/{env}/entries/{id}`
//! - `PUT  {base}/spaces/{space}/environments/{env}/entries/{id}` (update)
//! - `PUT  {base}/spaces/{space}/environments/{env}/entries/{id}/published` (publish)
//!
//! Writes carry `X-Contentful-Version`; the store answers 409 when it is stale.

use super::{EntryStore, ManagedEntry};
use crate::config::ContentCredentials;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Default timeout for management API requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Version header used for optimistic locking
pub const VERSION_HEADER: &str = "X-Contentful-Version";

/// Media type of management API bodies
const MANAGEMENT_CONTENT_TYPE: &str = "application/vnd.contentful.management.v1+json";

/// Management API client
#[derive(Clone)]
pub struct ManagementClient {
    http_client: Client,
    base_url: String,
    space_id: String,
    environment: String,
    access_token: String,
}

impl ManagementClient {
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
            creds.management_url.clone(),
            creds.space_id.clone(),
            creds.environment.clone(),
            creds.management_token.clone(),
        )
    }

    fn entry_url(&self, id: &str) -> String {
        format!(
            "{}/spaces/{}/environments/{}/entries/{}",
            self.base_url, self.space_id, self.environment, id
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(header::AUTHORIZATION, format!("Bearer {}", self.access_token))
    }

    async fn send(&self, request: RequestBuilder, id: &str, action: &str) -> Result<ManagedEntry> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Management API {} failed: {}", action, e)))?;
        read_entry(response, id, action).await
    }
}

async fn read_entry(response: Response, id: &str, action: &str) -> Result<ManagedEntry> {
    let status = response.status();
    match status {
        StatusCode::NOT_FOUND => Err(Error::NotFound(format!("entry {}", id))),
        StatusCode::CONFLICT => Err(Error::Conflict(format!(
            "entry {} changed since it was read ({})",
            id, action
        ))),
        s if s.is_success() => response.json().await.map_err(|e| {
            Error::Parse(format!("Failed to parse management response ({}): {}", action, e))
        }),
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Upstream(format!(
                "Management API {} returned error {}: {}",
                action, status, body
            )))
        }
    }
}

#[async_trait]
impl EntryStore for ManagementClient {
    async fn get_entry(&self, id: &str) -> Result<ManagedEntry> {
        debug!(entry = %id, "Fetching entry from management API");
        let request = self.http_client.get(self.entry_url(id));
        self.send(request, id, "get").await
    }

    async fn update_entry(&self, entry: &ManagedEntry) -> Result<ManagedEntry> {
        debug!(entry = %entry.id(), version = entry.version(), "Updating entry");
        let request = self
            .http_client
            .put(self.entry_url(entry.id()))
            .header(VERSION_HEADER, entry.version().to_string())
            .header(header::CONTENT_TYPE, MANAGEMENT_CONTENT_TYPE)
            .body(json!({ "fields": entry.fields }).to_string());
        self.send(request, entry.id(), "update").await
    }

    async fn publish_entry(&self, entry: &ManagedEntry) -> Result<ManagedEntry> {
        debug!(entry = %entry.id(), version = entry.version(), "Publishing entry");
        let request = self
            .http_client
            .put(format!("{}/published", self.entry_url(entry.id())))
            .header(VERSION_HEADER, entry.version().to_string());
        self.send(request, entry.id(), "publish").await
    }
}
