//! Content Gateway: read access to the external content store
//!
//! # Architecture
//!
//! - [`ContentSource`]: the seam to the store. One operation, an entries query
//!   with optional link resolution (`include` depth).
//! - [`DeliveryClient`]: `ContentSource` over the hosted delivery API.
//! - [`MemorySpace`]: in-process store used for fixtures and tests.
//! - [`LinkResolver`]: turns raw entries plus their includes into DTOs.
//! - [`ContentGateway`]: typed read operations used by the HTTP surface.

pub mod delivery;
pub mod gateway;
pub mod memory;
pub mod resolve;

pub use delivery::DeliveryClient;
pub use gateway::ContentGateway;
pub use memory::{MemorySpace, SpaceFixture};
pub use resolve::LinkResolver;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Content type identifiers used by the store
pub mod content_types {
    pub const AUTHOR: &str = "author";
    pub const BOOK: &str = "books";
    pub const GENRE: &str = "genre";
    pub const LIST: &str = "list";
    pub const SERIES: &str = "series";
    pub const TAG: &str = "tag";
    pub const USER: &str = "user";
}

/// Largest link-resolution depth accepted by the store
pub const MAX_INCLUDE_DEPTH: u8 = 10;

/// Largest page the store returns per request
pub const MAX_PAGE_LIMIT: u32 = 100;

/// `sys` block of an entry or asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySys {
    pub id: String,
    #[serde(rename = "type", default = "entry_kind")]
    pub kind: String,
    #[serde(rename = "contentType", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

fn entry_kind() -> String {
    "Entry".to_string()
}

impl EntrySys {
    pub fn entry(id: impl Into<String>, content_type: &str) -> Self {
        Self {
            id: id.into(),
            kind: entry_kind(),
            content_type: Some(Link::new("ContentType", content_type)),
            version: None,
        }
    }
}

/// Link to another entry, asset or content type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub sys: LinkSys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSys {
    pub id: String,
    #[serde(rename = "type", default = "link_kind")]
    pub kind: String,
    #[serde(rename = "linkType")]
    pub link_type: String,
}

fn link_kind() -> String {
    "Link".to_string()
}

impl Link {
    pub fn new(link_type: &str, id: impl Into<String>) -> Self {
        Self {
            sys: LinkSys {
                id: id.into(),
                kind: link_kind(),
                link_type: link_type.to_string(),
            },
        }
    }

    pub fn entry(id: impl Into<String>) -> Self {
        Self::new("Entry", id)
    }

    pub fn asset(id: impl Into<String>) -> Self {
        Self::new("Asset", id)
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "sys": { "type": self.sys.kind, "linkType": self.sys.link_type, "id": self.sys.id }
        })
    }

    /// Read a link from a field value; `None` for anything that is not a link
    pub fn from_value(value: &Value) -> Option<Link> {
        let sys = value.get("sys")?;
        let id = sys.get("id")?.as_str()?;
        let link_type = sys
            .get("linkType")
            .and_then(Value::as_str)
            .unwrap_or("Entry");
        Some(Link::new(link_type, id))
    }
}

/// Link ids held by a field that may be a single link, an array of links, or absent
pub fn link_ids(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Link::from_value)
            .map(|l| l.sys.id)
            .collect(),
        Some(single @ Value::Object(_)) => Link::from_value(single)
            .map(|l| vec![l.sys.id])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Entry as returned by the store, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    pub sys: EntrySys,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RawEntry {
    pub fn id(&self) -> &str {
        &self.sys.id
    }

    pub fn content_type(&self) -> Option<&str> {
        self.sys.content_type.as_ref().map(|l| l.sys.id.as_str())
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }
}

/// Asset as returned by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAsset {
    pub sys: EntrySys,
    #[serde(default)]
    pub fields: AssetFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<AssetFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetFile {
    pub url: String,
    #[serde(rename = "contentType", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Linked entries and assets resolved alongside a query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Includes {
    #[serde(rename = "Entry", default)]
    pub entries: Vec<RawEntry>,
    #[serde(rename = "Asset", default)]
    pub assets: Vec<RawAsset>,
}

/// One page of an entries query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryCollection {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub items: Vec<RawEntry>,
    #[serde(default)]
    pub includes: Includes,
}

/// Field filter supported by the entries query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFilter {
    /// `fields.<name>=<value>`
    Equals { field: String, value: String },
    /// `fields.<name>[match]=<value>`: substring match
    Matches { field: String, value: String },
    /// `fields.<name>.sys.id=<id>`: field links to the entry
    LinksTo { field: String, id: String },
}

/// Entries query
///
/// # Examples
/// ```
/// use nr_common::content::EntryQuery;
///
/// let query = EntryQuery::of_type("books").matching("title", "dune").include(2);
/// let params = query.to_params();
/// assert!(params.contains(&("content_type".to_string(), "books".to_string())));
/// assert!(params.contains(&("fields.title[match]".to_string(), "dune".to_string())));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryQuery {
    pub content_type: Option<String>,
    pub id: Option<String>,
    pub filters: Vec<FieldFilter>,
    pub include: u8,
    pub limit: Option<u32>,
    pub skip: u32,
}

impl EntryQuery {
    pub fn of_type(content_type: &str) -> Self {
        Self {
            content_type: Some(content_type.to_string()),
            ..Self::default()
        }
    }

    /// Single entry by id, any content type
    pub fn by_id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn field_eq(mut self, field: &str, value: &str) -> Self {
        self.filters.push(FieldFilter::Equals {
            field: field.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn matching(mut self, field: &str, value: &str) -> Self {
        self.filters.push(FieldFilter::Matches {
            field: field.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn links_to(mut self, field: &str, id: &str) -> Self {
        self.filters.push(FieldFilter::LinksTo {
            field: field.to_string(),
            id: id.to_string(),
        });
        self
    }

    pub fn include(mut self, depth: u8) -> Self {
        self.include = depth.min(MAX_INCLUDE_DEPTH);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit.clamp(1, MAX_PAGE_LIMIT));
        self
    }

    pub fn skip(mut self, skip: u32) -> Self {
        self.skip = skip;
        self
    }

    /// Query-string parameters understood by the delivery API
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(ct) = &self.content_type {
            params.push(("content_type".to_string(), ct.clone()));
        }
        if let Some(id) = &self.id {
            params.push(("sys.id".to_string(), id.clone()));
        }
        for filter in &self.filters {
            params.push(match filter {
                FieldFilter::Equals { field, value } => (format!("fields.{field}"), value.clone()),
                FieldFilter::Matches { field, value } => {
                    (format!("fields.{field}[match]"), value.clone())
                }
                FieldFilter::LinksTo { field, id } => (format!("fields.{field}.sys.id"), id.clone()),
            });
        }
        params.push(("include".to_string(), self.include.to_string()));
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if self.skip > 0 {
            params.push(("skip".to_string(), self.skip.to_string()));
        }
        params
    }
}

/// Read side of the external content store
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Run an entries query, resolving links to `query.include` levels
    async fn entries(&self, query: &EntryQuery) -> Result<EntryCollection>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_link_ids_single_array_and_missing() {
        let single = json!({"sys": {"type": "Link", "linkType": "Entry", "id": "b1"}});
        let array = json!([
            {"sys": {"type": "Link", "linkType": "Entry", "id": "b1"}},
            {"sys": {"type": "Link", "linkType": "Entry", "id": "b2"}},
            "not a link"
        ]);

        assert_eq!(link_ids(Some(&single)), vec!["b1"]);
        assert_eq!(link_ids(Some(&array)), vec!["b1", "b2"]);
        assert!(link_ids(None).is_empty());
        assert!(link_ids(Some(&json!(42))).is_empty());
    }

    #[test]
    fn test_link_value_shape() {
        let value = Link::entry("b7").to_value();
        assert_eq!(value["sys"]["type"], "Link");
        assert_eq!(value["sys"]["linkType"], "Entry");
        assert_eq!(value["sys"]["id"], "b7");
    }

    #[test]
    fn test_query_params() {
        let params = EntryQuery::of_type("series")
            .links_to("author", "a1")
            .include(20)
            .limit(500)
            .skip(100)
            .to_params();

        assert_eq!(
            params,
            vec![
                ("content_type".to_string(), "series".to_string()),
                ("fields.author.sys.id".to_string(), "a1".to_string()),
                ("include".to_string(), "10".to_string()),
                ("limit".to_string(), "100".to_string()),
                ("skip".to_string(), "100".to_string()),
            ]
        );
    }

    #[test]
    fn test_raw_entry_deserialization() {
        let entry: RawEntry = serde_json::from_value(json!({
            "sys": {
                "id": "b1",
                "type": "Entry",
                "contentType": {"sys": {"type": "Link", "linkType": "ContentType", "id": "books"}}
            },
            "fields": {"title": "Na Drini ćuprija", "rating": null}
        }))
        .unwrap();

        assert_eq!(entry.id(), "b1");
        assert_eq!(entry.content_type(), Some("books"));
        assert!(entry.field("title").is_some());
        assert!(entry.field("rating").is_none());
    }
}
