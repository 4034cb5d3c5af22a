//! In-process content store
//!
//! Serves both sides of the external store from memory: delivery reads see
//! published entries, management calls edit drafts and publish them. Used when
//! the service runs from a fixture file and throughout the tests.

use super::{
    link_ids, AssetFields, AssetFile, ContentSource, EntryCollection, EntryQuery, EntrySys,
    FieldFilter, Includes, RawAsset, RawEntry, MAX_PAGE_LIMIT,
};
use crate::management::{EntryStore, ManagedEntry, DEFAULT_LOCALE};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Contents of a fixture file, in delivery-API shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpaceFixture {
    #[serde(default)]
    pub entries: Vec<RawEntry>,
    #[serde(default)]
    pub assets: Vec<RawAsset>,
}

impl SpaceFixture {
    /// Parse a fixture document; it must be a JSON object
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::Parse(format!("Invalid fixture: {}", e)))?;
        if !value.is_object() {
            return Err(Error::Parse(
                "Invalid fixture: expected an object with `entries` and `assets`".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| Error::Parse(format!("Invalid fixture: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read fixture {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }
}

#[derive(Debug, Clone)]
struct StoredEntry {
    id: String,
    content_type: String,
    version: u64,
    /// Localized fields of the latest draft
    draft: Map<String, Value>,
    /// Localized fields as last published
    published: Option<Map<String, Value>>,
}

impl StoredEntry {
    fn sys(&self, version: Option<u64>) -> EntrySys {
        EntrySys {
            version,
            ..EntrySys::entry(self.id.clone(), &self.content_type)
        }
    }

    fn managed(&self) -> ManagedEntry {
        ManagedEntry {
            sys: self.sys(Some(self.version)),
            fields: self.draft.clone(),
        }
    }

    fn delivered(&self) -> Option<RawEntry> {
        let published = self.published.as_ref()?;
        Some(RawEntry {
            sys: self.sys(None),
            fields: delocalize(published),
        })
    }
}

#[derive(Default)]
struct SpaceState {
    entries: Vec<StoredEntry>,
    assets: Vec<RawAsset>,
}

impl SpaceState {
    fn find_mut(&mut self, id: &str) -> Result<&mut StoredEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Error::NotFound(format!("entry {}", id)))
    }
}

/// Content store held in memory
#[derive(Default)]
pub struct MemorySpace {
    state: RwLock<SpaceState>,
    fail_writes: AtomicBool,
    updates: AtomicUsize,
}

impl MemorySpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Space holding the fixture's entries and assets, all published
    pub fn from_fixture(fixture: SpaceFixture) -> Self {
        let mut state = SpaceState {
            assets: fixture.assets,
            ..SpaceState::default()
        };
        for entry in fixture.entries {
            let content_type = entry.content_type().unwrap_or_default().to_string();
            let localized = localize(&entry.fields);
            state.entries.push(StoredEntry {
                id: entry.sys.id,
                content_type,
                version: 1,
                draft: localized.clone(),
                published: Some(localized),
            });
        }
        info!(
            entries = state.entries.len(),
            assets = state.assets.len(),
            "Loaded content fixture"
        );
        Self {
            state: RwLock::new(state),
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::from_fixture(SpaceFixture::from_file(path)?))
    }

    /// Insert (or replace) a published entry given delivery-shaped fields
    pub async fn insert_entry(&self, content_type: &str, id: &str, fields: Value) {
        let localized = localize(&fields.as_object().cloned().unwrap_or_default());
        let mut state = self.state.write().await;
        state.entries.retain(|e| e.id != id);
        state.entries.push(StoredEntry {
            id: id.to_string(),
            content_type: content_type.to_string(),
            version: 1,
            draft: localized.clone(),
            published: Some(localized),
        });
    }

    pub async fn insert_asset(&self, id: &str, url: &str, title: Option<&str>) {
        let mut state = self.state.write().await;
        state.assets.retain(|a| a.sys.id != id);
        state.assets.push(RawAsset {
            sys: EntrySys {
                id: id.to_string(),
                kind: "Asset".to_string(),
                content_type: None,
                version: None,
            },
            fields: AssetFields {
                title: title.map(str::to_string),
                file: Some(AssetFile {
                    url: url.to_string(),
                    content_type: None,
                }),
            },
        });
    }

    /// Make every later update/publish fail with `Upstream`
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `update_entry` calls
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    /// Ids linked from a published field of an entry
    pub async fn published_links(&self, id: &str, field: &str) -> Vec<String> {
        let state = self.state.read().await;
        state
            .entries
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.published.as_ref())
            .map(|fields| link_ids(localized_value(fields, field)))
            .unwrap_or_default()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(Error::Upstream("content store rejected the write".to_string()))
        } else {
            Ok(())
        }
    }
}

fn localized_value<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields.get(name).and_then(|v| v.get(DEFAULT_LOCALE))
}

fn localize(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| {
            let mut localized = Map::new();
            localized.insert(DEFAULT_LOCALE.to_string(), value.clone());
            (name.clone(), Value::Object(localized))
        })
        .collect()
}

fn delocalize(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|(name, localized)| {
            localized
                .get(DEFAULT_LOCALE)
                .map(|value| (name.clone(), value.clone()))
        })
        .collect()
}

fn scalar_eq(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Number(n) => n.to_string() == expected,
        Value::Bool(b) => b.to_string() == expected,
        Value::Array(items) => items.iter().any(|v| scalar_eq(v, expected)),
        _ => false,
    }
}

fn matches_filter(entry: &RawEntry, filter: &FieldFilter) -> bool {
    match filter {
        FieldFilter::Equals { field, value } => {
            entry.field(field).is_some_and(|v| scalar_eq(v, value))
        }
        FieldFilter::Matches { field, value } => {
            let needle = value.to_lowercase();
            entry
                .field(field)
                .and_then(Value::as_str)
                .is_some_and(|s| s.to_lowercase().contains(&needle))
        }
        FieldFilter::LinksTo { field, id } => link_ids(entry.field(field)).iter().any(|l| l == id),
    }
}

fn matches_query(entry: &RawEntry, query: &EntryQuery) -> bool {
    query
        .content_type
        .as_deref()
        .map_or(true, |ct| entry.content_type() == Some(ct))
        && query.id.as_deref().map_or(true, |id| entry.id() == id)
        && query.filters.iter().all(|f| matches_filter(entry, f))
}

#[async_trait]
impl ContentSource for MemorySpace {
    async fn entries(&self, query: &EntryQuery) -> Result<EntryCollection> {
        let state = self.state.read().await;
        let published: Vec<RawEntry> = state.entries.iter().filter_map(StoredEntry::delivered).collect();

        let matching: Vec<&RawEntry> = published.iter().filter(|e| matches_query(e, query)).collect();
        let total = matching.len() as u64;
        let limit = query.limit.unwrap_or(MAX_PAGE_LIMIT);
        let items: Vec<RawEntry> = matching
            .into_iter()
            .skip(query.skip as usize)
            .take(limit as usize)
            .cloned()
            .collect();

        let includes = if query.include > 0 && !items.is_empty() {
            Includes {
                entries: published
                    .iter()
                    .filter(|e| !items.iter().any(|i| i.id() == e.id()))
                    .cloned()
                    .collect(),
                assets: state.assets.clone(),
            }
        } else {
            Includes::default()
        };

        debug!(total, returned = items.len(), "Memory space query");
        Ok(EntryCollection {
            total,
            skip: u64::from(query.skip),
            limit: u64::from(limit),
            items,
            includes,
        })
    }
}

#[async_trait]
impl EntryStore for MemorySpace {
    async fn get_entry(&self, id: &str) -> Result<ManagedEntry> {
        let state = self.state.read().await;
        state
            .entries
            .iter()
            .find(|e| e.id == id)
            .map(StoredEntry::managed)
            .ok_or_else(|| Error::NotFound(format!("entry {}", id)))
    }

    async fn update_entry(&self, entry: &ManagedEntry) -> Result<ManagedEntry> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let stored = state.find_mut(entry.id())?;
        if stored.version != entry.version() {
            return Err(Error::Conflict(format!(
                "entry {} is at version {}, update sent {}",
                stored.id,
                stored.version,
                entry.version()
            )));
        }
        stored.draft = entry.fields.clone();
        stored.version += 1;
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(stored.managed())
    }

    async fn publish_entry(&self, entry: &ManagedEntry) -> Result<ManagedEntry> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let stored = state.find_mut(entry.id())?;
        if stored.version != entry.version() {
            return Err(Error::Conflict(format!(
                "entry {} is at version {}, publish sent {}",
                stored.id,
                stored.version,
                entry.version()
            )));
        }
        stored.published = Some(stored.draft.clone());
        stored.version += 1;
        Ok(stored.managed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::content_types;
    use serde_json::json;

    async fn space() -> MemorySpace {
        let space = MemorySpace::new();
        space
            .insert_entry("books", "b1", json!({"title": "Dune", "publicationYear": 1965}))
            .await;
        space
            .insert_entry("books", "b2", json!({"title": "Dune Messiah", "publicationYear": 1969}))
            .await;
        space
            .insert_entry("author", "a1", json!({"fullName": "Frank Herbert"}))
            .await;
        space
    }

    #[tokio::test]
    async fn test_query_filters_and_pages() {
        let space = space().await;

        let all = space
            .entries(&EntryQuery::of_type(content_types::BOOK))
            .await
            .unwrap();
        assert_eq!(all.total, 2);

        let matched = space
            .entries(&EntryQuery::of_type(content_types::BOOK).matching("title", "MESSIAH"))
            .await
            .unwrap();
        assert_eq!(matched.items.len(), 1);
        assert_eq!(matched.items[0].id(), "b2");

        let by_year = space
            .entries(&EntryQuery::of_type(content_types::BOOK).field_eq("publicationYear", "1965"))
            .await
            .unwrap();
        assert_eq!(by_year.items[0].id(), "b1");

        let second_page = space
            .entries(&EntryQuery::of_type(content_types::BOOK).limit(1).skip(1))
            .await
            .unwrap();
        assert_eq!(second_page.total, 2);
        assert_eq!(second_page.items.len(), 1);
        assert!(second_page.includes.entries.is_empty());
    }

    #[tokio::test]
    async fn test_drafts_are_invisible_until_published() {
        let space = space().await;

        let mut entry = space.get_entry("b1").await.unwrap();
        entry.set_field("title", json!("Dune (draft)"));
        let updated = space.update_entry(&entry).await.unwrap();
        assert_eq!(updated.version(), 2);

        let delivered = space.entries(&EntryQuery::by_id("b1")).await.unwrap();
        assert_eq!(delivered.items[0].field("title"), Some(&json!("Dune")));

        space.publish_entry(&updated).await.unwrap();
        let delivered = space.entries(&EntryQuery::by_id("b1")).await.unwrap();
        assert_eq!(delivered.items[0].field("title"), Some(&json!("Dune (draft)")));
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let space = space().await;
        let entry = space.get_entry("a1").await.unwrap();
        space.update_entry(&entry).await.unwrap();

        let err = space.update_entry(&entry).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_failing_writes() {
        let space = space().await;
        space.fail_writes(true);
        let entry = space.get_entry("a1").await.unwrap();
        assert!(matches!(
            space.update_entry(&entry).await,
            Err(Error::Upstream(_))
        ));
        assert_eq!(space.update_count(), 0);
    }

    #[test]
    fn test_fixture_parses_delivery_shape() {
        let fixture = SpaceFixture::from_json(
            r#"{
                "entries": [{
                    "sys": {"id": "g1", "contentType": {"sys": {"type": "Link", "linkType": "ContentType", "id": "genre"}}},
                    "fields": {"name": "Fantasy"}
                }],
                "assets": []
            }"#,
        )
        .unwrap();
        assert_eq!(fixture.entries[0].content_type(), Some("genre"));
    }

    #[test]
    fn test_fixture_must_be_an_object() {
        for text in ["[]", "[[], []]", "null", "\"entries\""] {
            assert!(
                matches!(SpaceFixture::from_json(text), Err(Error::Parse(_))),
                "{text} accepted"
            );
        }
        assert!(SpaceFixture::from_json("{}").unwrap().entries.is_empty());
    }
}
