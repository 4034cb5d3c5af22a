//! Category Mutation Gateway
//!
//! Writes go through the management API of the content store: fetch the user
//! entry, edit its category link arrays, update, then publish.
//!
//! # Architecture
//!
//! - [`EntryStore`]: the seam to the management API (`get` / `update` / `publish`).
//! - [`ManagementClient`]: `EntryStore` over HTTP.
//! - [`CategoryGateway`]: Assign / Move / Remove / Query on top of any `EntryStore`.
//! - [`IntentLog`]: record of mutations in flight, replayed after a crash.

pub mod categories;
pub mod client;
pub mod intent;

pub use categories::CategoryGateway;
pub use client::ManagementClient;
pub use intent::{FieldOp, FileIntentLog, Intent, IntentLog, MemoryIntentLog};

use crate::content::{link_ids, EntrySys, Link};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Locale every managed field is written under
pub const DEFAULT_LOCALE: &str = "en-US";

/// Entry as seen by the management API: fields are keyed by locale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedEntry {
    pub sys: EntrySys,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl ManagedEntry {
    pub fn id(&self) -> &str {
        &self.sys.id
    }

    pub fn version(&self) -> u64 {
        self.sys.version.unwrap_or(0)
    }

    /// Localized value of a field
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .get(name)
            .and_then(|localized| localized.get(DEFAULT_LOCALE))
            .filter(|v| !v.is_null())
    }

    pub fn set_field(&mut self, name: &str, value: Value) {
        let mut localized = Map::new();
        localized.insert(DEFAULT_LOCALE.to_string(), value);
        self.fields.insert(name.to_string(), Value::Object(localized));
    }

    /// Ids linked from a field; a single link counts as a one-element array
    pub fn link_ids(&self, name: &str) -> Vec<String> {
        link_ids(self.field(name))
    }

    /// Replace a field with an array of entry links
    pub fn set_links(&mut self, name: &str, ids: &[String]) {
        let links = ids.iter().map(|id| Link::entry(id.clone()).to_value()).collect();
        self.set_field(name, Value::Array(links));
    }
}

/// Management side of the external content store
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Fetch the latest draft of an entry
    async fn get_entry(&self, id: &str) -> Result<ManagedEntry>;

    /// Save the entry's fields; the store rejects a stale `sys.version`
    async fn update_entry(&self, entry: &ManagedEntry) -> Result<ManagedEntry>;

    /// Publish the saved draft so readers see it
    async fn publish_entry(&self, entry: &ManagedEntry) -> Result<ManagedEntry>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(fields: Value) -> ManagedEntry {
        ManagedEntry {
            sys: EntrySys::entry("u1", "user"),
            fields: fields.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn test_link_ids_reads_localized_arrays() {
        let e = entry(json!({
            "favourites": {"en-US": [
                {"sys": {"type": "Link", "linkType": "Entry", "id": "b1"}}
            ]},
            "currentlyReading": {"en-US": {"sys": {"type": "Link", "linkType": "Entry", "id": "b2"}}},
            "wantToRead": {"hr": []}
        }));

        assert_eq!(e.link_ids("favourites"), vec!["b1"]);
        assert_eq!(e.link_ids("currentlyReading"), vec!["b2"]);
        assert!(e.link_ids("wantToRead").is_empty());
        assert!(e.link_ids("readBooks").is_empty());
    }

    #[test]
    fn test_set_links_writes_link_array() {
        let mut e = entry(json!({}));
        e.set_links("readBooks", &["b1".to_string(), "b2".to_string()]);

        assert_eq!(e.fields["readBooks"]["en-US"][1]["sys"]["id"], "b2");
        assert_eq!(e.fields["readBooks"]["en-US"][0]["sys"]["linkType"], "Entry");
        assert_eq!(e.link_ids("readBooks"), vec!["b1", "b2"]);
    }
}
