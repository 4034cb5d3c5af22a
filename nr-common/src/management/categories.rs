//! Assign / Move / Remove / Query on a user's category fields
//!
//! Every mutation is one read-modify-write of the user entry: fetch the
//! latest draft, edit the link arrays, update (guarded by the entry version),
//! publish. A move edits both arrays in that single write. Writes for the
//! same user are serialized so concurrent edits never race on the version.

use super::intent::{FieldOp, Intent, IntentLog};
use super::{EntryStore, ManagedEntry};
use crate::{Category, Error, Result};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Category Mutation Gateway
#[derive(Clone)]
pub struct CategoryGateway {
    store: Arc<dyn EntryStore>,
    intents: Arc<dyn IntentLog>,
    user_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl CategoryGateway {
    pub fn new(store: Arc<dyn EntryStore>, intents: Arc<dyn IntentLog>) -> Self {
        Self {
            store,
            intents,
            user_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add the book to `category`; no duplicate if already present
    pub async fn assign(&self, user_id: &str, book_id: &str, category: &str) -> Result<()> {
        let category = parse_category(category)?;
        self.mutate(user_id, book_id, vec![FieldOp::Add(category)])
            .await
    }

    /// Take the book out of `old` (if given) and add it to `new` in one write.
    ///
    /// `old` of `None` or `""` means the book had no prior category.
    pub async fn move_book(
        &self,
        user_id: &str,
        book_id: &str,
        old: Option<&str>,
        new: &str,
    ) -> Result<()> {
        let new = parse_category(new)?;
        let old = match old {
            Some(value) => Category::parse_optional(value).map_err(Error::category_update_failed)?,
            None => None,
        };

        let mut ops = Vec::with_capacity(2);
        if let Some(old) = old {
            ops.push(FieldOp::Remove(old));
        }
        ops.push(FieldOp::Add(new));
        self.mutate(user_id, book_id, ops).await
    }

    /// Filter the book out of `category`; absent book is a no-op
    pub async fn remove(&self, user_id: &str, book_id: &str, category: &str) -> Result<()> {
        let category = parse_category(category)?;
        self.mutate(user_id, book_id, vec![FieldOp::Remove(category)])
            .await
    }

    /// Assign, except that an empty category removes the book from favourites
    pub async fn update_category(&self, user_id: &str, book_id: &str, category: &str) -> Result<()> {
        if category.trim().is_empty() {
            self.mutate(user_id, book_id, vec![FieldOp::Remove(Category::Favourites)])
                .await
        } else {
            self.assign(user_id, book_id, category).await
        }
    }

    /// Categories currently holding the book
    pub async fn query(&self, user_id: &str, book_id: &str) -> Result<BTreeSet<Category>> {
        let entry = self.store.get_entry(user_id).await?;
        Ok(Category::ALL
            .into_iter()
            .filter(|c| entry.link_ids(c.field_name()).iter().any(|id| id == book_id))
            .collect())
    }

    pub async fn is_favourite(&self, user_id: &str, book_id: &str) -> Result<bool> {
        Ok(self
            .query(user_id, book_id)
            .await?
            .contains(&Category::Favourites))
    }

    /// Replay intents left behind by an interrupted process.
    ///
    /// Returns the number of intents applied. An intent whose user entry no
    /// longer exists is discarded; any other failure leaves it for the next run.
    pub async fn recover(&self) -> Result<usize> {
        let pending = self.intents.pending().await?;
        if pending.is_empty() {
            return Ok(0);
        }

        info!(count = pending.len(), "Replaying pending category intents");
        let mut replayed = 0;
        for intent in pending {
            match self.apply(&intent.user_id, &intent.book_id, &intent.ops).await {
                Ok(()) => {
                    self.intents.clear(intent.id).await?;
                    replayed += 1;
                }
                Err(e) if e.is_not_found() => {
                    warn!(intent = %intent.id, "Discarding intent for missing entry: {}", e);
                    self.intents.clear(intent.id).await?;
                }
                Err(e) => {
                    warn!(intent = %intent.id, "Intent replay failed, kept for next start: {}", e);
                }
            }
        }
        Ok(replayed)
    }

    async fn mutate(&self, user_id: &str, book_id: &str, ops: Vec<FieldOp>) -> Result<()> {
        let intent = Intent::new(user_id, book_id, ops);
        self.intents
            .record(&intent)
            .await
            .map_err(Error::category_update_failed)?;

        let outcome = self.apply(user_id, book_id, &intent.ops).await;

        if let Err(e) = self.intents.clear(intent.id).await {
            warn!(intent = %intent.id, "Failed to clear intent: {}", e);
        }

        match outcome {
            Ok(()) => {
                info!(user = %user_id, book = %book_id, ops = ?intent.ops, "Categories updated");
                Ok(())
            }
            Err(e) => {
                warn!(user = %user_id, book = %book_id, ops = ?intent.ops, "Category update failed: {}", e);
                Err(Error::category_update_failed(e))
            }
        }
    }

    async fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        Arc::clone(locks.entry(user_id.to_string()).or_default())
    }

    async fn apply(&self, user_id: &str, book_id: &str, ops: &[FieldOp]) -> Result<()> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let mut entry = self.store.get_entry(user_id).await?;
        apply_ops(&mut entry, book_id, ops);
        let updated = self.store.update_entry(&entry).await?;
        self.store.publish_entry(&updated).await?;
        Ok(())
    }
}

fn parse_category(value: &str) -> Result<Category> {
    value.trim().parse().map_err(Error::category_update_failed)
}

/// Edit the link arrays of a user entry in place
pub fn apply_ops(entry: &mut ManagedEntry, book_id: &str, ops: &[FieldOp]) {
    for op in ops {
        match *op {
            FieldOp::Add(category) => {
                let mut ids = entry.link_ids(category.field_name());
                if !ids.iter().any(|id| id == book_id) {
                    ids.push(book_id.to_string());
                }
                entry.set_links(category.field_name(), &ids);
            }
            FieldOp::Remove(category) => {
                let mut ids = entry.link_ids(category.field_name());
                ids.retain(|id| id != book_id);
                entry.set_links(category.field_name(), &ids);
            }
        }
    }
}
