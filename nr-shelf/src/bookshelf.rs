//! Bookshelf view model
//!
//! Holds the four category lists of one user and keeps them in step with
//! user actions while the writes are in flight.
//!
//! An action changes the in-memory lists first, then calls the backend:
//! - success: the optimistic state is final, nothing is re-fetched
//! - failure: the lists are reloaded from the store, discarding the change
//!
//! Each in-flight action is tracked by its [`ActionId`], so actions on
//! different books report progress independently.

use nr_common::models::{Book, Shelves};
use nr_common::pagination::{paginate, Page, SHELF_PAGE_SIZE};
use nr_common::Category;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::backend::{CategoryMutations, ShelfSource};
use crate::{Result, ShelfError};

/// Load state of the lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Loaded,
    LoadFailed,
}

/// One in-flight action. A removal has no `new` category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionId {
    pub book_id: String,
    pub old: Option<Category>,
    pub new: Option<Category>,
}

#[derive(Debug, Default)]
struct ShelfState {
    user_id: Option<String>,
    shelves: Shelves,
    phase: Phase,
    pending: HashSet<ActionId>,
    /// Incremented per fetch; a slower, older fetch must not overwrite a newer one
    load_seq: u64,
}

impl ShelfState {
    fn apply_move(&mut self, book_id: &str, old: Option<Category>, new: Category) {
        let book = self.shelves.find(book_id).cloned();
        if let Some(old) = old {
            self.shelves.get_mut(old).retain(|b| b.id != book_id);
        }
        match book {
            Some(book) if !self.shelves.contains(new, book_id) => {
                self.shelves.get_mut(new).push(book)
            }
            Some(_) => {}
            None => debug!(book = %book_id, "Book not on any shelf, nothing to append"),
        }
    }
}

/// The signed-in user's bookshelf
pub struct BookshelfViewModel {
    source: Arc<dyn ShelfSource>,
    mutations: Arc<dyn CategoryMutations>,
    state: RwLock<ShelfState>,
}

impl BookshelfViewModel {
    pub fn new(source: Arc<dyn ShelfSource>, mutations: Arc<dyn CategoryMutations>) -> Self {
        Self {
            source,
            mutations,
            state: RwLock::new(ShelfState::default()),
        }
    }

    /// Fetch all four lists for `user_id`, forgetting any tracked actions
    pub async fn load(&self, user_id: &str) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.user_id = Some(user_id.to_string());
            state.pending.clear();
        }
        self.fetch(user_id).await
    }

    async fn fetch(&self, user_id: &str) -> Result<()> {
        let seq = {
            let mut state = self.state.write().await;
            state.phase = Phase::Loading;
            state.load_seq += 1;
            state.load_seq
        };

        let result = self.source.shelves(user_id).await;

        let mut state = self.state.write().await;
        if state.load_seq != seq {
            debug!(user = %user_id, "Discarding superseded shelf load");
            return result.map(|_| ());
        }
        match result {
            Ok(shelves) => {
                info!(
                    user = %user_id,
                    want_to_read = shelves.want_to_read.len(),
                    currently_reading = shelves.currently_reading.len(),
                    read = shelves.read.len(),
                    favourites = shelves.favourites.len(),
                    "Shelves loaded"
                );
                state.shelves = shelves;
                state.phase = Phase::Loaded;
                Ok(())
            }
            Err(e) => {
                warn!(user = %user_id, "Failed to load shelves: {}", e);
                state.shelves = Shelves::default();
                state.phase = Phase::LoadFailed;
                Err(e)
            }
        }
    }

    /// Move a book between categories (`old == None`: it had none)
    pub async fn request_category_change(
        &self,
        book_id: &str,
        old: Option<Category>,
        new: Category,
    ) -> Result<()> {
        let action = ActionId {
            book_id: book_id.to_string(),
            old,
            new: Some(new),
        };
        let user_id = {
            let mut state = self.state.write().await;
            let user_id = state.user_id.clone().ok_or(ShelfError::NotLoggedIn)?;
            state.apply_move(book_id, old, new);
            state.pending.insert(action.clone());
            user_id
        };

        let outcome = self
            .mutations
            .move_category(&user_id, book_id, old, new)
            .await;
        self.settle(&user_id, &action, outcome).await
    }

    /// Take a book off one category
    pub async fn request_removal(&self, book_id: &str, category: Category) -> Result<()> {
        let action = ActionId {
            book_id: book_id.to_string(),
            old: Some(category),
            new: None,
        };
        let user_id = {
            let mut state = self.state.write().await;
            let user_id = state.user_id.clone().ok_or(ShelfError::NotLoggedIn)?;
            state.shelves.get_mut(category).retain(|b| b.id != book_id);
            state.pending.insert(action.clone());
            user_id
        };

        let outcome = self
            .mutations
            .remove_from_category(&user_id, book_id, category)
            .await;
        self.settle(&user_id, &action, outcome).await
    }

    async fn settle(&self, user_id: &str, action: &ActionId, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => {
                self.state.write().await.pending.remove(action);
                debug!(book = %action.book_id, "Shelf action committed");
                Ok(())
            }
            Err(e) => {
                warn!(book = %action.book_id, "Shelf action failed, reloading: {}", e);
                if let Err(reload) = self.fetch(user_id).await {
                    warn!("Reload after failed action also failed: {}", reload);
                }
                self.state.write().await.pending.remove(action);
                Err(e)
            }
        }
    }

    pub async fn snapshot(&self) -> Shelves {
        self.state.read().await.shelves.clone()
    }

    pub async fn phase(&self) -> Phase {
        self.state.read().await.phase
    }

    /// True while any action on `book_id` is in flight
    pub async fn is_pending(&self, book_id: &str) -> bool {
        self.state
            .read()
            .await
            .pending
            .iter()
            .any(|a| a.book_id == book_id)
    }

    pub async fn pending_actions(&self) -> Vec<ActionId> {
        self.state.read().await.pending.iter().cloned().collect()
    }

    /// One page of a category list
    pub async fn shelf_page(&self, category: Category, page: usize) -> Page<Book> {
        let state = self.state.read().await;
        paginate(state.shelves.get(category), page, SHELF_PAGE_SIZE)
    }
}
