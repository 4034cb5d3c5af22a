//! Category control of a single book card: favourite heart and status dropdown
//!
//! The control writes straight through [`CategoryMutations`] and reports the
//! outcome with a toast. It does not touch any [`BookshelfViewModel`]; a
//! bookshelf already on screen shows the change after its next load.
//!
//! [`BookshelfViewModel`]: crate::BookshelfViewModel

use nr_common::Category;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::backend::CategoryMutations;
use crate::session::SessionContext;
use crate::toast::Toasts;

/// Choices offered by the dropdown, default first
pub const DROPDOWN_CATEGORIES: [Category; 3] = [
    Category::WantToRead,
    Category::CurrentlyReading,
    Category::Read,
];

/// Category sent to add a favourite; removal sends `""`
const FAVOURITE: &str = "favourites";

#[derive(Debug)]
struct ControlState {
    is_favorite: bool,
    selected: Category,
    dropdown_open: bool,
}

pub struct CategoryControl {
    book_id: String,
    session: Arc<SessionContext>,
    mutations: Arc<dyn CategoryMutations>,
    toasts: Arc<Toasts>,
    state: Mutex<ControlState>,
}

impl CategoryControl {
    pub fn new(
        book_id: impl Into<String>,
        session: Arc<SessionContext>,
        mutations: Arc<dyn CategoryMutations>,
        toasts: Arc<Toasts>,
    ) -> Self {
        Self {
            book_id: book_id.into(),
            session,
            mutations,
            toasts,
            state: Mutex::new(ControlState {
                is_favorite: false,
                selected: DROPDOWN_CATEGORIES[0],
                dropdown_open: false,
            }),
        }
    }

    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    /// Initial heart state. Any failure reads as "not favourite".
    pub async fn load_favorite_status(&self) -> bool {
        let is_favorite = match self.session.user_id().await {
            Some(user_id) => match self.mutations.is_favorite(&user_id, &self.book_id).await {
                Ok(value) => value,
                Err(e) => {
                    debug!(book = %self.book_id, "Favourite status unavailable: {}", e);
                    false
                }
            },
            None => false,
        };
        self.state.lock().await.is_favorite = is_favorite;
        is_favorite
    }

    /// Flip the heart; the flip is undone if the write fails. Returns the new state.
    pub async fn toggle_favorite(&self) -> bool {
        let Some(user_id) = self.session.user_id().await else {
            self.toasts.error("User not logged in").await;
            return self.is_favorite().await;
        };

        let now_favorite = {
            let mut state = self.state.lock().await;
            state.is_favorite = !state.is_favorite;
            state.is_favorite
        };
        let category = if now_favorite { FAVOURITE } else { "" };

        match self
            .mutations
            .update_category(&user_id, &self.book_id, category)
            .await
        {
            Ok(()) => {
                let message = if now_favorite {
                    "Book added to favorites!"
                } else {
                    "Book removed from favorites!"
                };
                self.toasts.success(message).await;
                now_favorite
            }
            Err(e) => {
                warn!(book = %self.book_id, "Favourite update failed: {}", e);
                self.state.lock().await.is_favorite = !now_favorite;
                self.toasts.error("Failed to update favorite category").await;
                !now_favorite
            }
        }
    }

    /// Pick a reading status from the dropdown
    pub async fn select_category(&self, category: Category) -> bool {
        {
            let mut state = self.state.lock().await;
            state.dropdown_open = false;
            if !DROPDOWN_CATEGORIES.contains(&category) {
                warn!(category = %category, "Not a dropdown category");
                return false;
            }
            state.selected = category;
        }

        let Some(user_id) = self.session.user_id().await else {
            self.toasts.error("User not logged in").await;
            return false;
        };

        match self
            .mutations
            .update_category(&user_id, &self.book_id, category.as_str())
            .await
        {
            Ok(()) => {
                self.toasts
                    .success(format!("Book added to \"{}\" category!", category.label()))
                    .await;
                true
            }
            Err(e) => {
                warn!(book = %self.book_id, category = %category, "Category update failed: {}", e);
                self.toasts.error("Failed to update category").await;
                false
            }
        }
    }

    pub async fn toggle_dropdown(&self) -> bool {
        let mut state = self.state.lock().await;
        state.dropdown_open = !state.dropdown_open;
        state.dropdown_open
    }

    pub async fn close_dropdown(&self) {
        self.state.lock().await.dropdown_open = false;
    }

    pub async fn is_dropdown_open(&self) -> bool {
        self.state.lock().await.dropdown_open
    }

    pub async fn is_favorite(&self) -> bool {
        self.state.lock().await.is_favorite
    }

    pub async fn selected_category(&self) -> Category {
        self.state.lock().await.selected
    }
}
