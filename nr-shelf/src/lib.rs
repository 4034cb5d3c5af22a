//! # Next Reads Shelf Client
//!
//! Client-side state for the bookshelf pages:
//! - [`BookshelfViewModel`]: the four category lists of the signed-in user,
//!   updated optimistically and rolled back by reloading
//! - [`CategoryControl`]: favourite toggle and category dropdown of one card
//! - [`SessionContext`]: the signed-in user, persisted through a [`SessionStore`]
//! - [`Toasts`]: transient notifications
//! - [`SearchBox`]: debounced header search
//!
//! State is backed either by the HTTP service ([`ShelfClient`]) or directly by
//! the nr-common gateways; both implement the [`backend`] traits.

pub mod backend;
pub mod bookshelf;
pub mod client;
pub mod control;
pub mod error;
pub mod search;
pub mod session;
pub mod toast;

pub use backend::{CategoryMutations, SearchSource, ShelfSource};
pub use bookshelf::{ActionId, BookshelfViewModel, Phase};
pub use client::ShelfClient;
pub use control::{CategoryControl, DROPDOWN_CATEGORIES};
pub use error::{Result, ShelfError};
pub use search::SearchBox;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionContext, SessionStore};
pub use toast::{Toast, ToastKind, Toasts};
