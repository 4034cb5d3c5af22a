//! Signed-in user
//!
//! [`SessionContext`] is handed to every component that acts for the user.
//! Lifecycle:
//! - `hydrate` at startup reads the persisted session, if any (no expiry)
//! - `login` stores the session produced by the authentication service
//! - `logout` clears both memory and storage

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::{Result, ShelfError};

/// Identity of the signed-in user, persisted as-is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub email: String,
    pub full_name: String,
}

/// Persistence of the session between runs
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<Session>>;
    async fn save(&self, session: &Session) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        Ok(self.session.lock().await.clone())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        *self.session.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.session.lock().await = None;
        Ok(())
    }
}

/// Session kept in a JSON file
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub const FILE_NAME: &'static str = "session.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_folder(data_folder: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_folder).map_err(|e| ShelfError::Session(e.to_string()))?;
        Ok(Self::new(data_folder.join(Self::FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
                ShelfError::Session(format!("{} is corrupt: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ShelfError::Session(e.to_string())),
        }
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let bytes =
            serde_json::to_vec_pretty(session).map_err(|e| ShelfError::Session(e.to_string()))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| ShelfError::Session(e.to_string()))
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ShelfError::Session(e.to_string())),
        }
    }
}

/// The signed-in user, shared by the components acting for them
pub struct SessionContext {
    store: Box<dyn SessionStore>,
    current: RwLock<Option<Session>>,
}

impl SessionContext {
    pub fn new(store: impl SessionStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            current: RwLock::new(None),
        }
    }

    /// Restore the persisted session. An unreadable one leaves the user signed out.
    pub async fn hydrate(&self) -> Option<Session> {
        let session = match self.store.load().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Ignoring stored session: {}", e);
                None
            }
        };
        if let Some(s) = &session {
            info!(user = %s.id, "Session restored");
        }
        *self.current.write().await = session.clone();
        session
    }

    pub async fn login(&self, session: Session) -> Result<()> {
        self.store.save(&session).await?;
        info!(user = %session.id, "Signed in");
        *self.current.write().await = Some(session);
        Ok(())
    }

    /// Memory is cleared even when storage cannot be
    pub async fn logout(&self) -> Result<()> {
        if let Some(s) = self.current.write().await.take() {
            info!(user = %s.id, "Signed out");
        }
        self.store.clear().await
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    pub async fn user_id(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|s| s.id.clone())
    }

    pub async fn require_user(&self) -> Result<String> {
        self.user_id().await.ok_or(ShelfError::NotLoggedIn)
    }
}
