//! Intent log for category mutations
//!
//! An intent is written before a mutation touches the store and cleared once
//! the mutation is published or has reported its failure to the caller. An
//! intent still present at startup means the process died mid-mutation; its
//! operations are idempotent and are replayed by
//! [`CategoryGateway::recover`](super::CategoryGateway::recover).

use crate::{Category, Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Edit to one category field of a user entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "category", rename_all = "camelCase")]
pub enum FieldOp {
    /// Append the book link unless already present
    Add(Category),
    /// Filter the book link out
    Remove(Category),
}

/// A category mutation that has been started
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub id: Uuid,
    pub user_id: String,
    pub book_id: String,
    pub ops: Vec<FieldOp>,
    pub recorded_at: DateTime<Utc>,
}

impl Intent {
    pub fn new(user_id: &str, book_id: &str, ops: Vec<FieldOp>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            book_id: book_id.to_string(),
            ops,
            recorded_at: Utc::now(),
        }
    }
}

/// Storage for in-flight intents
#[async_trait]
pub trait IntentLog: Send + Sync {
    async fn record(&self, intent: &Intent) -> Result<()>;
    async fn clear(&self, id: Uuid) -> Result<()>;
    async fn pending(&self) -> Result<Vec<Intent>>;
}

/// Process-local intent log (lost on restart)
#[derive(Default)]
pub struct MemoryIntentLog {
    intents: Mutex<Vec<Intent>>,
}

impl MemoryIntentLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IntentLog for MemoryIntentLog {
    async fn record(&self, intent: &Intent) -> Result<()> {
        self.intents.lock().await.push(intent.clone());
        Ok(())
    }

    async fn clear(&self, id: Uuid) -> Result<()> {
        self.intents.lock().await.retain(|i| i.id != id);
        Ok(())
    }

    async fn pending(&self) -> Result<Vec<Intent>> {
        Ok(self.intents.lock().await.clone())
    }
}

/// Intent log persisted as a JSON array in the data folder
pub struct FileIntentLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileIntentLog {
    /// File name inside the data folder
    pub const FILE_NAME: &'static str = "pending-intents.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Log stored in `data_folder`, creating the folder if missing
    pub fn in_folder(data_folder: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_folder)?;
        Ok(Self::new(data_folder.join(Self::FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Vec<Intent>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Vec::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                Error::Parse(format!("Intent log {} is corrupt: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the file atomically (write temp file, then rename)
    async fn write(&self, intents: &[Intent]) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(intents)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl IntentLog for FileIntentLog {
    async fn record(&self, intent: &Intent) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut intents = self.read().await?;
        intents.push(intent.clone());
        self.write(&intents).await?;
        debug!(intent = %intent.id, "Intent recorded");
        Ok(())
    }

    async fn clear(&self, id: Uuid) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut intents = self.read().await?;
        intents.retain(|i| i.id != id);
        self.write(&intents).await
    }

    async fn pending(&self) -> Result<Vec<Intent>> {
        let _guard = self.lock.lock().await;
        self.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_log_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let intent = Intent::new(
            "u1",
            "b1",
            vec![
                FieldOp::Remove(Category::WantToRead),
                FieldOp::Add(Category::CurrentlyReading),
            ],
        );

        {
            let log = FileIntentLog::in_folder(dir.path()).unwrap();
            log.record(&intent).await.unwrap();
        }

        let reopened = FileIntentLog::in_folder(dir.path()).unwrap();
        let pending = reopened.pending().await.unwrap();
        assert_eq!(pending, vec![intent.clone()]);

        reopened.clear(intent.id).await.unwrap();
        assert!(reopened.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_log_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileIntentLog::new(dir.path().join("none.json"));
        assert!(log.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_log_corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FileIntentLog::FILE_NAME);
        std::fs::write(&path, "{not json").unwrap();

        let log = FileIntentLog::new(path);
        assert!(matches!(log.pending().await, Err(Error::Parse(_))));
    }

    #[test]
    fn test_field_op_serialization() {
        let json = serde_json::to_value(FieldOp::Add(Category::Read)).unwrap();
        assert_eq!(json["op"], "add");
        assert_eq!(json["category"], "read");
    }
}
