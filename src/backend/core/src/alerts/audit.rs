//! Durable audit log storage.

use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::instrument;

use crate::error::{ErrorCode, QuorumError, Result};

/// Attempts at finding a free key before giving up.
const MAX_KEY_ATTEMPTS: i64 = 1_000;

/// Object storage for audit and error records.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Store `body` under a key derived from `level` and `ext`.
    /// Returns the key written.
    async fn write(&self, level: &str, body: String, ext: &str) -> Result<String>;
}

/// Audit storage on the local filesystem.
///
/// Records land at `<root>/logs/<level>-<epoch-millis>.<ext>`. Files are
/// created exclusively; when a key is taken the millis are bumped until a
/// free one is found, so records are never overwritten.
#[derive(Debug, Clone)]
pub struct FsAuditStore {
    root: PathBuf,
}

impl FsAuditStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Object key for a record written at `millis`.
    pub fn key_for(level: &str, millis: i64, ext: &str) -> String {
        format!("logs/{}-{}.{}", level, millis, ext)
    }
}

#[async_trait]
impl AuditSink for FsAuditStore {
    #[instrument(skip(self, body), fields(root = %self.root.display()))]
    async fn write(&self, level: &str, body: String, ext: &str) -> Result<String> {
        let dir = self.root.join("logs");
        tokio::fs::create_dir_all(&dir).await?;

        let start = Utc::now().timestamp_millis();
        for offset in 0..MAX_KEY_ATTEMPTS {
            let key = Self::key_for(level, start + offset, ext);
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.root.join(&key))
                .await;

            let mut file = match opened {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };
            file.write_all(body.as_bytes()).await?;
            file.flush().await?;

            tracing::debug!(key = %key, "Audit record written");
            return Ok(key);
        }

        Err(QuorumError::with_internal(
            ErrorCode::AuditLogError,
            "Audit log storage failed",
            format!("no free key for level {} near millis {}", level, start),
        ))
    }
}
