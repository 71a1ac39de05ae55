// src/store/jsonl.rs - Append-only JSON lines log of tokenized examples

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ExampleStore, StoredExample, TokenizedExample};
use crate::io::console::{Console, ConsoleEvent};

/// Keeps every record in memory and mirrors it to `path`, one JSON object per line.
pub struct JsonlStore {
    path: PathBuf,
    entries: RwLock<Vec<StoredExample>>,
}

impl JsonlStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let mut entries = Vec::new();
        if fs::try_exists(&path).await? {
            let content = fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let lines: Vec<&str> = content.lines().collect();
            let mut torn_tail = false;
            for (n, line) in lines.iter().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<StoredExample>(line) {
                    Ok(entry) => entries.push(entry),
                    // An interrupted append leaves a last line without its newline.
                    Err(_) if n + 1 == lines.len() && !content.ends_with('\n') => {
                        torn_tail = true;
                    }
                    Err(e) => {
                        return Err(e).with_context(|| {
                            format!("{}:{}: malformed record", path.display(), n + 1)
                        });
                    }
                }
            }
            if torn_tail {
                Console::emit(ConsoleEvent::Warn(format!(
                    "Dropped incomplete last record in {}",
                    path.display()
                )));
                write_entries(&path, &entries).await?;
            }
        }

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Replaces `path` with `entries` through a temporary file.
async fn write_entries(path: &Path, entries: &[StoredExample]) -> Result<()> {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&serde_json::to_string(entry)?);
        out.push('\n');
    }
    let tmp = path.with_extension("jsonl.tmp");
    fs::write(&tmp, out)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[async_trait]
impl ExampleStore for JsonlStore {
    async fn insert(&self, example: TokenizedExample) -> Result<Uuid> {
        let entry = StoredExample {
            id: Uuid::new_v4(),
            example,
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let mut entries = self.entries.write().await;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        let previous_len = file.metadata().await?.len();
        let written = async {
            file.write_all(line.as_bytes()).await?;
            file.flush().await
        }
        .await;
        if let Err(e) = written {
            // Cut a partial line back off so the log stays loadable.
            let _ = file.set_len(previous_len).await;
            return Err(e).with_context(|| format!("Failed to append to {}", self.path.display()));
        }

        let id = entry.id;
        entries.push(entry);
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredExample>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.id == id).cloned())
    }

    async fn list(&self, limit: usize) -> Result<Vec<StoredExample>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }

    async fn remove(&self, id: Uuid) -> Result<bool> {
        let mut entries = self.entries.write().await;
        let kept: Vec<StoredExample> = entries.iter().filter(|e| e.id != id).cloned().collect();
        if kept.len() == entries.len() {
            return Ok(false);
        }
        // Memory only changes once the file does.
        write_entries(&self.path, &kept).await?;
        *entries = kept;
        Ok(true)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}
