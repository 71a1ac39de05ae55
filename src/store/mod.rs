pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlStore;
pub use memory::InMemoryStore;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec::{ContinuousAction, DiscreteBins, EncodedAction, TokenSequence};

/// Audit record of one tokenize call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizedExample {
    pub action: ContinuousAction,
    pub tokens: TokenSequence,
    pub bins: DiscreteBins,
    pub timestamp: DateTime<Utc>,
}

impl TokenizedExample {
    pub fn new(action: ContinuousAction, encoded: EncodedAction) -> Self {
        Self {
            action,
            tokens: encoded.tokens,
            bins: encoded.bins,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredExample {
    pub id: Uuid,
    #[serde(flatten)]
    pub example: TokenizedExample,
}

#[async_trait]
pub trait ExampleStore: Send + Sync {
    async fn insert(&self, example: TokenizedExample) -> Result<Uuid>;
    async fn get(&self, id: Uuid) -> Result<Option<StoredExample>>;
    /// Newest first.
    async fn list(&self, limit: usize) -> Result<Vec<StoredExample>>;
    /// Returns whether anything was removed.
    async fn remove(&self, id: Uuid) -> Result<bool>;
    async fn count(&self) -> Result<usize>;
}
