use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ExampleStore, StoredExample, TokenizedExample};

#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<Vec<StoredExample>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExampleStore for InMemoryStore {
    async fn insert(&self, example: TokenizedExample) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.entries.write().await.push(StoredExample { id, example });
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
        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok(entries.len() != before)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode, ContinuousAction};

    fn example(x: f64) -> TokenizedExample {
        let action = ContinuousAction {
            x,
            ..Default::default()
        };
        TokenizedExample::new(action, encode(&action).unwrap())
    }

    #[tokio::test]
    async fn test_insert_list_remove() -> Result<()> {
        let store = InMemoryStore::new();
        let first = store.insert(example(0.1)).await?;
        let second = store.insert(example(0.2)).await?;
        assert_eq!(store.count().await?, 2);

        let listed = store.list(10).await?;
        assert_eq!(listed[0].id, second);
        assert_eq!(listed[1].id, first);
        assert_eq!(store.list(1).await?.len(), 1);

        assert!(store.remove(first).await?);
        assert!(!store.remove(first).await?);
        assert!(store.get(first).await?.is_none());
        assert_eq!(store.get(second).await?.unwrap().example.action.x, 0.2);
        Ok(())
    }
}
