//! In-memory media storage for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{MediaStorage, MediaUpload, StorageError, StoredMedia};

#[derive(Debug, Default)]
struct State {
    assets: HashMap<String, Vec<u8>>,
    deleted: Vec<String>,
    fail_deletes: bool,
}

/// Keeps uploads in a map and records every delete request.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMediaStorage {
    state: Arc<RwLock<State>>,
    base_url: String,
}

impl InMemoryMediaStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            state: Arc::default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Make every subsequent `delete` fail with an IO error.
    pub async fn fail_deletes(&self) {
        self.state.write().await.fail_deletes = true;
    }

    /// Public ids passed to `delete`, in call order.
    pub async fn deleted(&self) -> Vec<String> {
        self.state.read().await.deleted.clone()
    }

    pub async fn contains(&self, public_id: &str) -> bool {
        self.state.read().await.assets.contains_key(public_id)
    }
}

#[async_trait]
impl MediaStorage for InMemoryMediaStorage {
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, StorageError> {
        if upload.bytes.is_empty() {
            return Err(StorageError::Rejected("file is empty".to_string()));
        }
        let public_id = uuid::Uuid::new_v4().simple().to_string();
        self.state
            .write()
            .await
            .assets
            .insert(public_id.clone(), upload.bytes);

        Ok(StoredMedia {
            url: format!("{}/{}.png", self.base_url, public_id),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        state.deleted.push(public_id.to_string());
        if state.fail_deletes {
            return Err(StorageError::IoError("storage offline".to_string()));
        }
        state.assets.remove(public_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_delete() {
        let storage = InMemoryMediaStorage::new("http://cdn.test/");
        let stored = storage
            .upload(MediaUpload {
                file_name: None,
                content_type: None,
                bytes: vec![1, 2, 3],
            })
            .await
            .unwrap();

        assert!(stored.url.starts_with("http://cdn.test/"));
        assert!(storage.contains(&stored.public_id).await);

        storage.delete(&stored.public_id).await.unwrap();
        assert!(!storage.contains(&stored.public_id).await);
        assert_eq!(storage.deleted().await, vec![stored.public_id]);
    }

    #[tokio::test]
    async fn failing_deletes_are_still_recorded() {
        let storage = InMemoryMediaStorage::new("http://cdn.test");
        storage.fail_deletes().await;

        assert!(storage.delete("old").await.is_err());
        assert_eq!(storage.deleted().await, vec!["old".to_string()]);
    }
}
