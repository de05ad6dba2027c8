use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{RecordStore, sort_newest_first};
use crate::dto::athlete::AthletePatch;
use crate::error::{Result, StorageError};
use crate::feed::SnapshotFeed;
use crate::models::{AthleteRecord, StoredAthlete};

/// Record store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    // Newest first.
    documents: RwLock<Vec<StoredAthlete>>,
    feed: SnapshotFeed,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn publish(&self, documents: &[StoredAthlete]) {
        self.feed.publish(documents.to_vec());
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(&self, record: &AthleteRecord) -> Result<Uuid> {
        let stored = StoredAthlete {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            record: record.clone(),
        };
        let id = stored.id;

        let mut documents = self.documents.write().await;
        documents.insert(0, stored);
        sort_newest_first(&mut documents);
        debug!("Created {} document {}", record.kind(), id);
        self.publish(&documents);

        Ok(id)
    }

    async fn update(&self, id: Uuid, patch: &AthletePatch) -> Result<()> {
        let mut documents = self.documents.write().await;
        let document = documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(StorageError::NotFound)?;

        patch.apply(id, &mut document.record)?;
        debug!("Updated document {}", id);
        self.publish(&documents);

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|d| d.id != id);

        if documents.len() != before {
            debug!("Deleted document {}", id);
            self.publish(&documents);
        }

        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<StoredAthlete> {
        self.documents
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn fetch_once(&self) -> Result<Vec<StoredAthlete>> {
        Ok(self.documents.read().await.clone())
    }

    fn feed(&self) -> &SnapshotFeed {
        &self.feed
    }
}
