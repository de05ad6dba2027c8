pub mod memory;
pub mod postgres;

use uuid::Uuid;

use crate::dto::athlete::AthletePatch;
use crate::error::Result;
use crate::feed::{Snapshot, SnapshotCallback, SnapshotFeed, Subscription};
use crate::models::{AthleteRecord, StoredAthlete};

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

/// A document store holding athlete records, with a live feed of the full
/// list ordered newest first.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts a new document; the store assigns its id and timestamp.
    async fn create(&self, record: &AthleteRecord) -> Result<Uuid>;

    /// Merges `patch` into an existing document.
    async fn update(&self, id: Uuid, patch: &AthletePatch) -> Result<()>;

    /// Removes a document. Deleting an absent id succeeds.
    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn find(&self, id: Uuid) -> Result<StoredAthlete>;

    /// One-shot read of the ordered list.
    async fn fetch_once(&self) -> Result<Vec<StoredAthlete>>;

    fn feed(&self) -> &SnapshotFeed;

    /// Registers `callback` for the current list and every later change.
    fn subscribe(&self, callback: SnapshotCallback) -> Subscription {
        self.feed().subscribe(callback)
    }

    fn current(&self) -> Snapshot {
        self.feed().current()
    }
}

/// Newest first; ties keep the most recently inserted first.
pub(crate) fn sort_newest_first(records: &mut [StoredAthlete]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
