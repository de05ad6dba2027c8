//! Athlete record storage: the document model, the `RecordStore` trait with
//! in-memory and Postgres backends, and the live snapshot feed.

pub mod database;
pub mod dto;
pub mod error;
pub mod feed;
pub mod models;
pub mod repository;

pub use database::Database;
pub use feed::{Snapshot, SnapshotCallback, SnapshotFeed, Subscription};
pub use repository::{MemoryRecordStore, PgRecordStore, RecordStore};
