use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgListener;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::RecordStore;
use crate::database::Database;
use crate::dto::athlete::AthletePatch;
use crate::error::{Result, StorageError};
use crate::feed::SnapshotFeed;
use crate::models::{AthleteRecord, RecordKind, StoredAthlete};

/// Notification channel raised by the `atletas` table trigger.
pub const CHANGE_CHANNEL: &str = "atletas_changed";

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    kind: String,
    data: Json<Value>,
    created_at: DateTime<Utc>,
}

impl DocumentRow {
    fn into_stored(self) -> Result<StoredAthlete> {
        let mut data = self.data.0;
        if let Some(fields) = data.as_object_mut() {
            fields.insert("kind".to_string(), Value::String(self.kind));
        }

        Ok(StoredAthlete {
            id: self.id,
            created_at: self.created_at,
            record: serde_json::from_value(data)?,
        })
    }
}

fn document_fields(record: &AthleteRecord) -> Result<Value> {
    let mut value = serde_json::to_value(record)?;
    if let Some(fields) = value.as_object_mut() {
        fields.remove("kind");
    }
    Ok(value)
}

async fn fetch_all(pool: &PgPool) -> Result<Vec<StoredAthlete>> {
    let rows = sqlx::query_as::<_, DocumentRow>(
        r#"
        SELECT id, kind, data, created_at
        FROM atletas
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(DocumentRow::into_stored).collect()
}

/// Record store backed by the `atletas` table. Changes made by any client
/// reach subscribers through `LISTEN atletas_changed`.
#[derive(Debug)]
pub struct PgRecordStore {
    db: Database,
    feed: Arc<SnapshotFeed>,
    listener: JoinHandle<()>,
}

impl PgRecordStore {
    /// Starts listening for changes and publishes the initial snapshot.
    pub async fn connect(db: Database) -> Result<Self> {
        let mut listener = PgListener::connect_with(db.pool()).await?;
        listener.listen(CHANGE_CHANNEL).await?;
        info!("Listening for changes on '{}'", CHANGE_CHANNEL);

        let feed = Arc::new(SnapshotFeed::new());
        feed.publish(fetch_all(db.pool()).await?);

        let listener = tokio::spawn(listen_for_changes(
            listener,
            db.pool().clone(),
            Arc::clone(&feed),
        ));

        Ok(Self { db, feed, listener })
    }
}

impl Drop for PgRecordStore {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

async fn listen_for_changes(mut listener: PgListener, pool: PgPool, feed: Arc<SnapshotFeed>) {
    loop {
        match listener.recv().await {
            Ok(notification) => {
                debug!("Received '{}' on {}", notification.payload(), CHANGE_CHANNEL);
            }
            Err(e) => {
                // The next recv() reconnects; refresh anyway so changes made
                // while disconnected are not lost.
                warn!("Change listener error: {}", e);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }

        match fetch_all(&pool).await {
            Ok(records) => feed.publish(records),
            Err(e) => warn!("Failed to refresh athlete snapshot: {}", e),
        }
    }
}

#[async_trait::async_trait]
impl RecordStore for PgRecordStore {
    async fn create(&self, record: &AthleteRecord) -> Result<Uuid> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO atletas (id, kind, data, created_at)
            VALUES ($1, $2, $3, now())
            "#,
        )
        .bind(id)
        .bind(record.kind().as_str())
        .bind(Json(document_fields(record)?))
        .execute(self.db.pool())
        .await?;

        debug!("Created {} document {}", record.kind(), id);
        Ok(id)
    }

    async fn update(&self, id: Uuid, patch: &AthletePatch) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE atletas
            SET data = data || $3
            WHERE id = $1 AND kind = $2
            "#,
        )
        .bind(id)
        .bind(patch.kind().as_str())
        .bind(Json(patch.fields_json()?))
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let found: Option<String> = sqlx::query_scalar("SELECT kind FROM atletas WHERE id = $1")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        match found {
            None => Err(StorageError::NotFound),
            Some(kind) => Err(StorageError::KindMismatch {
                id,
                expected: patch.kind(),
                found: kind
                    .parse::<RecordKind>()
                    .map_err(StorageError::UnknownKind)?,
            }),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM atletas WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<StoredAthlete> {
        sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, kind, data, created_at
            FROM atletas
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or(StorageError::NotFound)?
        .into_stored()
    }

    async fn fetch_once(&self) -> Result<Vec<StoredAthlete>> {
        fetch_all(self.db.pool()).await
    }

    fn feed(&self) -> &SnapshotFeed {
        &self.feed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Snapshot;
    use crate::models::SelfRegistration;
    use tokio::sync::mpsc;

    async fn connect() -> PgRecordStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let db = Database::new(&url).await.unwrap();
        db.run_migrations().await.unwrap();
        PgRecordStore::connect(db).await.unwrap()
    }

    #[test]
    fn test_document_fields_drop_kind_tag() {
        let record = AthleteRecord::SelfRegistration(SelfRegistration {
            name: "Ana".into(),
            ..Default::default()
        });

        let fields = document_fields(&record).unwrap();
        assert!(fields.get("kind").is_none());
        assert_eq!(fields["name"], "Ana");
    }

    #[test]
    fn test_row_decodes_with_kind_column() {
        let row = DocumentRow {
            id: Uuid::nil(),
            kind: "guardian_consent".into(),
            data: Json(serde_json::json!({ "guardian_name": "Carla" })),
            created_at: Utc::now(),
        };

        let stored = row.into_stored().unwrap();
        assert_eq!(stored.record.kind(), RecordKind::GuardianConsent);
        assert_eq!(stored.record.guardian_name(), Some("Carla"));
    }

    #[tokio::test]
    #[ignore] // Only run when a Postgres DATABASE_URL is available
    async fn test_round_trip_through_notifications() {
        let store = connect().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = store.subscribe(Box::new(move |snapshot: Snapshot| {
            let _ = tx.send(snapshot);
        }));
        rx.recv().await.unwrap();

        let record = AthleteRecord::SelfRegistration(SelfRegistration {
            name: "Notified".into(),
            ..Default::default()
        });
        let id = store.create(&record).await.unwrap();

        loop {
            let snapshot = rx.recv().await.unwrap();
            if let Some(found) = snapshot.iter().find(|d| d.id == id) {
                assert_eq!(found.record, record);
                break;
            }
        }

        store.delete(id).await.unwrap();
        store.delete(id).await.unwrap();
    }
}
