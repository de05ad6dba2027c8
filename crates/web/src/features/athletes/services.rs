use axum::response::sse::Event;
use futures::stream::{self, Stream};
use registration::{normalize, normalize_patch};
use storage::{
    RecordStore, Snapshot,
    dto::athlete::AthletePatch,
    models::{AthleteRecord, StoredAthlete},
};
use tokio::sync::watch;
use uuid::Uuid;
use validator::Validate;

use crate::error::WebResult;
use crate::state::AppState;

/// Name of the server-sent event carrying a full list.
pub const SNAPSHOT_EVENT: &str = "snapshot";

/// List all athletes, newest first
pub async fn list_athletes(store: &dyn RecordStore) -> WebResult<Vec<StoredAthlete>> {
    Ok(store.fetch_once().await?)
}

pub async fn get_athlete(store: &dyn RecordStore, id: Uuid) -> WebResult<StoredAthlete> {
    Ok(store.find(id).await?)
}

/// Create a new athlete, applying the form's input rules first
pub async fn create_athlete(state: &AppState, record: AthleteRecord) -> WebResult<Uuid> {
    let record = normalize(record, state.clock.today());
    record.validate()?;

    Ok(state.store.create(&record).await?)
}

/// Merge a patch into an athlete. The merged document must still be valid.
pub async fn update_athlete(
    state: &AppState,
    id: Uuid,
    patch: AthletePatch,
) -> WebResult<StoredAthlete> {
    let patch = normalize_patch(patch, state.clock.today());
    patch.validate()?;

    let mut merged = state.store.find(id).await?;
    patch.apply(id, &mut merged.record)?;
    merged.record.validate()?;

    state.store.update(id, &patch).await?;
    Ok(merged)
}

/// Delete an athlete; absent ids succeed
pub async fn delete_athlete(store: &dyn RecordStore, id: Uuid) -> WebResult<()> {
    Ok(store.delete(id).await?)
}

/// The current list followed by every later one, as server-sent events.
pub fn snapshot_events(
    receiver: watch::Receiver<Snapshot>,
) -> impl Stream<Item = Result<Event, axum::Error>> {
    stream::unfold((receiver, true), |(mut receiver, first)| async move {
        if !first && receiver.changed().await.is_err() {
            return None;
        }

        let snapshot = receiver.borrow_and_update().clone();
        let event = Event::default()
            .event(SNAPSHOT_EVENT)
            .json_data(snapshot.as_slice());
        Some((event, (receiver, false)))
    })
}
