//! Live snapshot delivery shared by every record store.
//!
//! A store publishes the full ordered list after each change; subscribers get
//! the current list on registration and every list published afterwards.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::StoredAthlete;

/// The full ordered list of records at one point in time.
pub type Snapshot = Arc<Vec<StoredAthlete>>;

/// Callback invoked with every snapshot.
pub type SnapshotCallback = Box<dyn FnMut(Snapshot) + Send + 'static>;

#[derive(Debug)]
pub struct SnapshotFeed {
    sender: watch::Sender<Snapshot>,
}

impl SnapshotFeed {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Arc::new(Vec::new()));
        Self { sender }
    }

    /// Replaces the current snapshot and wakes every subscriber.
    pub fn publish(&self, records: Vec<StoredAthlete>) {
        debug!(
            "Publishing snapshot with {} record(s) to {} subscriber(s)",
            records.len(),
            self.subscriber_count()
        );
        self.sender.send_replace(Arc::new(records));
    }

    pub fn current(&self) -> Snapshot {
        self.sender.borrow().clone()
    }

    /// A raw receiver, for consumers that drive their own loop.
    pub fn receiver(&self) -> watch::Receiver<Snapshot> {
        self.sender.subscribe()
    }

    /// Registers `callback` on a background task. Must be called from within
    /// a tokio runtime.
    pub fn subscribe(&self, mut callback: SnapshotCallback) -> Subscription {
        let mut receiver = self.sender.subscribe();
        let task = tokio::spawn(async move {
            loop {
                let snapshot = receiver.borrow_and_update().clone();
                callback(snapshot);
                if receiver.changed().await.is_err() {
                    break;
                }
            }
        });
        Subscription { task: Some(task) }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SnapshotFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for a live subscription. Dropping it cancels the subscription.
#[derive(Debug)]
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
