//! Polling synchronization of a room's log.
//!
//! Each client polls the store on a fixed interval and replaces its local
//! snapshot wholesale with the result; the store's log is ground truth and
//! there is nothing to merge. Snapshots are published over a watch channel
//! only when they differ structurally from the previous one, so consumers
//! re-render exactly when something changed.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use veilroom_core::{Message, RoomId, RoomStore};

use crate::notify::{Notice, NotificationSink};

/// Poll-loop tuning.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Delay between polls.
    pub interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(2) }
    }
}

/// Handle to a running poll loop.
///
/// Dropping the handle cancels the loop. [`SyncHandle::shutdown`] cancels
/// it and waits until the task has released its resources; an in-flight
/// request is abandoned and has no side effects on the store.
pub struct SyncHandle {
    snapshots: watch::Receiver<Vec<Message>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Receiver for snapshot updates.
    ///
    /// Only structurally new snapshots are published; the initial value is
    /// the empty log.
    pub fn snapshots(&self) -> watch::Receiver<Vec<Message>> {
        self.snapshots.clone()
    }

    /// Stop polling and wait for the loop to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Start polling `room_id` on `store`.
///
/// At most one poll is in flight per handle: every tick awaits its fetch
/// before the next can fire, and ticks that would land while a fetch is
/// still running are skipped rather than pipelined. Poll failures are
/// reported through `sink` and the loop keeps going; only cancellation
/// stops it.
pub fn spawn_poller<S: RoomStore + ?Sized>(
    store: Arc<S>,
    room_id: RoomId,
    config: SyncConfig,
    sink: Arc<dyn NotificationSink>,
) -> SyncHandle {
    let (tx, rx) = watch::channel(Vec::new());
    let cancel = CancellationToken::new();
    let loop_cancel = cancel.clone();

    let task = tokio::spawn(async move {
        let mut ticker = time::interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = loop_cancel.cancelled() => break,
                _ = ticker.tick() => {},
            }

            let poll = tokio::select! {
                () = loop_cancel.cancelled() => break,
                result = store.list_messages(&room_id) => result,
            };

            match poll {
                Ok(latest) => {
                    tx.send_if_modified(|current| {
                        if *current == latest {
                            false
                        } else {
                            *current = latest;
                            true
                        }
                    });
                },
                Err(err) => {
                    // A failed poll never stops the loop; the next tick
                    // simply retries against the authoritative log.
                    tracing::warn!(room = %room_id, error = %err, "poll failed");
                    sink.notify(Notice::warning("Sync failed", err.to_string()));
                },
            }
        }
    });

    SyncHandle { snapshots: rx, cancel, task: Some(task) }
}
