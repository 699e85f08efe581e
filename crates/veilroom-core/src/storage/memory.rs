use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;

use super::{RoomStore, StorageError, next_message, now_millis};
use crate::model::{Message, Room, RoomId};

/// In-memory store for tests and single-process deployments.
///
/// A single mutex guards the room map, so every read-modify-write of a log
/// is serialized and concurrent appends to one room never lose a message.
/// Clones share the same underlying state via `Arc`. All operations
/// complete without suspending.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<RoomId, Room>>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rooms created so far. Useful in tests.
    pub fn room_count(&self) -> usize {
        self.lock().len()
    }

    /// # Panics
    ///
    /// Panics if the mutex is poisoned (a thread panicked mid-append); the
    /// map may hold a torn log at that point, so serving it would be worse
    /// than stopping.
    #[allow(clippy::expect_used)]
    fn lock(&self) -> MutexGuard<'_, HashMap<RoomId, Room>> {
        self.inner.lock().expect("store mutex poisoned")
    }
}

fn empty_room(room_id: &RoomId) -> Room {
    Room { id: room_id.clone(), created: now_millis(), messages: Vec::new() }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn create_room(&self, room_id: &RoomId) -> Result<Room, StorageError> {
        let mut rooms = self.lock();
        let room = rooms.entry(room_id.clone()).or_insert_with(|| empty_room(room_id));
        Ok(room.clone())
    }

    async fn room(&self, room_id: &RoomId) -> Result<Option<Room>, StorageError> {
        Ok(self.lock().get(room_id).cloned())
    }

    async fn append_message(
        &self,
        room_id: &RoomId,
        sender: &str,
        content: &str,
        encrypted: bool,
    ) -> Result<Message, StorageError> {
        let mut rooms = self.lock();
        let room = rooms.entry(room_id.clone()).or_insert_with(|| empty_room(room_id));

        let last_timestamp = room.messages.last().map(|message| message.timestamp);
        let message = next_message(room_id, sender, content, encrypted, last_timestamp);
        room.messages.push(message.clone());

        Ok(message)
    }

    async fn list_messages(&self, room_id: &RoomId) -> Result<Vec<Message>, StorageError> {
        Ok(self.lock().get(room_id).map(|room| room.messages.clone()).unwrap_or_default())
    }
}
