//! Redb-backed durable store.
//!
//! Uses Redb's ACID transactions, so logs survive process restarts and
//! appends are serialized by the engine rather than by application locks.
//! Each message is its own row: appending writes one record instead of
//! rewriting the whole room log.

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Serialize, de::DeserializeOwned};

use super::{RoomStore, StorageError, next_message, now_millis};
use crate::model::{Message, Room, RoomId};

/// Table: rooms
/// Key: room id bytes
/// Value: CBOR-encoded `StoredRoom`
const ROOMS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("rooms");

/// Table: messages
/// Key: `[room-id length: u32 BE][room-id bytes][sequence: u64 BE]`
/// Value: CBOR-encoded `Message`
///
/// The length prefix keeps one room's rows contiguous: two distinct ids
/// can never interleave inside a sequence range scan.
const MESSAGES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("messages");

/// Room metadata persisted separately from the log.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
struct StoredRoom {
    /// Unix-epoch milliseconds at creation.
    created: u64,
}

/// Durable store backed by Redb.
///
/// Thread-safe through Redb's internal locking: write transactions are
/// serialized by the engine, which is what makes concurrent appends to one
/// room lossless. Clone is cheap (`Arc`).
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a database at the given path.
    ///
    /// Creates the ROOMS and MESSAGES tables if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path.as_ref()).map_err(|e| StorageError::Io(e.to_string()))?;

        let txn = db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let _ = txn.open_table(ROOMS).map_err(|e| StorageError::Io(e.to_string()))?;
            let _ = txn.open_table(MESSAGES).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }
}

fn message_key(room_id: &RoomId, sequence: u64) -> Vec<u8> {
    let id = room_id.as_str().as_bytes();
    let mut key = Vec::with_capacity(4 + id.len() + 8);
    key.extend_from_slice(&(id.len() as u32).to_be_bytes());
    key.extend_from_slice(id);
    key.extend_from_slice(&sequence.to_be_bytes());
    key
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(bytes)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StorageError> {
    ciborium::from_reader(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Read a room's full log in sequence order.
fn read_log<T>(table: &T, room_id: &RoomId) -> Result<Vec<Message>, StorageError>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    let start = message_key(room_id, 0);
    let end = message_key(room_id, u64::MAX);

    let entries = table
        .range(start.as_slice()..=end.as_slice())
        .map_err(|e| StorageError::Io(e.to_string()))?;

    let mut messages = Vec::new();
    for entry in entries {
        let (_, value) = entry.map_err(|e| StorageError::Io(e.to_string()))?;
        messages.push(decode(value.value())?);
    }

    Ok(messages)
}

/// Last `(sequence, message)` of a room's log, if any.
fn last_entry<T>(table: &T, room_id: &RoomId) -> Result<Option<(u64, Message)>, StorageError>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    let start = message_key(room_id, 0);
    let end = message_key(room_id, u64::MAX);

    let mut entries = table
        .range(start.as_slice()..=end.as_slice())
        .map_err(|e| StorageError::Io(e.to_string()))?;

    match entries.next_back() {
        Some(entry) => {
            let (key, value) = entry.map_err(|e| StorageError::Io(e.to_string()))?;
            let key = key.value();
            let tail: [u8; 8] = key[key.len().saturating_sub(8)..].try_into().unwrap_or([0u8; 8]);
            Ok(Some((u64::from_be_bytes(tail), decode(value.value())?)))
        },
        None => Ok(None),
    }
}

#[async_trait]
impl RoomStore for RedbStore {
    async fn create_room(&self, room_id: &RoomId) -> Result<Room, StorageError> {
        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;

        let room = {
            let mut rooms = txn.open_table(ROOMS).map_err(|e| StorageError::Io(e.to_string()))?;
            let key = room_id.as_str().as_bytes();

            let existing: Option<StoredRoom> = rooms
                .get(key)
                .map_err(|e| StorageError::Io(e.to_string()))?
                .map(|guard| decode(guard.value()))
                .transpose()?;

            let created = match existing {
                Some(meta) => meta.created,
                None => {
                    let meta = StoredRoom { created: now_millis() };
                    rooms
                        .insert(key, encode(&meta)?.as_slice())
                        .map_err(|e| StorageError::Io(e.to_string()))?;
                    meta.created
                },
            };

            let messages =
                txn.open_table(MESSAGES).map_err(|e| StorageError::Io(e.to_string()))?;
            Room { id: room_id.clone(), created, messages: read_log(&messages, room_id)? }
        };

        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(room)
    }

    async fn room(&self, room_id: &RoomId) -> Result<Option<Room>, StorageError> {
        let txn = self.db.begin_read().map_err(|e| StorageError::Io(e.to_string()))?;

        let rooms = txn.open_table(ROOMS).map_err(|e| StorageError::Io(e.to_string()))?;
        let meta: Option<StoredRoom> = rooms
            .get(room_id.as_str().as_bytes())
            .map_err(|e| StorageError::Io(e.to_string()))?
            .map(|guard| decode(guard.value()))
            .transpose()?;

        let Some(meta) = meta else {
            return Ok(None);
        };

        let messages = txn.open_table(MESSAGES).map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(Some(Room {
            id: room_id.clone(),
            created: meta.created,
            messages: read_log(&messages, room_id)?,
        }))
    }

    async fn append_message(
        &self,
        room_id: &RoomId,
        sender: &str,
        content: &str,
        encrypted: bool,
    ) -> Result<Message, StorageError> {
        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;

        let message = {
            let mut rooms = txn.open_table(ROOMS).map_err(|e| StorageError::Io(e.to_string()))?;
            let room_key = room_id.as_str().as_bytes();

            let known = rooms
                .get(room_key)
                .map_err(|e| StorageError::Io(e.to_string()))?
                .is_some();
            if !known {
                let meta = StoredRoom { created: now_millis() };
                rooms
                    .insert(room_key, encode(&meta)?.as_slice())
                    .map_err(|e| StorageError::Io(e.to_string()))?;
            }

            let mut messages =
                txn.open_table(MESSAGES).map_err(|e| StorageError::Io(e.to_string()))?;

            let (next_sequence, last_timestamp) = match last_entry(&messages, room_id)? {
                Some((sequence, last)) => (sequence + 1, Some(last.timestamp)),
                None => (0, None),
            };

            let message = next_message(room_id, sender, content, encrypted, last_timestamp);
            messages
                .insert(message_key(room_id, next_sequence).as_slice(), encode(&message)?.as_slice())
                .map_err(|e| StorageError::Io(e.to_string()))?;

            message
        };

        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(message)
    }

    async fn list_messages(&self, room_id: &RoomId) -> Result<Vec<Message>, StorageError> {
        let txn = self.db.begin_read().map_err(|e| StorageError::Io(e.to_string()))?;
        let messages = txn.open_table(MESSAGES).map_err(|e| StorageError::Io(e.to_string()))?;

        read_log(&messages, room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{RedbStore, RoomStore};
    use crate::model::RoomId;

    fn room_id(id: &str) -> RoomId {
        RoomId::new(id).unwrap()
    }

    fn open_temp() -> (tempfile::TempDir, RedbStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("rooms.redb")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn append_and_list_roundtrip() {
        let (_dir, store) = open_temp();
        let id = room_id("r1");

        store.append_message(&id, "alice", "first", true).await.unwrap();
        store.append_message(&id, "bob", "second", true).await.unwrap();

        let messages = store.list_messages(&id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, "alice");
        assert_eq!(messages[1].sender, "bob");
        assert!(messages[0].timestamp <= messages[1].timestamp);
    }

    #[tokio::test]
    async fn log_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rooms.redb");
        let id = room_id("durable");

        {
            let store = RedbStore::open(&path).unwrap();
            store.append_message(&id, "alice", "persisted", true).await.unwrap();
        }

        let store = RedbStore::open(&path).unwrap();
        let messages = store.list_messages(&id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "persisted");
    }

    #[tokio::test]
    async fn create_room_is_idempotent() {
        let (_dir, store) = open_temp();
        let id = room_id("twice");

        let first = store.create_room(&id).await.unwrap();
        store.append_message(&id, "alice", "kept", false).await.unwrap();
        let second = store.create_room(&id).await.unwrap();

        assert_eq!(second.created, first.created);
        assert_eq!(second.messages.len(), 1);
    }

    #[tokio::test]
    async fn absent_room_lists_empty() {
        let (_dir, store) = open_temp();

        assert_eq!(store.room(&room_id("ghost")).await.unwrap(), None);
        assert!(store.list_messages(&room_id("ghost")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rooms_with_shared_id_prefixes_stay_separate() {
        let (_dir, store) = open_temp();

        store.append_message(&room_id("ab"), "alice", "for ab", false).await.unwrap();
        store.append_message(&room_id("abc"), "bob", "for abc", false).await.unwrap();
        store.append_message(&room_id("a"), "carol", "for a", false).await.unwrap();

        assert_eq!(store.list_messages(&room_id("ab")).await.unwrap().len(), 1);
        assert_eq!(store.list_messages(&room_id("abc")).await.unwrap().len(), 1);
        assert_eq!(store.list_messages(&room_id("a")).await.unwrap().len(), 1);
    }
}
