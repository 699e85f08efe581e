//! Room storage abstraction.
//!
//! Trait-based abstraction over the shared room/message log. The trait is
//! async so local engines and the HTTP-backed remote store present one
//! contract; local implementations complete without suspending.
//!
//! # Concurrency
//!
//! The per-room log is the only shared mutable resource in the system.
//! Implementations must serialize concurrent appends to the same room so
//! that no message is ever lost; concurrent readers are unrestricted.
//! Rooms are fully independent, so no cross-room coordination is required.

mod error;
mod memory;
mod redb;

use async_trait::async_trait;
pub use error::StorageError;
pub use memory::MemoryStore;

pub use self::redb::RedbStore;
use crate::model::{Message, MessageId, Room, RoomId};

/// Shared room/message log, the single source of truth for every client.
///
/// Implementations must be `Send + Sync`; they are shared across client
/// sessions and poll loops, typically behind an `Arc`.
#[async_trait]
pub trait RoomStore: Send + Sync + 'static {
    /// Create a room if absent.
    ///
    /// Idempotent: an existing room's log is never overwritten or
    /// reordered; the pre-existing room is returned instead.
    async fn create_room(&self, room_id: &RoomId) -> Result<Room, StorageError>;

    /// Read a room without side effects. `None` if it was never created.
    async fn room(&self, room_id: &RoomId) -> Result<Option<Room>, StorageError>;

    /// Append a message, creating the room first if absent.
    ///
    /// The store assigns a fresh unique id and the current timestamp,
    /// persists the message at the end of the log, and returns it.
    /// Concurrent appends to one room each land; none is lost.
    async fn append_message(
        &self,
        room_id: &RoomId,
        sender: &str,
        content: &str,
        encrypted: bool,
    ) -> Result<Message, StorageError>;

    /// Full ordered log of a room.
    ///
    /// Returns the empty sequence for an absent room; absence is not an
    /// error.
    async fn list_messages(&self, room_id: &RoomId) -> Result<Vec<Message>, StorageError>;
}

/// Current wall-clock time in unix-epoch milliseconds.
///
/// Saturates to 0 should the system clock report a pre-epoch time.
pub(crate) fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Construct the record for an append.
///
/// Timestamps are clamped to the previous message's so a room's log reads
/// non-decreasing even across clock steps; ties keep arrival order.
pub(crate) fn next_message(
    room_id: &RoomId,
    sender: &str,
    content: &str,
    encrypted: bool,
    last_timestamp: Option<u64>,
) -> Message {
    Message {
        id: MessageId::generate(),
        sender: sender.to_owned(),
        content: content.to_owned(),
        timestamp: now_millis().max(last_timestamp.unwrap_or(0)),
        room_id: room_id.clone(),
        encrypted,
    }
}
