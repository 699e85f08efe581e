//! Room and message data model.
//!
//! A room is an identifier, a creation timestamp, and an append-only
//! ordered log of messages. Insertion order is semantic: it is both the
//! display order and the causal order, and arrival order at the store is
//! definitive when timestamps tie.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Opaque room identifier.
///
/// Doubles as the storage key and as the unguessable component of a share
/// link: possession of the id (plus the key) is what grants access. Never
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Parse an identifier, rejecting the empty string before any I/O.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::EmptyRoomId);
        }
        Ok(Self(id))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique message identifier.
///
/// UUID v4, collision-resistant under concurrent append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A single chat message as persisted in a room's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique within the store.
    pub id: MessageId,

    /// Display name chosen by the sender. Free text, not an identity; two
    /// participants may share a name.
    pub sender: String,

    /// Opaque ciphertext blob when `encrypted` is true, plaintext
    /// otherwise. The store never inspects or validates this field.
    pub content: String,

    /// Unix-epoch milliseconds, assigned by the store. Non-decreasing
    /// within a room; ties keep arrival order.
    pub timestamp: u64,

    /// Back-reference to the owning room, not ownership.
    #[serde(rename = "roomId")]
    pub room_id: RoomId,

    /// Whether `content` currently holds ciphertext.
    pub encrypted: bool,
}

/// A room: identifier, creation time, append-only message log.
///
/// Owned exclusively by the store; never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Identifier, unique within the store.
    pub id: RoomId,

    /// Unix-epoch milliseconds at creation.
    pub created: u64,

    /// Ordered log; insertion order is the display and causal order.
    pub messages: Vec<Message>,
}

/// Body of an append operation as carried over the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendRequest {
    /// Sender display name.
    pub sender: String,

    /// Ciphertext blob or plaintext; stored as-is.
    pub content: String,

    /// Whether `content` is ciphertext.
    pub encrypted: bool,
}

/// Input rejected before any I/O happens.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Room identifiers must be non-empty.
    #[error("room id must not be empty")]
    EmptyRoomId,

    /// The symmetric key must be non-empty.
    #[error("key must not be empty")]
    EmptyKey,

    /// Refusing to send an empty message.
    #[error("message must not be empty")]
    EmptyPlaintext,

    /// Display names must be non-empty.
    #[error("display name must not be empty")]
    EmptyUsername,
}

#[cfg(test)]
mod tests {
    use super::{Message, MessageId, RoomId, ValidationError};

    #[test]
    fn empty_room_id_is_rejected() {
        assert_eq!(RoomId::new(""), Err(ValidationError::EmptyRoomId));
    }

    #[test]
    fn room_id_roundtrips_as_string() {
        let id = RoomId::new("x7f3kq").unwrap();
        assert_eq!(id.as_str(), "x7f3kq");
        assert_eq!(id.to_string(), "x7f3kq");
    }

    #[test]
    fn message_ids_are_unique() {
        let a = MessageId::generate();
        let b = MessageId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn message_serializes_with_room_id_field_name() {
        let message = Message {
            id: MessageId::generate(),
            sender: "alice".to_owned(),
            content: "blob".to_owned(),
            timestamp: 1_700_000_000_000,
            room_id: RoomId::new("r1").unwrap(),
            encrypted: true,
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["roomId"], "r1");
        assert_eq!(json["sender"], "alice");
        assert_eq!(json["encrypted"], true);
    }
}
