//! Veilroom protocol core.
//!
//! The shared data model (rooms as append-only message logs) and the store
//! abstraction every participant converges on. The store is the single
//! source of truth: clients never mutate a log except by appending through
//! it, and readers replace their local snapshots wholesale with whatever
//! the store returns.
//!
//! # Components
//!
//! - [`Room`], [`Message`]: the persisted record shapes
//! - [`RoomStore`]: the operation contract (create, read, append, list)
//! - [`MemoryStore`]: single-process store, mutex-serialized appends
//! - [`RedbStore`]: durable store, appends serialized by the engine's
//!   write transactions
//!
//! The store never inspects message content; whether a body is ciphertext
//! is carried as an opaque flag and only clients holding the room key can
//! act on it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod storage;

pub use model::{AppendRequest, Message, MessageId, Room, RoomId, ValidationError};
pub use storage::{MemoryStore, RedbStore, RoomStore, StorageError};
