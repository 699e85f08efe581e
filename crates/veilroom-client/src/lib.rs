//! Veilroom client.
//!
//! Per-client building blocks around the shared store: the room session
//! (encrypt-then-append on send, decrypt-on-demand on read), the polling
//! sync loop that converges on the store's authoritative log, capability
//! share links, and a notification sink for surfacing failures to whatever
//! presentation layer hosts the client.
//!
//! # Architecture
//!
//! One [`RoomSession`] runs per connected client. It never talks to other
//! sessions: all coordination goes through the store, which the session
//! reaches via the [`RoomStore`] trait so a local engine and a remote
//! server ([`HttpStore`]) are interchangeable. A [`SyncHandle`] wraps the
//! poll loop; snapshots flow out of it over a watch channel and only
//! structurally new snapshots are published.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
pub mod link;
pub mod notify;
mod remote;
mod session;
mod sync;

pub use error::SessionError;
pub use link::{ShareLink, ShareLinkError};
pub use notify::{ChannelSink, Notice, NotificationSink, Severity, TracingSink};
pub use remote::HttpStore;
pub use session::RoomSession;
pub use sync::{SyncConfig, SyncHandle, spawn_poller};
pub use veilroom_core::{Message, Room, RoomId, RoomStore, StorageError, ValidationError};
pub use veilroom_crypto::{CryptoError, RoomKey};
