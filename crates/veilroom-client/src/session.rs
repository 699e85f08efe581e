//! Per-client room view.
//!
//! A session binds a room id, the locally held symmetric key, and a
//! display identity. It orchestrates encrypt-then-append on send and
//! decrypt-on-demand on read, against any [`RoomStore`]. The session only
//! ever holds a snapshot of the log; the store stays authoritative and a
//! re-fetch always replaces the snapshot wholesale.

use std::sync::Arc;

use veilroom_core::{Message, RoomStore, RoomId, ValidationError};
use veilroom_crypto::{RoomKey, decrypt_message, encrypt_message};

use crate::{
    error::SessionError,
    notify::{Notice, NotificationSink},
};

/// A client's view of one room.
///
/// Starts without a display name; [`RoomSession::set_username`] moves it
/// into the named state, which is required for sending. The key is
/// attached separately since a participant may open a link that carries
/// no key and still watch ciphertext arrive.
pub struct RoomSession<S: ?Sized> {
    store: Arc<S>,
    room_id: RoomId,
    key: Option<RoomKey>,
    username: Option<String>,
    messages: Vec<Message>,
    sink: Arc<dyn NotificationSink>,
}

impl<S: RoomStore + ?Sized> RoomSession<S> {
    /// Open a view onto `room_id` backed by `store`.
    pub fn new(store: Arc<S>, room_id: RoomId, sink: Arc<dyn NotificationSink>) -> Self {
        Self { store, room_id, key: None, username: None, messages: Vec::new(), sink }
    }

    /// The room this session is bound to.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Attach the symmetric key from the share link.
    ///
    /// Rejects an empty passphrase before anything touches it.
    pub fn set_key(&mut self, passphrase: &str) -> Result<(), ValidationError> {
        if passphrase.is_empty() {
            return Err(ValidationError::EmptyKey);
        }
        self.key = Some(RoomKey::from_passphrase(passphrase));
        Ok(())
    }

    /// Record the display name for the rest of the session.
    ///
    /// Whitespace is trimmed and the result must be non-empty. Names are
    /// not checked for uniqueness within the room; two participants may
    /// pick the same one.
    pub fn set_username(&mut self, name: &str) -> Result<(), ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyUsername);
        }
        self.username = Some(name.to_owned());
        Ok(())
    }

    /// Whether a display name has been set.
    pub fn has_username(&self) -> bool {
        self.username.is_some()
    }

    /// Current local snapshot, in log order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Encrypt `plaintext` and append it to the room.
    ///
    /// Requires a key, a username, and non-empty plaintext; violations are
    /// rejected before any I/O. A cipher or store failure aborts the send,
    /// reports through the sink, and is returned to the caller; nothing is
    /// retried automatically. After a successful append the snapshot is
    /// re-fetched immediately so the sender sees its own message without
    /// waiting for the next poll tick.
    pub async fn send(&mut self, plaintext: &str) -> Result<Message, SessionError> {
        if plaintext.trim().is_empty() {
            return Err(ValidationError::EmptyPlaintext.into());
        }
        let key = self.key.as_ref().ok_or(ValidationError::EmptyKey)?;
        let username = self.username.as_deref().ok_or(ValidationError::EmptyUsername)?;

        let blob = match encrypt_message(plaintext, key) {
            Ok(blob) => blob,
            Err(err) => {
                self.sink.notify(Notice::error("Could not encrypt message", err.to_string()));
                return Err(err.into());
            },
        };

        let message =
            match self.store.append_message(&self.room_id, username, &blob, true).await {
                Ok(message) => message,
                Err(err) => {
                    self.sink.notify(Notice::error("Could not send message", err.to_string()));
                    return Err(err.into());
                },
            };

        if let Err(err) = self.refresh().await {
            // The append landed; only the echo fetch failed. The next poll
            // tick will pick the message up.
            self.sink.notify(Notice::warning("Message sent, refresh failed", err.to_string()));
        }

        Ok(message)
    }

    /// Re-fetch the authoritative log, replacing the snapshot wholesale.
    ///
    /// Returns whether the snapshot changed. Any messages revealed via
    /// [`RoomSession::reveal_all`] revert to ciphertext, since the store's
    /// copy is never mutated.
    pub async fn refresh(&mut self) -> Result<bool, SessionError> {
        let latest = self.store.list_messages(&self.room_id).await?;
        Ok(self.apply_snapshot(latest))
    }

    /// Accept a snapshot from the poll loop.
    ///
    /// Returns whether it differed from the current one.
    pub fn apply_snapshot(&mut self, snapshot: Vec<Message>) -> bool {
        if self.messages == snapshot {
            return false;
        }
        self.messages = snapshot;
        true
    }

    /// Try the session key against every encrypted message in the
    /// snapshot.
    ///
    /// Successes swap in the plaintext and clear the flag for display
    /// only; the stored copy is untouched. Messages the key cannot open
    /// stay encrypted; the pass always covers the whole snapshot, one
    /// failure never aborts the rest. Returns how many were revealed.
    pub fn reveal_all(&mut self) -> Result<usize, SessionError> {
        let key = self.key.as_ref().ok_or(ValidationError::EmptyKey)?;

        let mut revealed = 0;
        for message in &mut self.messages {
            if !message.encrypted {
                continue;
            }
            if let Ok(plaintext) = decrypt_message(&message.content, key) {
                message.content = plaintext;
                message.encrypted = false;
                revealed += 1;
            }
        }

        tracing::debug!(room = %self.room_id, revealed, "reveal pass finished");
        Ok(revealed)
    }
}
