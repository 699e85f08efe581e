//! Integration tests for the room session.
//!
//! Two sessions sharing one store stand in for two participants; the
//! store is the only channel between them.

use std::sync::Arc;

use async_trait::async_trait;
use veilroom_client::{
    ChannelSink, Message, Room, RoomId, RoomSession, RoomStore, SessionError, Severity,
    StorageError, ValidationError,
};
use veilroom_core::MemoryStore;

fn room_id(id: &str) -> RoomId {
    RoomId::new(id).unwrap()
}

fn session(store: &Arc<MemoryStore>, id: &str) -> RoomSession<MemoryStore> {
    let (sink, _rx) = ChannelSink::new();
    RoomSession::new(Arc::clone(store), room_id(id), Arc::new(sink))
}

#[tokio::test]
async fn username_transition() {
    let store = Arc::new(MemoryStore::new());
    let mut alice = session(&store, "r1");

    assert!(!alice.has_username());
    assert_eq!(alice.set_username("   "), Err(ValidationError::EmptyUsername));
    assert!(!alice.has_username());

    alice.set_username("  alice  ").unwrap();
    assert!(alice.has_username());
}

#[tokio::test]
async fn send_requires_key_username_and_plaintext() {
    let store = Arc::new(MemoryStore::new());
    let mut alice = session(&store, "r1");

    // No key, no username yet.
    assert!(matches!(
        alice.send("hi").await,
        Err(SessionError::Validation(ValidationError::EmptyKey))
    ));

    alice.set_key("k1").unwrap();
    assert!(matches!(
        alice.send("hi").await,
        Err(SessionError::Validation(ValidationError::EmptyUsername))
    ));

    alice.set_username("alice").unwrap();
    assert!(matches!(
        alice.send("   ").await,
        Err(SessionError::Validation(ValidationError::EmptyPlaintext))
    ));

    // Nothing reached the store.
    assert!(store.list_messages(&room_id("r1")).await.unwrap().is_empty());
}

#[tokio::test]
async fn send_appends_ciphertext_and_echoes_immediately() {
    let store = Arc::new(MemoryStore::new());
    let mut alice = session(&store, "r1");
    alice.set_key("k1").unwrap();
    alice.set_username("alice").unwrap();

    let sent = alice.send("hello").await.unwrap();

    assert!(sent.encrypted);
    assert_ne!(sent.content, "hello");

    // The post-send refresh already pulled the message into the snapshot.
    assert_eq!(alice.messages().len(), 1);
    assert_eq!(alice.messages()[0].id, sent.id);

    // The store holds ciphertext only.
    let stored = &store.list_messages(&room_id("r1")).await.unwrap()[0];
    assert!(stored.encrypted);
    assert_ne!(stored.content, "hello");
}

#[tokio::test]
async fn reveal_roundtrip_between_two_participants() {
    let store = Arc::new(MemoryStore::new());

    let mut alice = session(&store, "r1");
    alice.set_key("k1").unwrap();
    alice.set_username("alice").unwrap();
    alice.send("hello bob").await.unwrap();

    let mut bob = session(&store, "r1");
    bob.refresh().await.unwrap();
    assert!(bob.messages()[0].encrypted);

    bob.set_key("k1").unwrap();
    assert_eq!(bob.reveal_all().unwrap(), 1);
    assert_eq!(bob.messages()[0].content, "hello bob");
    assert!(!bob.messages()[0].encrypted);

    // The store copy was never touched, so a re-fetch shows ciphertext
    // again.
    bob.refresh().await.unwrap();
    assert!(bob.messages()[0].encrypted);
}

#[tokio::test]
async fn wrong_key_leaves_messages_encrypted() {
    let store = Arc::new(MemoryStore::new());

    let mut alice = session(&store, "r1");
    alice.set_key("k1").unwrap();
    alice.set_username("alice").unwrap();
    alice.send("secret").await.unwrap();

    let mut eve = session(&store, "r1");
    eve.set_key("k2").unwrap();
    eve.refresh().await.unwrap();

    assert_eq!(eve.reveal_all().unwrap(), 0);
    assert!(eve.messages()[0].encrypted);
}

#[tokio::test]
async fn reveal_is_best_effort_across_mixed_keys() {
    let store = Arc::new(MemoryStore::new());

    let mut alice = session(&store, "r1");
    alice.set_key("k1").unwrap();
    alice.set_username("alice").unwrap();
    alice.send("from alice").await.unwrap();

    let mut mallory = session(&store, "r1");
    mallory.set_key("other key").unwrap();
    mallory.set_username("mallory").unwrap();
    mallory.send("from mallory").await.unwrap();

    let mut bob = session(&store, "r1");
    bob.set_key("k1").unwrap();
    bob.refresh().await.unwrap();

    // Only the message sealed under k1 opens; the other stays encrypted
    // and the pass still completes.
    assert_eq!(bob.reveal_all().unwrap(), 1);
    let revealed: Vec<_> =
        bob.messages().iter().filter(|message| !message.encrypted).collect();
    assert_eq!(revealed.len(), 1);
    assert_eq!(revealed[0].content, "from alice");
}

/// Store whose appends always fail, for exercising the error path.
#[derive(Clone, Default)]
struct BrokenStore;

#[async_trait]
impl RoomStore for BrokenStore {
    async fn create_room(&self, _room_id: &RoomId) -> Result<Room, StorageError> {
        Err(StorageError::Io("disk on fire".to_owned()))
    }

    async fn room(&self, _room_id: &RoomId) -> Result<Option<Room>, StorageError> {
        Err(StorageError::Io("disk on fire".to_owned()))
    }

    async fn append_message(
        &self,
        _room_id: &RoomId,
        _sender: &str,
        _content: &str,
        _encrypted: bool,
    ) -> Result<Message, StorageError> {
        Err(StorageError::Io("disk on fire".to_owned()))
    }

    async fn list_messages(&self, _room_id: &RoomId) -> Result<Vec<Message>, StorageError> {
        Err(StorageError::Io("disk on fire".to_owned()))
    }
}

#[tokio::test]
async fn storage_failure_aborts_send_and_notifies() {
    let (sink, notices) = ChannelSink::new();
    let mut alice =
        RoomSession::new(Arc::new(BrokenStore), room_id("r1"), Arc::new(sink));
    alice.set_key("k1").unwrap();
    alice.set_username("alice").unwrap();

    let result = alice.send("hello").await;

    assert!(matches!(result, Err(SessionError::Storage(_))));
    assert!(alice.messages().is_empty());

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.severity, Severity::Error);
    assert!(notice.body.contains("disk on fire"));
}
