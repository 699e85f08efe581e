//! HTTP-backed remote store.
//!
//! Implements [`RoomStore`] against a veilroom server so sessions and the
//! poll loop work unchanged whether the log lives in-process or behind a
//! network. Message bodies cross the wire exactly as stored: the server
//! never sees a key, so there is nothing to protect beyond the transport.

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;
use veilroom_core::{AppendRequest, Message, Room, RoomId, RoomStore, StorageError};

/// Remote [`RoomStore`] speaking the veilroom server's HTTP surface.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base: Url,
}

impl HttpStore {
    /// Point at a server base URL, e.g. `http://127.0.0.1:4180`.
    pub fn new(base: Url) -> Self {
        Self { client: reqwest::Client::new(), base }
    }

    fn room_url(&self, room_id: &RoomId, tail: Option<&str>) -> Result<Url, StorageError> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| StorageError::Remote("base url cannot carry paths".to_owned()))?;
            segments.pop_if_empty().push("rooms").push(room_id.as_str());
            if let Some(tail) = tail {
                segments.push(tail);
            }
        }
        Ok(url)
    }
}

fn remote(err: reqwest::Error) -> StorageError {
    StorageError::Remote(err.to_string())
}

#[async_trait]
impl RoomStore for HttpStore {
    async fn create_room(&self, room_id: &RoomId) -> Result<Room, StorageError> {
        let url = self.room_url(room_id, None)?;
        let response = self.client.post(url).send().await.map_err(remote)?;
        response.error_for_status().map_err(remote)?.json().await.map_err(remote)
    }

    async fn room(&self, room_id: &RoomId) -> Result<Option<Room>, StorageError> {
        let url = self.room_url(room_id, None)?;
        let response = self.client.get(url).send().await.map_err(remote)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Ok(Some(response.error_for_status().map_err(remote)?.json().await.map_err(remote)?))
    }

    async fn append_message(
        &self,
        room_id: &RoomId,
        sender: &str,
        content: &str,
        encrypted: bool,
    ) -> Result<Message, StorageError> {
        let url = self.room_url(room_id, Some("messages"))?;
        let body = AppendRequest {
            sender: sender.to_owned(),
            content: content.to_owned(),
            encrypted,
        };

        let response = self.client.post(url).json(&body).send().await.map_err(remote)?;
        response.error_for_status().map_err(remote)?.json().await.map_err(remote)
    }

    async fn list_messages(&self, room_id: &RoomId) -> Result<Vec<Message>, StorageError> {
        let url = self.room_url(room_id, Some("messages"))?;
        let response = self.client.get(url).send().await.map_err(remote)?;
        response.error_for_status().map_err(remote)?.json().await.map_err(remote)
    }
}
