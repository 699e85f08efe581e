//! Capability share links.
//!
//! A link carries the room id as a path segment and the key as a query
//! value: possession of the link is authorization. That also means the key
//! travels inside a URL and lands wherever URLs land (proxy logs, browser
//! history, chat previews). This exposure is inherent to the sharing model
//! and deliberately left as-is; treat share links like the secrets they
//! are.

use percent_encoding::percent_decode_str;
use thiserror::Error;
use url::Url;
use veilroom_core::{RoomId, ValidationError};

/// Room id and key pair carried in a share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    /// Target room.
    pub room_id: RoomId,
    /// Symmetric key passphrase, non-empty.
    pub key: String,
}

/// Problems turning URLs into share links and back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareLinkError {
    /// The URL cannot carry path segments (e.g. `mailto:`).
    #[error("url cannot carry a room path")]
    NotHierarchical,

    /// No `/chat/{room}` path in the URL.
    #[error("url does not point at a room")]
    MissingRoom,

    /// No non-empty `key` query value.
    #[error("url carries no key")]
    MissingKey,

    /// Room id or key failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ShareLink {
    /// Pair a room with its key, rejecting an empty key.
    pub fn new(room_id: RoomId, key: impl Into<String>) -> Result<Self, ShareLinkError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ValidationError::EmptyKey.into());
        }
        Ok(Self { room_id, key })
    }

    /// Render onto `base`, producing `{base}/chat/{room}?key={key}`.
    ///
    /// Path segment and query value are percent-encoded as needed.
    pub fn to_url(&self, base: &Url) -> Result<Url, ShareLinkError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| ShareLinkError::NotHierarchical)?
            .pop_if_empty()
            .push("chat")
            .push(self.room_id.as_str());
        url.query_pairs_mut().clear().append_pair("key", &self.key);
        Ok(url)
    }

    /// Parse a share link back out of a URL.
    ///
    /// Expects the final path segments to read `chat/{room}` and a
    /// non-empty `key` query value.
    pub fn from_url(url: &Url) -> Result<Self, ShareLinkError> {
        let segments: Vec<&str> =
            url.path_segments().ok_or(ShareLinkError::NotHierarchical)?.collect();

        let encoded_room = match segments.as_slice() {
            [.., chat, room] if *chat == "chat" => *room,
            _ => return Err(ShareLinkError::MissingRoom),
        };
        let room = percent_decode_str(encoded_room)
            .decode_utf8()
            .map_err(|_| ShareLinkError::MissingRoom)?;

        let key = url
            .query_pairs()
            .find(|(name, _)| name == "key")
            .map(|(_, value)| value.into_owned())
            .filter(|key| !key.is_empty())
            .ok_or(ShareLinkError::MissingKey)?;

        Ok(Self { room_id: RoomId::new(room.into_owned())?, key })
    }
}

#[cfg(test)]
mod tests {
    use url::Url;
    use veilroom_core::RoomId;

    use super::{ShareLink, ShareLinkError};

    fn room_id(id: &str) -> RoomId {
        RoomId::new(id).unwrap()
    }

    #[test]
    fn renders_room_and_key_onto_base() {
        let link = ShareLink::new(room_id("x7f3kq"), "open sesame").unwrap();
        let base = Url::parse("https://rooms.example").unwrap();

        let url = link.to_url(&base).unwrap();

        assert_eq!(url.as_str(), "https://rooms.example/chat/x7f3kq?key=open+sesame");
    }

    #[test]
    fn roundtrips_through_url() {
        let link = ShareLink::new(room_id("room with spaces/and slash"), "k&=?1").unwrap();
        let base = Url::parse("https://rooms.example/app/").unwrap();

        let url = link.to_url(&base).unwrap();
        let parsed = ShareLink::from_url(&url).unwrap();

        assert_eq!(parsed, link);
    }

    #[test]
    fn rejects_link_without_key() {
        let url = Url::parse("https://rooms.example/chat/x7f3kq").unwrap();
        assert_eq!(ShareLink::from_url(&url), Err(ShareLinkError::MissingKey));

        let url = Url::parse("https://rooms.example/chat/x7f3kq?key=").unwrap();
        assert_eq!(ShareLink::from_url(&url), Err(ShareLinkError::MissingKey));
    }

    #[test]
    fn rejects_link_without_room_path() {
        let url = Url::parse("https://rooms.example/about?key=k").unwrap();
        assert_eq!(ShareLink::from_url(&url), Err(ShareLinkError::MissingRoom));
    }

    #[test]
    fn empty_key_is_rejected_up_front() {
        assert!(matches!(
            ShareLink::new(room_id("r"), ""),
            Err(ShareLinkError::Validation(_))
        ));
    }
}
