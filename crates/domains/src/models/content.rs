use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// An attachment. Uploads arrive as data URLs and are stored inline in `url`;
/// there is no separate blob storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
}

impl MediaItem {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Image,
            url: url.into(),
        }
    }

    pub fn video(url: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Video,
            url: url.into(),
        }
    }

    /// Classifies a `data:<mime>[;base64],<payload>` URL by its MIME type.
    /// Only image and video payloads are accepted.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let header = url
            .strip_prefix("data:")
            .and_then(|rest| rest.split(',').next())
            .ok_or_else(|| DomainError::validation("media must be a data URL"))?;
        let essence = header.split(';').next().unwrap_or_default();
        let parsed: mime::Mime = essence
            .parse()
            .map_err(|_| DomainError::validation(format!("unrecognised media type '{essence}'")))?;

        let kind = match parsed.type_() {
            mime::IMAGE => MediaKind::Image,
            mime::VIDEO => MediaKind::Video,
            other => {
                return Err(DomainError::validation(format!(
                    "unsupported media type '{other}'"
                )))
            }
        };
        Ok(Self {
            kind,
            url: url.to_string(),
        })
    }

    /// Inline uploads must carry a payload of the declared kind; anything
    /// else must be an http(s) link.
    pub fn validate(&self) -> Result<()> {
        if self.url.starts_with("data:") {
            let detected = Self::from_data_url(&self.url)?.kind;
            if detected != self.kind {
                return Err(DomainError::validation(
                    "media type does not match its payload",
                ));
            }
            return Ok(());
        }
        if self.url.starts_with("https://") || self.url.starts_with("http://") {
            return Ok(());
        }
        Err(DomainError::validation("media must be a data URL or an http(s) link"))
    }
}

/// A post on a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    /// Markdown/HTML, rendered by the view layer
    pub content: String,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    pub board_id: Uuid,
    /// `None` for anonymous posts
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A post on a user's own profile, optionally paywalled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePost {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    pub author_id: Uuid,
    /// 0 means free
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub unlocked_user_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl ProfilePost {
    pub fn is_paid(&self) -> bool {
        self.price > 0
    }

    pub fn is_unlocked_for(&self, user_id: Uuid) -> bool {
        !self.is_paid() || self.author_id == user_id || self.unlocked_user_ids.contains(&user_id)
    }
}

/// An admin-authored article shown in its own section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Editorial {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub post_id: Uuid,
    /// `None` for anonymous comments
    pub author_id: Option<Uuid>,
    /// Parent comment for threaded replies
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_image_is_classified() {
        let item = MediaItem::from_data_url("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(item.kind, MediaKind::Image);
        assert!(item.url.starts_with("data:image/png"));
    }

    #[test]
    fn data_url_video_is_classified() {
        let item = MediaItem::from_data_url("data:video/mp4;base64,AAAA").unwrap();
        assert_eq!(item.kind, MediaKind::Video);
    }

    #[test]
    fn non_media_payload_is_rejected() {
        let err = MediaItem::from_data_url("data:application/pdf;base64,JVBERi0=").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(MediaItem::from_data_url("https://example.com/cat.png").is_err());
    }

    #[test]
    fn declared_kind_must_match_the_payload() {
        assert!(MediaItem::image("data:image/gif;base64,R0lGOD==").validate().is_ok());
        assert!(MediaItem::video("https://cdn.example/clip.mp4").validate().is_ok());
        assert!(matches!(
            MediaItem::video("data:image/png;base64,AA==").validate(),
            Err(DomainError::Validation(_))
        ));
        assert!(MediaItem::image("data:text/plain,hello").validate().is_err());
        assert!(MediaItem::image("ftp://example.com/cat.png").validate().is_err());
    }

    #[test]
    fn free_profile_post_is_open_to_everyone() {
        let author = Uuid::new_v4();
        let mut post = ProfilePost {
            id: Uuid::new_v4(),
            title: "t".into(),
            content: "c".into(),
            media: vec![],
            author_id: author,
            price: 0,
            unlocked_user_ids: vec![],
            created_at: Utc::now(),
        };
        let viewer = Uuid::new_v4();
        assert!(post.is_unlocked_for(viewer));

        post.price = 50;
        assert!(!post.is_unlocked_for(viewer));
        assert!(post.is_unlocked_for(author));
    }
}
