//! Posts — the top-level entries that comments hang off.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Store-assigned post identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

/// Moderation state of a post or comment. Only `Normal` is produced by the
/// store itself; the others are carried through untouched.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ContentState {
  #[default]
  Normal,
  Locked,
  Hidden,
  Removed,
}

// ─── Media ───────────────────────────────────────────────────────────────────

/// The single media attachment a post may carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "url", rename_all = "lowercase")]
pub enum Media {
  Image(String),
  Video(String),
}

// ─── Post ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
  pub post_id:      PostId,
  pub title:        String,
  pub content:      String,
  pub score:        i64,
  pub state:        ContentState,
  pub published_at: DateTime<Utc>,
  pub media:        Option<Media>,
  /// Opaque grouping key (the subreddit the post belongs to).
  pub subreddit:    Option<String>,
}

/// Input to [`ForumStore::create_post`](crate::store::ForumStore::create_post).
///
/// Media arrives as two independent fields because that is how clients send
/// it; [`NewPost::media`] folds them into a single [`Media`] or rejects the
/// request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPost {
  pub title:     String,
  pub content:   String,
  #[serde(default)]
  pub image_url: Option<String>,
  #[serde(default)]
  pub video_url: Option<String>,
  #[serde(default)]
  pub subreddit: Option<String>,
}

impl NewPost {
  pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      content: content.into(),
      ..Self::default()
    }
  }

  /// Resolve the media fields. Empty strings count as absent.
  pub fn media(&self) -> Result<Option<Media>> {
    let image = self.image_url.as_deref().filter(|s| !s.is_empty());
    let video = self.video_url.as_deref().filter(|s| !s.is_empty());
    match (image, video) {
      (Some(_), Some(_)) => Err(Error::validation(
        "a post may carry an image or a video, not both",
      )),
      (Some(url), None) => Ok(Some(Media::Image(url.to_owned()))),
      (None, Some(url)) => Ok(Some(Media::Video(url.to_owned()))),
      (None, None) => Ok(None),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn media_is_optional() {
    assert_eq!(NewPost::new("t", "c").media().unwrap(), None);
  }

  #[test]
  fn media_resolves_single_field() {
    let mut input = NewPost::new("t", "c");
    input.video_url = Some("https://v.example/1.mp4".into());
    assert_eq!(
      input.media().unwrap(),
      Some(Media::Video("https://v.example/1.mp4".into()))
    );
  }

  #[test]
  fn media_rejects_image_and_video() {
    let mut input = NewPost::new("t", "c");
    input.image_url = Some("a.png".into());
    input.video_url = Some("b.mp4".into());
    assert!(matches!(input.media(), Err(Error::Validation(_))));
  }

  #[test]
  fn empty_media_string_is_absent() {
    let mut input = NewPost::new("t", "c");
    input.image_url = Some(String::new());
    input.video_url = Some("b.mp4".into());
    assert_eq!(input.media().unwrap(), Some(Media::Video("b.mp4".into())));
  }

  #[test]
  fn media_serialises_tagged() {
    let json = serde_json::to_value(Media::Image("a.png".into())).unwrap();
    assert_eq!(json, serde_json::json!({ "kind": "image", "url": "a.png" }));
  }
}
