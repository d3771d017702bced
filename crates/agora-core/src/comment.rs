//! Comments and the parent reference that threads them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  post::{ContentState, PostId},
  user::UserId,
};

/// Store-assigned comment identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CommentId(pub u64);

impl fmt::Display for CommentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// What a comment is attached to: a post (top-level) or another comment
/// (reply). Exactly one, always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Parent {
  Post(PostId),
  Comment(CommentId),
}

impl Parent {
  /// Build a parent from the two optional fields clients send. Exactly one
  /// must be set.
  pub fn from_fields(
    post_id: Option<PostId>,
    comment_id: Option<CommentId>,
  ) -> Result<Self> {
    match (post_id, comment_id) {
      (Some(p), None) => Ok(Self::Post(p)),
      (None, Some(c)) => Ok(Self::Comment(c)),
      (Some(_), Some(_)) => Err(Error::validation(
        "a comment must have a post parent or a comment parent, not both",
      )),
      (None, None) => Err(Error::validation("a comment needs a parent")),
    }
  }
}

impl fmt::Display for Parent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Post(id) => write!(f, "post {id}"),
      Self::Comment(id) => write!(f, "comment {id}"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id:   CommentId,
  pub parent:       Parent,
  pub author:       UserId,
  pub content:      String,
  pub score:        i64,
  pub state:        ContentState,
  pub published_at: DateTime<Utc>,
}

/// Input to [`ForumStore::create_comment`](crate::store::ForumStore::create_comment).
#[derive(Debug, Clone)]
pub struct NewComment {
  pub parent:  Parent,
  pub author:  UserId,
  pub content: String,
  pub state:   ContentState,
}

impl NewComment {
  pub fn new(
    parent: Parent,
    author: impl Into<UserId>,
    content: impl Into<String>,
  ) -> Self {
    Self {
      parent,
      author: author.into(),
      content: content.into(),
      state: ContentState::Normal,
    }
  }
}
