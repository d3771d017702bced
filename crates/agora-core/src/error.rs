//! Error types for `agora-core`.

use thiserror::Error;

use crate::{
  comment::CommentId,
  id::EntityKind,
  post::PostId,
  user::UserId,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("post not found: {0}")]
  PostNotFound(PostId),

  #[error("comment not found: {0}")]
  CommentNotFound(CommentId),

  #[error("user not found: {0}")]
  UserNotFound(UserId),

  #[error("validation failed: {0}")]
  Validation(String),

  /// An insert collided with an existing identifier.
  #[error("duplicate {kind} key: {key}")]
  DuplicateKey { kind: EntityKind, key: String },
}

impl Error {
  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }

  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::PostNotFound(_) | Self::CommentNotFound(_) | Self::UserNotFound(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
