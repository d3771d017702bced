//! Votes and the score-change feed.
//!
//! A vote is never stored. It is applied to the target's score and then
//! reported to a [`ScoreSink`], which fans the change out to whoever is
//! watching. Delivery is the sink's business.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, comment::CommentId, post::PostId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
  Up,
  Down,
}

impl VoteDirection {
  /// The score delta this vote applies.
  pub fn delta(self) -> i64 {
    match self {
      Self::Up => 1,
      Self::Down => -1,
    }
  }
}

impl FromStr for VoteDirection {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "up" | "upvote" => Ok(Self::Up),
      "down" | "downvote" => Ok(Self::Down),
      other => Err(Error::validation(format!("unknown vote direction {other:?}"))),
    }
  }
}

/// The entity a vote applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum VoteTarget {
  Post(PostId),
  Comment(CommentId),
}

impl fmt::Display for VoteTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Post(id) => write!(f, "post {id}"),
      Self::Comment(id) => write!(f, "comment {id}"),
    }
  }
}

/// Emitted once per successful vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEvent {
  pub target: VoteTarget,
  pub score:  i64,
}

/// Receives score changes. Implementations must not block: `publish` is
/// called from inside the vote path.
pub trait ScoreSink: Send + Sync {
  fn publish(&self, event: ScoreEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ScoreSink for NullSink {
  fn publish(&self, _event: ScoreEvent) {}
}
