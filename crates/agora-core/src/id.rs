//! Identifier allocation.
//!
//! Posts and comments are keyed by small integers handed out by one
//! [`IdAllocator`] per entity kind. Allocation is a single atomic
//! `fetch_add`, so concurrent creators can never observe the same value.

use std::{
  fmt,
  sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

/// The kinds of stored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
  User,
  Post,
  Comment,
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::User => "user",
      Self::Post => "post",
      Self::Comment => "comment",
    })
  }
}

/// Hands out unique, strictly increasing identifiers starting at 1.
#[derive(Debug)]
pub struct IdAllocator {
  next: AtomicU64,
}

impl IdAllocator {
  pub const fn new() -> Self {
    Self {
      next: AtomicU64::new(1),
    }
  }

  /// Reserve the next identifier. Never returns the same value twice.
  pub fn next(&self) -> u64 { self.next.fetch_add(1, Ordering::Relaxed) }
}

impl Default for IdAllocator {
  fn default() -> Self { Self::new() }
}
