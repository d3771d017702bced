//! The `ForumStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `agora-store-memory`).
//! The ranking and branch engines in this crate, and the HTTP layer in
//! `agora-api`, depend on this abstraction, not on any concrete backend.
//!
//! Every method is synchronous: a backend holds its data in memory and never
//! waits on I/O, so there is nothing for a caller to `.await`.

use crate::{
  Result,
  comment::{Comment, CommentId, NewComment, Parent},
  post::{NewPost, Post, PostId},
  user::{User, UserId},
  vote::{VoteDirection, VoteTarget},
};

/// Abstraction over a forum store backend.
///
/// Entities are created once and never removed or re-parented. The only
/// mutation after creation is a score change through [`apply_vote`].
///
/// Implementations are shared across request workers, so every method must
/// be safe to call concurrently. In particular, identifiers handed out by the
/// `create_*` methods are unique per entity kind under any interleaving.
///
/// [`apply_vote`]: ForumStore::apply_vote
pub trait ForumStore: Send + Sync {
  // ── Users ─────────────────────────────────────────────────────────────

  /// Register a user. Fails with `DuplicateKey` if the id is taken.
  fn create_user(&self, user: User) -> Result<User>;

  fn get_user(&self, id: &UserId) -> Option<User>;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Validate `input`, assign a fresh id and store the post with score 0,
  /// state `Normal` and the current time.
  fn create_post(&self, input: NewPost) -> Result<Post>;

  fn get_post(&self, id: PostId) -> Option<Post>;

  /// All posts in id order.
  fn list_posts(&self) -> Vec<Post>;

  // ── Comments ──────────────────────────────────────────────────────────

  /// Store a comment under an existing parent. Fails with `PostNotFound` or
  /// `CommentNotFound` if the parent does not exist at the time of the call.
  fn create_comment(&self, input: NewComment) -> Result<Comment>;

  fn get_comment(&self, id: CommentId) -> Option<Comment>;

  /// Direct children of `parent`, in creation order. Unknown parents have
  /// no children.
  fn children_of(&self, parent: Parent) -> Vec<Comment>;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Add the vote's delta to the target's score and return the new score.
  ///
  /// The update is atomic per target: concurrent votes on one entity are
  /// all reflected, and their score events are published in the order the
  /// votes were applied. No per-voter deduplication is done.
  fn apply_vote(&self, target: VoteTarget, direction: VoteDirection)
  -> Result<i64>;
}
