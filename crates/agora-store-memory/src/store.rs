//! [`MemoryStore`] — the in-memory implementation of [`ForumStore`].

use std::{
  fmt,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};

use agora_core::{
  Error, Result,
  comment::{Comment, CommentId, NewComment, Parent},
  id::{EntityKind, IdAllocator},
  post::{ContentState, NewPost, Post, PostId},
  store::ForumStore,
  user::{User, UserId},
  vote::{NullSink, ScoreEvent, ScoreSink, VoteDirection, VoteTarget},
};

// ─── Records ─────────────────────────────────────────────────────────────────

/// Entities whose score lives outside the value so it can be updated in
/// place under a shared shard lock.
trait Scored: Clone {
  fn score(&self) -> i64;
  fn with_score(self, score: i64) -> Self;
}

impl Scored for Post {
  fn score(&self) -> i64 { self.score }

  fn with_score(mut self, score: i64) -> Self {
    self.score = score;
    self
  }
}

impl Scored for Comment {
  fn score(&self) -> i64 { self.score }

  fn with_score(mut self, score: i64) -> Self {
    self.score = score;
    self
  }
}

/// A stored entity. Everything but the score is immutable after insert.
///
/// The score sits behind its own lock. A vote and the report of its result
/// both happen under it.
struct Record<T> {
  value: T,
  score: Mutex<i64>,
}

impl<T: Scored> Record<T> {
  fn new(value: T) -> Self {
    let score = Mutex::new(value.score());
    Self { value, score }
  }

  // A poisoned guard still holds a valid score.
  fn score(&self) -> MutexGuard<'_, i64> {
    self.score.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn snapshot(&self) -> T { self.value.clone().with_score(*self.score()) }

  /// Apply `delta` and hand the resulting score to `report` before any other
  /// vote on this record can run. Returns the new score.
  fn add(&self, delta: i64, report: impl FnOnce(i64)) -> i64 {
    let mut score = self.score();
    *score += delta;
    report(*score);
    *score
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A forum store held entirely in memory.
///
/// Posts and comments live in sharded maps keyed by id. Votes take only a
/// shared shard lock plus the target's own score lock, so votes on distinct
/// targets never wait on each other. Score events for one target reach the
/// sink in the order the votes were applied. A per-parent index records children in
/// the order they were attached, which is the order ties keep when ranking.
pub struct MemoryStore {
  users:       DashMap<UserId, User>,
  posts:       DashMap<PostId, Record<Post>>,
  comments:    DashMap<CommentId, Record<Comment>>,
  children:    DashMap<Parent, Vec<CommentId>>,
  post_ids:    IdAllocator,
  comment_ids: IdAllocator,
  sink:        Arc<dyn ScoreSink>,
}

impl MemoryStore {
  /// An empty store that discards score events.
  pub fn new() -> Self { Self::with_sink(Arc::new(NullSink)) }

  /// An empty store that reports every successful vote to `sink`.
  pub fn with_sink(sink: Arc<dyn ScoreSink>) -> Self {
    Self {
      users: DashMap::new(),
      posts: DashMap::new(),
      comments: DashMap::new(),
      children: DashMap::new(),
      post_ids: IdAllocator::new(),
      comment_ids: IdAllocator::new(),
      sink,
    }
  }

  /// Insert a fully-built post. Fails if the id is already present.
  pub(crate) fn insert_post(&self, post: Post) -> Result<()> {
    match self.posts.entry(post.post_id) {
      Entry::Occupied(_) => Err(Error::DuplicateKey {
        kind: EntityKind::Post,
        key:  post.post_id.to_string(),
      }),
      Entry::Vacant(slot) => {
        slot.insert(Record::new(post));
        Ok(())
      }
    }
  }

  /// Insert a fully-built comment and index it under its parent. The parent
  /// is not checked here.
  pub(crate) fn insert_comment(&self, comment: Comment) -> Result<()> {
    let id = comment.comment_id;
    let parent = comment.parent;
    match self.comments.entry(id) {
      Entry::Occupied(_) => {
        return Err(Error::DuplicateKey {
          kind: EntityKind::Comment,
          key:  id.to_string(),
        });
      }
      Entry::Vacant(slot) => {
        slot.insert(Record::new(comment));
      }
    }
    // Indexed only once the comment itself is readable, so every id in the
    // index resolves.
    self.children.entry(parent).or_insert_with(Vec::new).push(id);
    Ok(())
  }

  fn parent_exists(&self, parent: Parent) -> Result<()> {
    match parent {
      Parent::Post(id) if !self.posts.contains_key(&id) => {
        Err(Error::PostNotFound(id))
      }
      Parent::Comment(id) if !self.comments.contains_key(&id) => {
        Err(Error::CommentNotFound(id))
      }
      _ => Ok(()),
    }
  }
}

impl Default for MemoryStore {
  fn default() -> Self { Self::new() }
}

impl fmt::Debug for MemoryStore {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MemoryStore")
      .field("users", &self.users.len())
      .field("posts", &self.posts.len())
      .field("comments", &self.comments.len())
      .finish()
  }
}

// ─── ForumStore impl ─────────────────────────────────────────────────────────

impl ForumStore for MemoryStore {
  // ── Users ─────────────────────────────────────────────────────────────────

  fn create_user(&self, user: User) -> Result<User> {
    match self.users.entry(user.user_id.clone()) {
      Entry::Occupied(_) => Err(Error::DuplicateKey {
        kind: EntityKind::User,
        key:  user.user_id.to_string(),
      }),
      Entry::Vacant(slot) => {
        tracing::debug!(user_id = %user.user_id, "user created");
        slot.insert(user.clone());
        Ok(user)
      }
    }
  }

  fn get_user(&self, id: &UserId) -> Option<User> {
    self.users.get(id).map(|u| u.value().clone())
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  fn create_post(&self, input: NewPost) -> Result<Post> {
    let media = input.media()?;
    let post = Post {
      post_id: PostId(self.post_ids.next()),
      title: input.title,
      content: input.content,
      score: 0,
      state: ContentState::Normal,
      published_at: Utc::now(),
      media,
      subreddit: input.subreddit,
    };
    self.insert_post(post.clone())?;
    tracing::debug!(post_id = %post.post_id, "post created");
    Ok(post)
  }

  fn get_post(&self, id: PostId) -> Option<Post> {
    self.posts.get(&id).map(|r| r.snapshot())
  }

  fn list_posts(&self) -> Vec<Post> {
    let mut posts: Vec<Post> =
      self.posts.iter().map(|r| r.value().snapshot()).collect();
    posts.sort_by_key(|p| p.post_id);
    posts
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  fn create_comment(&self, input: NewComment) -> Result<Comment> {
    // Entities are never removed, so a parent seen here stays valid.
    self.parent_exists(input.parent)?;

    let comment = Comment {
      comment_id: CommentId(self.comment_ids.next()),
      parent: input.parent,
      author: input.author,
      content: input.content,
      score: 0,
      state: input.state,
      published_at: Utc::now(),
    };
    self.insert_comment(comment.clone())?;
    tracing::debug!(
      comment_id = %comment.comment_id,
      parent = %comment.parent,
      "comment created"
    );
    Ok(comment)
  }

  fn get_comment(&self, id: CommentId) -> Option<Comment> {
    self.comments.get(&id).map(|r| r.snapshot())
  }

  fn children_of(&self, parent: Parent) -> Vec<Comment> {
    // Copy the ids out so the index shard is released before the lookups.
    let ids = self
      .children
      .get(&parent)
      .map(|ids| ids.value().clone())
      .unwrap_or_default();
    ids
      .into_iter()
      .filter_map(|id| self.get_comment(id))
      .collect()
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  fn apply_vote(
    &self,
    target: VoteTarget,
    direction: VoteDirection,
  ) -> Result<i64> {
    let delta = direction.delta();
    let publish = |score| self.sink.publish(ScoreEvent { target, score });
    let score = match target {
      VoteTarget::Post(id) => self
        .posts
        .get(&id)
        .map(|r| r.add(delta, publish))
        .ok_or(Error::PostNotFound(id))?,
      VoteTarget::Comment(id) => self
        .comments
        .get(&id)
        .map(|r| r.add(delta, publish))
        .ok_or(Error::CommentNotFound(id))?,
    };

    tracing::debug!(entity = %target, ?direction, score, "vote applied");
    Ok(score)
  }
}
