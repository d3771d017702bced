//! Score ranking over a parent's children.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  comment::{Comment, Parent},
  post::PostId,
  store::ForumStore,
};

/// A top-level comment paired with all of its direct replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentWithReplies {
  pub comment: Comment,
  /// Unranked, in creation order.
  pub replies: Vec<Comment>,
}

/// Sort `comments` by score, highest first, and keep the first `n`.
///
/// The sort is stable, so comments with equal scores keep their incoming
/// order.
pub fn rank(mut comments: Vec<Comment>, n: usize) -> Vec<Comment> {
  comments.sort_by(|a, b| b.score.cmp(&a.score));
  comments.truncate(n);
  comments
}

/// The `n` highest-scoring children of `parent`.
///
/// A post parent must exist. A comment parent is not checked: a comment
/// without replies and an unknown comment both yield an empty list.
pub fn top_children<S>(store: &S, parent: Parent, n: usize) -> Result<Vec<Comment>>
where
  S: ForumStore + ?Sized,
{
  if let Parent::Post(post_id) = parent
    && store.get_post(post_id).is_none()
  {
    return Err(Error::PostNotFound(post_id));
  }
  if n == 0 {
    return Ok(Vec::new());
  }
  Ok(rank(store.children_of(parent), n))
}

/// The `n` highest-scoring top-level comments of a post, each with every one
/// of its direct replies attached.
pub fn top_comments<S>(
  store: &S,
  post_id: PostId,
  n: usize,
) -> Result<Vec<CommentWithReplies>>
where
  S: ForumStore + ?Sized,
{
  let top = top_children(store, Parent::Post(post_id), n)?;
  Ok(
    top
      .into_iter()
      .map(|comment| {
        let replies = store.children_of(Parent::Comment(comment.comment_id));
        CommentWithReplies { comment, replies }
      })
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::{
    comment::CommentId,
    post::{ContentState, PostId},
  };

  fn comment(id: u64, score: i64) -> Comment {
    Comment {
      comment_id:   CommentId(id),
      parent:       Parent::Post(PostId(1)),
      author:       "u".into(),
      content:      format!("c{id}"),
      score,
      state:        ContentState::Normal,
      published_at: Utc::now(),
    }
  }

  fn ids(comments: &[Comment]) -> Vec<u64> {
    comments.iter().map(|c| c.comment_id.0).collect()
  }

  #[test]
  fn rank_orders_by_score_descending() {
    let ranked = rank(vec![comment(1, -2), comment(2, 5), comment(3, 0)], 3);
    assert_eq!(ids(&ranked), vec![2, 3, 1]);
  }

  #[test]
  fn rank_keeps_incoming_order_on_ties() {
    let input = vec![comment(1, 3), comment(2, 1), comment(3, 3), comment(4, 2)];
    assert_eq!(ids(&rank(input.clone(), 2)), vec![1, 3]);
    assert_eq!(ids(&rank(input, 4)), vec![1, 3, 4, 2]);
  }

  #[test]
  fn rank_truncates_to_available() {
    assert_eq!(rank(vec![comment(1, 0)], 10).len(), 1);
    assert!(rank(vec![comment(1, 0)], 0).is_empty());
  }
}
