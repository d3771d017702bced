//! Branch expansion — a comment together with its best replies, their best
//! replies, and so on down to a fixed depth.
//!
//! Cost grows as `width ^ max_depth`; callers facing the network should cap
//! both before calling [`expand`].

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  comment::{Comment, CommentId, Parent},
  rank::top_children,
  store::ForumStore,
};

/// Number of reply levels materialised below the root when the caller does
/// not choose.
pub const DEFAULT_DEPTH: usize = 2;

/// One node of an expanded branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentTree {
  pub comment: Comment,
  /// Top-ranked replies, highest score first.
  pub replies: Vec<CommentTree>,
}

impl CommentTree {
  /// Number of reply levels below this node.
  pub fn depth(&self) -> usize {
    self
      .replies
      .iter()
      .map(|r| r.depth() + 1)
      .max()
      .unwrap_or(0)
  }
}

/// Shape of an expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchShape {
  /// Replies kept per node.
  pub width:     usize,
  /// Reply levels below the root. Nodes at this depth carry no replies.
  pub max_depth: usize,
}

impl BranchShape {
  pub fn new(width: usize) -> Self {
    Self {
      width,
      max_depth: DEFAULT_DEPTH,
    }
  }

  pub fn with_depth(mut self, max_depth: usize) -> Self {
    self.max_depth = max_depth;
    self
  }
}

/// Expand the branch rooted at `root`.
///
/// Fails with `CommentNotFound` only if the root itself is missing. Replies
/// created or voted on while the expansion runs may or may not be reflected.
pub fn expand<S>(store: &S, root: CommentId, shape: BranchShape) -> Result<CommentTree>
where
  S: ForumStore + ?Sized,
{
  let comment = store
    .get_comment(root)
    .ok_or(Error::CommentNotFound(root))?;
  expand_node(store, comment, 0, shape)
}

fn expand_node<S>(
  store: &S,
  comment: Comment,
  depth: usize,
  shape: BranchShape,
) -> Result<CommentTree>
where
  S: ForumStore + ?Sized,
{
  if depth >= shape.max_depth {
    return Ok(CommentTree {
      comment,
      replies: Vec::new(),
    });
  }

  let replies = top_children(store, Parent::Comment(comment.comment_id), shape.width)?
    .into_iter()
    .map(|reply| expand_node(store, reply, depth + 1, shape))
    .collect::<Result<Vec<_>>>()?;

  Ok(CommentTree { comment, replies })
}
