//! Live score feed.
//!
//! [`BroadcastSink`] plugs into the store as its [`ScoreSink`] and fans each
//! score change out over a [`tokio::sync::broadcast`] channel. Slow
//! subscribers lose the oldest events rather than holding up votes.

use agora_core::vote::{ScoreEvent, ScoreSink};
use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub struct BroadcastSink {
  tx: broadcast::Sender<ScoreEvent>,
}

impl BroadcastSink {
  /// `capacity` is the number of events buffered per subscriber.
  pub fn new(capacity: usize) -> Self {
    let (tx, _) = broadcast::channel(capacity.max(1));
    Self { tx }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<ScoreEvent> { self.tx.subscribe() }
}

impl ScoreSink for BroadcastSink {
  fn publish(&self, event: ScoreEvent) {
    // No subscribers is not an error; the event is simply dropped.
    let _ = self.tx.send(event);
  }
}
