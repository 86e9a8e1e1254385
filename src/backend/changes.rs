//! Fan-out of row-level change events on the notification table.

use tokio::sync::broadcast;

use super::types::ChangeEvent;

/// Broadcast hub for notification-table changes.
///
/// The realtime transport publishes into the feed; any number of consumers
/// subscribe, and dropping a receiver unsubscribes it. The buffer is small on
/// purpose: consumers recompute from the source of truth on every event, so a
/// lagged receiver loses nothing it cannot recover.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
  tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
  pub fn new() -> Self {
    let (tx, _) = broadcast::channel(16);
    Self { tx }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
    self.tx.subscribe()
  }

  /// Publish a change. With no subscribers the event is simply dropped.
  pub fn publish(&self, event: ChangeEvent) {
    let _ = self.tx.send(event);
  }
}

impl Default for ChangeFeed {
  fn default() -> Self {
    Self::new()
  }
}
