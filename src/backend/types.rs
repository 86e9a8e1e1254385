use serde::Deserialize;

/// A single approved-leave row, as returned by the leave-request query.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaveRecord {
  pub member_id: String,
}

/// A row-level mutation on the notification table, delivered through the
/// realtime change feed.
///
/// Consumers recompute from the source of truth on every event, so the
/// variant only says that something changed, not what.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
  Insert,
  Update,
  Delete,
}
