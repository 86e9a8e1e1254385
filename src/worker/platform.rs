//! Seams for the platform notification and window APIs.

use std::collections::HashMap;

use super::types::Notification;

/// Platform notification display surface.
///
/// Display is tag-keyed: showing a notification whose tag is already on
/// screen replaces the old one rather than stacking a second.
pub trait NotificationCenter {
  fn show(&mut self, notification: Notification);
  fn close(&mut self, tag: &str);
}

/// The set of application windows reachable from the worker.
pub trait WindowClients {
  /// Focus a window on the worker's own origin, if one is open. Returns true
  /// when one was found and focused.
  fn focus_same_origin(&mut self) -> bool;

  /// Open a new window at `url`. Returns false when the capability is
  /// unavailable; the caller then has nothing left to do.
  fn open_window(&mut self, url: &str) -> bool;
}

/// In-memory notification surface with tag-replacement semantics, used by the
/// single-window runtime and by tests.
#[derive(Debug, Default)]
pub struct InMemoryNotifications {
  visible: HashMap<String, Notification>,
  shown: Vec<Notification>,
}

impl InMemoryNotifications {
  pub fn new() -> Self {
    Self::default()
  }

  /// Notifications currently on screen.
  pub fn visible(&self) -> impl Iterator<Item = &Notification> {
    self.visible.values()
  }

  pub fn visible_count(&self) -> usize {
    self.visible.len()
  }

  pub fn get(&self, tag: &str) -> Option<&Notification> {
    self.visible.get(tag)
  }

  /// Every notification ever shown, in display order.
  pub fn history(&self) -> &[Notification] {
    &self.shown
  }
}

impl NotificationCenter for InMemoryNotifications {
  fn show(&mut self, notification: Notification) {
    self.shown.push(notification.clone());
    self.visible.insert(notification.tag.clone(), notification);
  }

  fn close(&mut self, tag: &str) {
    self.visible.remove(tag);
  }
}

/// Client set for the single-window runtime: the app itself is the only
/// same-origin window, so focusing always succeeds and opening new windows
/// is unavailable.
#[derive(Debug, Default)]
pub struct SingleWindow;

impl WindowClients for SingleWindow {
  fn focus_same_origin(&mut self) -> bool {
    true
  }

  fn open_window(&mut self, _url: &str) -> bool {
    false
  }
}
