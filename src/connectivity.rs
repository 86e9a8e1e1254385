//! Network reachability signal and the stale-data banner derived from it.

use tokio::sync::watch;

/// Owns the process-wide online/offline boolean.
///
/// Only the monitor writes the value, and only in response to the platform's
/// reachability transitions; everyone else holds a read-only receiver. The
/// monitor itself makes no network calls and has no error states.
pub struct ConnectivityMonitor {
  tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
  /// Start from the platform's current reachability.
  pub fn new(initially_online: bool) -> Self {
    let (tx, _) = watch::channel(initially_online);
    Self { tx }
  }

  pub fn subscribe(&self) -> watch::Receiver<bool> {
    self.tx.subscribe()
  }

  pub fn is_online(&self) -> bool {
    *self.tx.borrow()
  }

  /// The platform reported connectivity restored.
  pub fn set_online(&self) {
    self.tx.send_replace(true);
  }

  /// The platform reported connectivity lost.
  pub fn set_offline(&self) {
    self.tx.send_replace(false);
  }
}

/// What the stale-data banner should show.
///
/// Pure presentation state, derived from the connectivity signal plus the
/// caller's staleness flags. The refresh affordance (and its in-progress
/// spinner) is only offered while online; offline always wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleBanner {
  pub visible: bool,
  pub offline: bool,
  pub show_refresh: bool,
  pub refreshing: bool,
}

impl StaleBanner {
  pub fn derive(online: bool, stale: bool, has_refresh: bool, refreshing: bool) -> Self {
    Self {
      visible: stale || !online,
      offline: !online,
      show_refresh: online && has_refresh,
      refreshing: online && refreshing,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn monitor_tracks_platform_transitions() {
    let monitor = ConnectivityMonitor::new(true);
    let rx = monitor.subscribe();
    assert!(monitor.is_online());

    monitor.set_offline();
    assert!(!monitor.is_online());
    assert!(!*rx.borrow());

    monitor.set_online();
    assert!(monitor.is_online());
  }

  #[test]
  fn banner_hidden_when_fresh_and_online() {
    let banner = StaleBanner::derive(true, false, true, false);
    assert!(!banner.visible);
  }

  #[test]
  fn stale_while_online_offers_refresh() {
    let banner = StaleBanner::derive(true, true, true, false);
    assert!(banner.visible);
    assert!(banner.show_refresh);
    assert!(!banner.offline);
  }

  #[test]
  fn offline_suppresses_refresh_and_spinner() {
    // Even with a refresh callback and an in-flight refresh, offline wins.
    let banner = StaleBanner::derive(false, true, true, true);
    assert!(banner.visible);
    assert!(banner.offline);
    assert!(!banner.show_refresh);
    assert!(!banner.refreshing);
  }

  #[test]
  fn spinner_shows_only_while_online() {
    let banner = StaleBanner::derive(true, true, true, true);
    assert!(banner.refreshing);
  }
}
