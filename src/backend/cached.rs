//! Backend wrapper that keeps roster exclusions in a TTL cache.

use std::collections::HashSet;

use chrono::Utc;
use tokio::time::Duration;

use crate::cache::RosterCache;

use super::client::BackendClient;

/// `BackendClient` with an in-memory cache in front of the leave-exclusion
/// query, so membership checks don't hit the backend on every call.
pub struct CachedBackend {
  inner: BackendClient,
  roster: RosterCache,
}

impl CachedBackend {
  pub fn new(inner: BackendClient, roster_ttl: Duration) -> Self {
    Self {
      inner,
      roster: RosterCache::new().with_ttl(roster_ttl),
    }
  }

  /// Members currently excluded by an approved leave.
  pub async fn excluded_members(&mut self) -> HashSet<String> {
    let inner = self.inner.clone();
    self
      .roster
      .excluded_members(move || async move { inner.approved_leave(Utc::now().date_naive()).await })
      .await
  }

  /// Whether a member is available for scheduling today.
  pub async fn is_active(&mut self, member_id: &str) -> bool {
    !self.excluded_members().await.contains(member_id)
  }

  /// Drop members currently on leave from a candidate list, preserving order.
  pub async fn filter_active(&mut self, members: Vec<String>) -> Vec<String> {
    let excluded = self.excluded_members().await;
    members
      .into_iter()
      .filter(|m| !excluded.contains(m))
      .collect()
  }

  /// Forget the cached exclusions; the next lookup refetches.
  pub fn clear_roster(&mut self) {
    self.roster.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{BackendConfig, Config};

  fn unreachable_backend() -> CachedBackend {
    std::env::set_var("SELAH_BACKEND_TOKEN", "test-token");
    let config = Config {
      backend: BackendConfig {
        // Discard port; connections are refused immediately
        url: "http://127.0.0.1:9".to_string(),
        api_key: "anon".to_string(),
      },
      title: None,
      roster_ttl_secs: 300,
      scheduler_tick_secs: 15,
    };
    CachedBackend::new(
      BackendClient::new(&config).unwrap(),
      Duration::from_secs(300),
    )
  }

  #[tokio::test]
  async fn unreachable_backend_fails_open() {
    let mut backend = unreachable_backend();

    // With no cached evidence of a leave, everyone counts as active.
    assert!(backend.is_active("maria").await);

    let kept = backend
      .filter_active(vec!["maria".to_string(), "jose".to_string()])
      .await;
    assert_eq!(kept, vec!["maria".to_string(), "jose".to_string()]);
  }
}
