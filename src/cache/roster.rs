//! TTL cache of members currently excluded by an approved leave.

use std::collections::HashSet;
use std::future::Future;

use color_eyre::Result;
use tokio::time::{Duration, Instant};
use tracing::warn;

use crate::backend::LeaveRecord;

/// Default freshness window. The staleness it allows is an explicit tradeoff
/// against hitting the backend on every membership check.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// In-memory exclusion set with a freshness window.
///
/// The set holds the ids of members currently on approved leave. While the
/// cached copy is fresh, lookups are served from memory; once the window
/// lapses the next call refetches. The expired contents are kept around
/// rather than discarded so a failed refetch can fall back to them.
pub struct RosterCache {
  excluded: HashSet<String>,
  last_fetch: Option<Instant>,
  ttl: Duration,
}

impl RosterCache {
  pub fn new() -> Self {
    Self {
      excluded: HashSet::new(),
      last_fetch: None,
      ttl: DEFAULT_TTL,
    }
  }

  /// Set the freshness window.
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  fn is_fresh(&self) -> bool {
    self
      .last_fetch
      .map(|t| t.elapsed() < self.ttl)
      .unwrap_or(false)
  }

  /// Current exclusion set, refetching through `fetcher` when the cached
  /// copy has lapsed (or was never filled).
  ///
  /// Never fails: a fetch error is logged and the previous contents are
  /// served unchanged. With nothing ever fetched that means an empty set,
  /// which reads as "everyone active" - the safe default for a filter that
  /// excludes only on evidence of inactivity.
  pub async fn excluded_members<F, Fut>(&mut self, fetcher: F) -> HashSet<String>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<LeaveRecord>>>,
  {
    if self.is_fresh() {
      return self.excluded.clone();
    }

    match fetcher().await {
      Ok(records) => {
        // Replace wholesale; partial merges could resurrect ended leaves.
        self.excluded = records.into_iter().map(|r| r.member_id).collect();
        self.last_fetch = Some(Instant::now());
      }
      Err(e) => {
        warn!("Failed to refresh leave exclusions, serving stale set: {e}");
      }
    }

    self.excluded.clone()
  }

  /// Drop the cached set and force the next call to refetch.
  pub fn clear(&mut self) {
    self.excluded.clear();
    self.last_fetch = None;
  }
}

impl Default for RosterCache {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use color_eyre::eyre::eyre;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;

  fn leave(ids: &[&str]) -> Vec<LeaveRecord> {
    ids
      .iter()
      .map(|id| LeaveRecord {
        member_id: id.to_string(),
      })
      .collect()
  }

  #[tokio::test(start_paused = true)]
  async fn fresh_cache_serves_without_fetching() {
    let mut cache = RosterCache::new();
    let fetches = Arc::new(AtomicU32::new(0));

    let f = Arc::clone(&fetches);
    let set = cache
      .excluded_members(move || async move {
        f.fetch_add(1, Ordering::SeqCst);
        Ok(leave(&["a", "b"]))
      })
      .await;
    assert_eq!(set.len(), 2);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    // 200s into a 300s window: still fresh, fetcher must not run.
    tokio::time::advance(Duration::from_millis(200_000)).await;

    let f = Arc::clone(&fetches);
    let set = cache
      .excluded_members(move || async move {
        f.fetch_add(1, Ordering::SeqCst);
        Ok(leave(&["c"]))
      })
      .await;
    assert!(set.contains("a") && set.contains("b"));
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn lapsed_cache_refetches_and_replaces() {
    let mut cache = RosterCache::new();

    let set = cache
      .excluded_members(|| async { Ok(leave(&["a", "b"])) })
      .await;
    assert_eq!(set.len(), 2);

    tokio::time::advance(Duration::from_millis(300_001)).await;

    let set = cache.excluded_members(|| async { Ok(leave(&["c"])) }).await;
    assert_eq!(set.len(), 1);
    assert!(set.contains("c"));
  }

  #[tokio::test(start_paused = true)]
  async fn failed_refetch_serves_stale_contents() {
    let mut cache = RosterCache::new();

    cache
      .excluded_members(|| async { Ok(leave(&["a"])) })
      .await;

    tokio::time::advance(Duration::from_secs(301)).await;

    let set = cache
      .excluded_members(|| async { Err(eyre!("backend unreachable")) })
      .await;
    assert!(set.contains("a"));
    assert_eq!(set.len(), 1);
  }

  #[tokio::test]
  async fn failed_fetch_on_empty_cache_returns_empty_set() {
    let mut cache = RosterCache::new();

    let set = cache
      .excluded_members(|| async { Err(eyre!("backend unreachable")) })
      .await;
    assert!(set.is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn clear_forces_refetch() {
    let mut cache = RosterCache::new();
    let fetches = Arc::new(AtomicU32::new(0));

    let f = Arc::clone(&fetches);
    cache
      .excluded_members(move || async move {
        f.fetch_add(1, Ordering::SeqCst);
        Ok(leave(&["a"]))
      })
      .await;

    cache.clear();

    let f = Arc::clone(&fetches);
    let set = cache
      .excluded_members(move || async move {
        f.fetch_add(1, Ordering::SeqCst);
        Ok(leave(&["b"]))
      })
      .await;
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    assert!(set.contains("b"));
    assert!(!set.contains("a"));
  }
}
