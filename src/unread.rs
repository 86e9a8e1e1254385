//! Live unread-notification counter.

use std::future::Future;
use std::pin::Pin;

use color_eyre::Result;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::backend::ChangeEvent;

type CountFuture = Pin<Box<dyn Future<Output = Result<u64>> + Send>>;
type CountFn = Box<dyn Fn() -> CountFuture + Send + Sync>;

/// Maintains a live count of unread notifications.
///
/// The count is recomputed from the backend on every change event rather than
/// adjusted incrementally, so missed or reordered events cannot make it
/// drift. Events are handled in arrival order, one query at a time; the
/// published value is whatever the most recently completed query returned. A
/// burst of change events causes a burst of full recomputations (no debounce,
/// see DESIGN.md).
pub struct UnreadCounter {
  rx: watch::Receiver<u64>,
  task: JoinHandle<()>,
}

impl UnreadCounter {
  /// Run an initial count, then recompute on every event from `changes`.
  ///
  /// A count-query error is logged and the previous value kept (0 if the
  /// initial query is the one that failed).
  pub fn spawn<F, Fut>(count_fn: F, mut changes: broadcast::Receiver<ChangeEvent>) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<u64>> + Send + 'static,
  {
    let (tx, rx) = watch::channel(0u64);
    let count_fn: CountFn = Box::new(move || Box::pin(count_fn()));

    let task = tokio::spawn(async move {
      recompute(&count_fn, &tx).await;

      loop {
        match changes.recv().await {
          Ok(_) => recompute(&count_fn, &tx).await,
          // A lagged receiver dropped events, but recomputing reads the
          // source of truth so nothing is actually missed.
          Err(broadcast::error::RecvError::Lagged(_)) => recompute(&count_fn, &tx).await,
          Err(broadcast::error::RecvError::Closed) => break,
        }
      }
    });

    Self { rx, task }
  }

  /// Read-only view of the current count.
  pub fn watch(&self) -> watch::Receiver<u64> {
    self.rx.clone()
  }

  pub fn current(&self) -> u64 {
    *self.rx.borrow()
  }

  /// Stop listening. No recomputation happens after this returns.
  pub fn shutdown(&self) {
    self.task.abort();
  }
}

impl Drop for UnreadCounter {
  fn drop(&mut self) {
    self.task.abort();
  }
}

async fn recompute(count_fn: &CountFn, tx: &watch::Sender<u64>) {
  match count_fn().await {
    Ok(count) => {
      tx.send_replace(count);
    }
    Err(e) => warn!("Failed to refresh unread count, keeping previous value: {e}"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::backend::ChangeFeed;
  use color_eyre::eyre::eyre;
  use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  #[tokio::test]
  async fn publishes_initial_count() {
    let feed = ChangeFeed::new();
    let counter = UnreadCounter::spawn(|| async { Ok(3) }, feed.subscribe());

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(counter.current(), 3);
  }

  #[tokio::test]
  async fn recomputes_on_every_change_event() {
    let feed = ChangeFeed::new();
    let source = Arc::new(AtomicU64::new(1));
    let queries = Arc::new(AtomicU32::new(0));

    let s = Arc::clone(&source);
    let q = Arc::clone(&queries);
    let counter = UnreadCounter::spawn(
      move || {
        let s = Arc::clone(&s);
        let q = Arc::clone(&q);
        async move {
          q.fetch_add(1, Ordering::SeqCst);
          Ok(s.load(Ordering::SeqCst))
        }
      },
      feed.subscribe(),
    );

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(counter.current(), 1);

    source.store(4, Ordering::SeqCst);
    feed.publish(ChangeEvent::Insert);
    feed.publish(ChangeEvent::Update);
    feed.publish(ChangeEvent::Delete);

    tokio::time::sleep(Duration::from_millis(10)).await;

    // After the burst settles the count matches a fresh query of the source,
    // and every event triggered a full recomputation.
    assert_eq!(counter.current(), 4);
    assert_eq!(queries.load(Ordering::SeqCst), 4);
  }

  #[tokio::test]
  async fn query_error_keeps_previous_value() {
    let feed = ChangeFeed::new();
    let fail = Arc::new(AtomicBool::new(false));

    let f = Arc::clone(&fail);
    let counter = UnreadCounter::spawn(
      move || {
        let f = Arc::clone(&f);
        async move {
          if f.load(Ordering::SeqCst) {
            Err(eyre!("backend unreachable"))
          } else {
            Ok(7)
          }
        }
      },
      feed.subscribe(),
    );

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(counter.current(), 7);

    fail.store(true, Ordering::SeqCst);
    feed.publish(ChangeEvent::Insert);
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(counter.current(), 7);
  }

  #[tokio::test]
  async fn shutdown_stops_recomputation() {
    let feed = ChangeFeed::new();
    let queries = Arc::new(AtomicU32::new(0));

    let q = Arc::clone(&queries);
    let counter = UnreadCounter::spawn(
      move || {
        let q = Arc::clone(&q);
        async move {
          q.fetch_add(1, Ordering::SeqCst);
          Ok(0)
        }
      },
      feed.subscribe(),
    );

    tokio::time::sleep(Duration::from_millis(10)).await;
    counter.shutdown();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let before = queries.load(Ordering::SeqCst);
    feed.publish(ChangeEvent::Insert);
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(queries.load(Ordering::SeqCst), before);
  }
}
