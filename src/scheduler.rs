//! Minute-aligned dispatch scheduler.
//!
//! The backend has no cron facility, so the client stands in: a coarse timer
//! wakes every 15 seconds and asks the backend to dispatch any notifications
//! whose scheduled minute has arrived. The wake interval is deliberately
//! shorter than a minute so a boundary is never missed by more than one tick,
//! and a minute-key gate keeps the extra wakeups from double-dispatching.
//! Known limitation: a server-side schedule is the correct long-term
//! replacement; what must survive any replacement is the at-most-once-per-
//! minute contract and the tolerance for missed ticks.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use color_eyre::Result;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration};
use tracing::{debug, warn};

/// Default wake interval.
pub const DEFAULT_TICK: Duration = Duration::from_secs(15);

/// Deduplicates dispatches by calendar minute.
///
/// `admit` answers true at most once per distinct minute key, and records the
/// key before the caller awaits anything, so a second tick landing while a
/// dispatch is still in flight is rejected.
#[derive(Debug, Default)]
pub struct MinuteGate {
  last_key: Option<String>,
}

impl MinuteGate {
  pub fn new() -> Self {
    Self { last_key: None }
  }

  /// Key identifying the calendar minute of `now`, at UTC minute granularity.
  pub fn minute_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d-%H-%M").to_string()
  }

  /// Whether a dispatch should fire for `now`. Records the minute
  /// immediately when it answers true.
  pub fn admit(&mut self, now: DateTime<Utc>) -> bool {
    let key = Self::minute_key(now);
    if self.last_key.as_deref() == Some(key.as_str()) {
      return false;
    }
    self.last_key = Some(key);
    true
  }
}

type DispatchFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;
type DispatchFn = Box<dyn Fn() -> DispatchFuture + Send + Sync>;
type ClockFn = Box<dyn Fn() -> DateTime<Utc> + Send>;

/// Periodically invokes the remote dispatch operation, at most once per
/// calendar minute for the lifetime of the scheduler.
pub struct DispatchScheduler {
  task: JoinHandle<()>,
}

impl DispatchScheduler {
  /// Start the scheduler: one unconditional dispatch right away (cold-start;
  /// it may coincide with the first minute's gated dispatch, an accepted
  /// double fire), then gated dispatches driven by the wake timer.
  pub fn spawn<F, Fut>(tick: Duration, dispatch: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
  {
    Self::spawn_with_clock(tick, dispatch, Utc::now)
  }

  /// Same as `spawn`, with an injectable clock for the minute keys.
  pub fn spawn_with_clock<F, Fut, C>(tick: Duration, dispatch: F, clock: C) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
    C: Fn() -> DateTime<Utc> + Send + 'static,
  {
    let dispatch: DispatchFn = Box::new(move || Box::pin(dispatch()));
    let clock: ClockFn = Box::new(clock);

    let task = tokio::spawn(async move {
      let mut gate = MinuteGate::new();

      // Cold-start dispatch, regardless of gate state.
      fire(&dispatch).await;

      let mut timer = time::interval_at(time::Instant::now() + tick, tick);
      loop {
        timer.tick().await;
        let now = clock();
        if gate.admit(now) {
          debug!(minute = %MinuteGate::minute_key(now), "Dispatching scheduled notifications");
          fire(&dispatch).await;
        }
      }
    });

    Self { task }
  }

  /// Cancel the timer. No dispatch happens after this returns.
  pub fn shutdown(&self) {
    self.task.abort();
  }
}

impl Drop for DispatchScheduler {
  fn drop(&mut self) {
    self.task.abort();
  }
}

async fn fire(dispatch: &DispatchFn) {
  // Failures skip a cycle, they never stop the timer.
  if let Err(e) = dispatch().await {
    warn!("Dispatch of scheduled notifications failed, will retry next minute: {e}");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::{Arc, Mutex};

  fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, h, m, s).unwrap()
  }

  #[test]
  fn gate_admits_once_per_minute_key() {
    let mut gate = MinuteGate::new();

    // Ticks at 14:59:50, 15:00:05 and 15:00:20 span two minute keys.
    assert!(gate.admit(at(14, 59, 50)));
    assert!(gate.admit(at(15, 0, 5)));
    assert!(!gate.admit(at(15, 0, 20)));
  }

  #[test]
  fn gate_records_key_before_any_await() {
    let mut gate = MinuteGate::new();

    // Two ticks for the same minute with no dispatch completion in between:
    // the second must be rejected.
    assert!(gate.admit(at(10, 30, 0)));
    assert!(!gate.admit(at(10, 30, 14)));
  }

  #[test]
  fn minute_key_has_minute_granularity() {
    assert_eq!(
      MinuteGate::minute_key(at(15, 0, 5)),
      MinuteGate::minute_key(at(15, 0, 59))
    );
    assert_ne!(
      MinuteGate::minute_key(at(15, 0, 59)),
      MinuteGate::minute_key(at(15, 1, 0))
    );
  }

  #[tokio::test(start_paused = true)]
  async fn fires_once_at_startup_then_once_per_minute() {
    let dispatches = Arc::new(AtomicU32::new(0));
    let now = Arc::new(Mutex::new(at(14, 59, 50)));

    let d = Arc::clone(&dispatches);
    let clock = Arc::clone(&now);
    let scheduler = DispatchScheduler::spawn_with_clock(
      DEFAULT_TICK,
      move || {
        let d = Arc::clone(&d);
        async move {
          d.fetch_add(1, Ordering::SeqCst);
          Ok(())
        }
      },
      move || *clock.lock().unwrap(),
    );

    // Startup dispatch.
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(dispatches.load(Ordering::SeqCst), 1);

    // First wake: minute 14:59 admitted (the accepted startup double fire).
    tokio::time::advance(Duration::from_secs(15)).await;
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(dispatches.load(Ordering::SeqCst), 2);

    // Next wake in the same minute: gated.
    tokio::time::advance(Duration::from_secs(15)).await;
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(dispatches.load(Ordering::SeqCst), 2);

    // Wall clock crosses into 15:00: exactly one more dispatch.
    *now.lock().unwrap() = at(15, 0, 5);
    tokio::time::advance(Duration::from_secs(15)).await;
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(dispatches.load(Ordering::SeqCst), 3);

    *now.lock().unwrap() = at(15, 0, 20);
    tokio::time::advance(Duration::from_secs(15)).await;
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(dispatches.load(Ordering::SeqCst), 3);

    scheduler.shutdown();
  }

  #[tokio::test(start_paused = true)]
  async fn dispatch_failure_does_not_stop_the_timer() {
    let attempts = Arc::new(AtomicU32::new(0));
    let now = Arc::new(Mutex::new(at(9, 0, 0)));

    let a = Arc::clone(&attempts);
    let clock = Arc::clone(&now);
    let _scheduler = DispatchScheduler::spawn_with_clock(
      DEFAULT_TICK,
      move || {
        let a = Arc::clone(&a);
        async move {
          a.fetch_add(1, Ordering::SeqCst);
          Err(color_eyre::eyre::eyre!("function unavailable"))
        }
      },
      move || *clock.lock().unwrap(),
    );

    tokio::time::sleep(Duration::from_millis(1)).await;
    *now.lock().unwrap() = at(9, 1, 0);
    tokio::time::advance(Duration::from_secs(15)).await;
    tokio::time::sleep(Duration::from_millis(1)).await;

    *now.lock().unwrap() = at(9, 2, 0);
    tokio::time::advance(Duration::from_secs(15)).await;
    tokio::time::sleep(Duration::from_millis(1)).await;

    // Startup attempt plus one per crossed minute, despite every failure.
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
  }

  #[tokio::test(start_paused = true)]
  async fn shutdown_cancels_future_dispatches() {
    let dispatches = Arc::new(AtomicU32::new(0));
    let now = Arc::new(Mutex::new(at(12, 0, 0)));

    let d = Arc::clone(&dispatches);
    let clock = Arc::clone(&now);
    let scheduler = DispatchScheduler::spawn_with_clock(
      DEFAULT_TICK,
      move || {
        let d = Arc::clone(&d);
        async move {
          d.fetch_add(1, Ordering::SeqCst);
          Ok(())
        }
      },
      move || *clock.lock().unwrap(),
    );

    tokio::time::sleep(Duration::from_millis(1)).await;
    scheduler.shutdown();

    *now.lock().unwrap() = at(12, 1, 0);
    tokio::time::advance(Duration::from_secs(60)).await;
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert_eq!(dispatches.load(Ordering::SeqCst), 1);
  }
}
