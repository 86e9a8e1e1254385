use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::time::Duration;
use tokio::sync::mpsc;

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Periodic tick for UI refresh
  Tick,
  /// The unread badge count changed
  UnreadChanged(u64),
  /// Network reachability changed
  ConnectivityChanged(bool),
  /// The worker asked the app to navigate in-app
  Navigate(String),
}

/// Event handler that produces events from terminal input and a tick timer.
///
/// Background tasks get a sender via `sender()` and push their own events
/// onto the same bus.
pub struct EventHandler {
  tx: mpsc::UnboundedSender<Event>,
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // Spawn terminal event reader
    let input_tx = tx.clone();
    tokio::spawn(async move {
      loop {
        if event::poll(tick_rate).unwrap_or(false) {
          if let Ok(evt) = event::read() {
            if let CrosstermEvent::Key(key) = evt {
              if input_tx.send(Event::Key(key)).is_err() {
                break;
              }
            }
          }
        } else {
          // Tick
          if input_tx.send(Event::Tick).is_err() {
            break;
          }
        }
      }
    });

    Self { tx, rx }
  }

  /// Event sender for background tasks
  pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
    self.tx.clone()
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
