//! Notification worker: the service-worker half of the pipeline.
//!
//! Runs as its own task, standing in for a separate execution context: the
//! app and the worker share no state and talk only through channels carrying
//! a small fixed vocabulary of messages (`WorkerEvent` in, `AppMessage` out).

mod pipeline;
mod platform;
mod types;

pub use pipeline::{NotificationPipeline, WorkerLifecycle};
pub use platform::{InMemoryNotifications, NotificationCenter, SingleWindow, WindowClients};
pub use types::{
  AppMessage, ClickAction, ControlMessage, Notification, NotificationClick, NotificationData,
  PushPayload, WorkerEvent,
};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Run the pipeline until the event channel closes.
pub fn spawn<N, W>(
  mut events: mpsc::UnboundedReceiver<WorkerEvent>,
  app_tx: mpsc::UnboundedSender<AppMessage>,
  center: N,
  clients: W,
) -> JoinHandle<()>
where
  N: NotificationCenter + Send + 'static,
  W: WindowClients + Send + 'static,
{
  tokio::spawn(async move {
    let mut pipeline = NotificationPipeline::new(center, clients, app_tx);
    while let Some(event) = events.recv().await {
      pipeline.handle(event);
    }
  })
}
