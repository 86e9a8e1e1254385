//! Push display and click routing.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::platform::{NotificationCenter, WindowClients};
use super::types::{
  AppMessage, ClickAction, ControlMessage, Notification, NotificationClick, NotificationData,
  PushPayload, WorkerEvent,
};

/// Notification types that must stay on screen until the user acts.
const HIGH_PRIORITY_TYPES: [&str; 3] = ["birthday", "blood_donation", "extraordinary_rehearsal"];

const DEFAULT_TITLE: &str = "Selah";
const DEFAULT_BODY: &str = "Tienes una nueva notificación";
const DEFAULT_URL: &str = "/";
const ICON: &str = "/icons/icon-192.png";
const BADGE: &str = "/icons/badge-72.png";
const VIBRATE: [u32; 3] = [200, 100, 200];

/// Worker lifecycle, as far as version upgrades care about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerLifecycle {
  /// Installed but waiting for old clients to close.
  Waiting,
  Active,
}

/// Handles the worker-context side of notification delivery: push payloads
/// in, displayed notifications and navigation messages out.
pub struct NotificationPipeline<N, W> {
  center: N,
  clients: W,
  app_tx: mpsc::UnboundedSender<AppMessage>,
  lifecycle: WorkerLifecycle,
}

impl<N: NotificationCenter, W: WindowClients> NotificationPipeline<N, W> {
  /// A fresh worker version starts out waiting; the app's skip-waiting
  /// control promotes it immediately.
  pub fn new(center: N, clients: W, app_tx: mpsc::UnboundedSender<AppMessage>) -> Self {
    Self {
      center,
      clients,
      app_tx,
      lifecycle: WorkerLifecycle::Waiting,
    }
  }

  pub fn handle(&mut self, event: WorkerEvent) {
    match event {
      WorkerEvent::Push(raw) => self.on_push(raw.as_deref()),
      WorkerEvent::Click(click) => self.on_click(click),
      WorkerEvent::Control(message) => self.on_control(message),
    }
  }

  pub fn lifecycle(&self) -> WorkerLifecycle {
    self.lifecycle
  }

  pub fn notifications(&self) -> &N {
    &self.center
  }

  /// Build and display a notification from a raw push body. The handler's
  /// lifetime is bounded by the display call; it never fails on bad input.
  fn on_push(&mut self, raw: Option<&str>) {
    let payload = parse_payload(raw);
    self.center.show(build_notification(payload));
  }

  fn on_click(&mut self, click: NotificationClick) {
    // The notification is dismissed no matter which action fired.
    self.center.close(&click.tag);

    match click.action {
      ClickAction::Dismiss => {}
      ClickAction::Default | ClickAction::Open => {
        let url = click.data.url.unwrap_or_else(|| DEFAULT_URL.to_string());
        if self.clients.focus_same_origin() {
          // The app window handles the navigation in-app.
          let _ = self.app_tx.send(AppMessage::Navigate { url });
        } else if !self.clients.open_window(&url) {
          debug!("No window to focus and opening is unavailable, dropping click");
        }
      }
    }
  }

  fn on_control(&mut self, message: ControlMessage) {
    match message {
      ControlMessage::SkipWaiting => {
        if self.lifecycle == WorkerLifecycle::Waiting {
          debug!("Activating immediately on app request");
          self.lifecycle = WorkerLifecycle::Active;
        }
      }
    }
  }
}

/// Parse the raw push body, substituting an empty payload when the provider
/// sends something unparsable.
fn parse_payload(raw: Option<&str>) -> PushPayload {
  match raw {
    Some(text) => serde_json::from_str(text).unwrap_or_else(|e| {
      warn!("Unparsable push payload, showing generic notification: {e}");
      PushPayload::default()
    }),
    None => PushPayload::default(),
  }
}

/// Map a payload onto display options.
fn build_notification(payload: PushPayload) -> Notification {
  let kind = payload.kind.unwrap_or_else(|| "general".to_string());

  Notification {
    title: payload.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
    body: payload.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
    icon: ICON.to_string(),
    badge: BADGE.to_string(),
    vibrate: VIBRATE.to_vec(),
    require_interaction: HIGH_PRIORITY_TYPES.contains(&kind.as_str()),
    image: payload.image,
    data: NotificationData {
      url: payload.url,
      notification_id: payload.notification_id,
      kind: kind.clone(),
      metadata: payload.metadata,
    },
    tag: kind,
  }
}
