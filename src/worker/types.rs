use serde::Deserialize;
use serde_json::Value;

/// Push payload as delivered by the push provider.
///
/// Every field is optional on the wire; the pipeline substitutes defaults at
/// the boundary instead of trusting absence to mean anything.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PushPayload {
  pub title: Option<String>,
  pub body: Option<String>,
  pub url: Option<String>,
  #[serde(rename = "notificationId")]
  pub notification_id: Option<String>,
  #[serde(rename = "type")]
  pub kind: Option<String>,
  pub metadata: Option<Value>,
  pub image: Option<String>,
}

/// Data carried on a displayed notification for retrieval at click time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationData {
  pub url: Option<String>,
  pub notification_id: Option<String>,
  pub kind: String,
  pub metadata: Option<Value>,
}

/// Display options handed to the platform notification surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
  pub title: String,
  pub body: String,
  pub icon: String,
  pub badge: String,
  pub vibrate: Vec<u32>,
  /// Notifications with the same tag replace each other instead of stacking.
  pub tag: String,
  /// When set, the notification stays on screen until the user acts on it.
  pub require_interaction: bool,
  pub image: Option<String>,
  pub data: NotificationData,
}

/// The action attached to a notification click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
  /// Plain click on the notification body.
  Default,
  Open,
  Dismiss,
}

/// A click on a displayed notification.
#[derive(Debug, Clone)]
pub struct NotificationClick {
  pub tag: String,
  pub action: ClickAction,
  pub data: NotificationData,
}

/// Everything the worker can receive.
#[derive(Debug)]
pub enum WorkerEvent {
  /// Raw push body from the push provider. May be absent or malformed;
  /// display must still happen.
  Push(Option<String>),
  Click(NotificationClick),
  Control(ControlMessage),
}

/// Control messages from the app context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
  /// Activate the new worker version immediately instead of waiting for old
  /// clients to close. Sent during version upgrades.
  SkipWaiting,
}

/// Messages from the worker back to the app context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMessage {
  /// Ask the focused app window to navigate in-app.
  Navigate { url: String },
}
