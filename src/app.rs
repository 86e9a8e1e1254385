use crate::backend::{BackendClient, CachedBackend, ChangeFeed};
use crate::config::Config;
use crate::connectivity::{ConnectivityMonitor, StaleBanner};
use crate::db::Database;
use crate::event::{Event, EventHandler};
use crate::scheduler::DispatchScheduler;
use crate::seasonal;
use crate::ui;
use crate::unread::UnreadCounter;
use crate::worker::{self, AppMessage, InMemoryNotifications, SingleWindow, WorkerEvent};
use chrono::{Datelike, Utc};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Main application state.
///
/// Owns the notification core (roster cache, connectivity monitor, unread
/// counter, dispatch scheduler, worker task) and bridges their outputs onto
/// a single event bus for the UI loop.
pub struct App {
  /// Header title (config override or the backend host)
  title: String,

  /// Backend with the roster TTL cache in front
  backend: CachedBackend,

  /// Owner of the online/offline signal
  monitor: ConnectivityMonitor,

  /// Notification-table change fan-out; the realtime transport publishes here
  changes: ChangeFeed,

  unread: UnreadCounter,
  scheduler: DispatchScheduler,

  /// Inbound channel of the worker task; the push transport feeds it
  worker_tx: mpsc::UnboundedSender<WorkerEvent>,
  worker_task: JoinHandle<()>,
  app_rx: Option<mpsc::UnboundedReceiver<AppMessage>>,

  db: Database,

  /// Current in-app route, driven by worker Navigate messages
  route: String,
  unread_count: u64,
  online: bool,
  refreshing_roster: bool,
  data_stale: bool,
  overlay_visible: bool,
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let client = BackendClient::new(&config)?;
    let db = Database::open()?;
    let monitor = ConnectivityMonitor::new(true);
    let changes = ChangeFeed::new();

    let count_client = client.clone();
    let unread = UnreadCounter::spawn(
      move || {
        let client = count_client.clone();
        async move { client.count_unread().await }
      },
      changes.subscribe(),
    );

    let dispatch_client = client.clone();
    let scheduler = DispatchScheduler::spawn(
      Duration::from_secs(config.scheduler_tick_secs),
      move || {
        let client = dispatch_client.clone();
        async move { client.dispatch_scheduled().await }
      },
    );

    let (worker_tx, worker_rx) = mpsc::unbounded_channel();
    let (app_tx, app_rx) = mpsc::unbounded_channel();
    let worker_task = worker::spawn(worker_rx, app_tx, InMemoryNotifications::new(), SingleWindow);

    let title = config.title.clone().unwrap_or_else(|| {
      url::Url::parse(&config.backend.url)
        .ok()
        .and_then(|u| u.host_str().map(String::from))
        .unwrap_or_else(|| "selah".to_string())
    });

    let now = Utc::now();
    let overlay_visible = now.month() == 12 && !seasonal::already_shown(&db, now.year())?;

    let online = monitor.is_online();
    let unread_count = unread.current();
    let backend = CachedBackend::new(client, Duration::from_secs(config.roster_ttl_secs));

    Ok(Self {
      title,
      backend,
      monitor,
      changes,
      unread,
      scheduler,
      worker_tx,
      worker_task,
      app_rx: Some(app_rx),
      db,
      route: "/".to_string(),
      unread_count,
      online,
      refreshing_roster: false,
      data_stale: false,
      overlay_visible,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create event handler and bridge component outputs onto the bus
    let mut events = EventHandler::new(Duration::from_millis(250));
    self.spawn_bridges(&events);

    // Warm the roster cache so the first membership check is served locally
    self.backend.excluded_members().await;

    // Main loop
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      if let Some(event) = events.next().await {
        self.handle_event(event).await?;
      }
    }

    // Scoped teardown: nothing fires against a torn-down app
    self.unread.shutdown();
    self.scheduler.shutdown();
    self.worker_task.abort();

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  fn spawn_bridges(&mut self, events: &EventHandler) {
    // Unread badge
    let tx = events.sender();
    let mut unread_rx = self.unread.watch();
    tokio::spawn(async move {
      while unread_rx.changed().await.is_ok() {
        let count = *unread_rx.borrow_and_update();
        if tx.send(Event::UnreadChanged(count)).is_err() {
          break;
        }
      }
    });

    // Connectivity
    let tx = events.sender();
    let mut online_rx = self.monitor.subscribe();
    tokio::spawn(async move {
      while online_rx.changed().await.is_ok() {
        let online = *online_rx.borrow_and_update();
        if tx.send(Event::ConnectivityChanged(online)).is_err() {
          break;
        }
      }
    });

    // Worker-to-app messages
    if let Some(mut app_rx) = self.app_rx.take() {
      let tx = events.sender();
      tokio::spawn(async move {
        while let Some(message) = app_rx.recv().await {
          let AppMessage::Navigate { url } = message;
          if tx.send(Event::Navigate(url)).is_err() {
            break;
          }
        }
      });
    }
  }

  async fn handle_event(&mut self, event: Event) -> Result<()> {
    match event {
      Event::Key(key) => self.handle_key(key).await?,
      Event::Tick => {}
      Event::UnreadChanged(count) => self.unread_count = count,
      Event::ConnectivityChanged(online) => {
        self.online = online;
        if online {
          // Whatever is on screen may predate the outage
          self.data_stale = true;
        }
      }
      Event::Navigate(url) => self.route = url,
    }
    Ok(())
  }

  async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
    if self.overlay_visible && matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
      self.overlay_visible = false;
      seasonal::mark_shown(&self.db, Utc::now().year())?;
      return Ok(());
    }

    match key.code {
      KeyCode::Char('q') => self.should_quit = true,
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }
      KeyCode::Char('r') => {
        // Refresh is only usable while online; the banner hides it otherwise
        if self.online {
          self.refreshing_roster = true;
          self.backend.clear_roster();
          self.backend.excluded_members().await;
          self.refreshing_roster = false;
          self.data_stale = false;
        }
      }
      _ => {}
    }
    Ok(())
  }

  // Accessors for the draw functions

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn route(&self) -> &str {
    &self.route
  }

  pub fn unread_count(&self) -> u64 {
    self.unread_count
  }

  pub fn is_online(&self) -> bool {
    self.online
  }

  pub fn overlay_visible(&self) -> bool {
    self.overlay_visible
  }

  pub fn banner(&self) -> StaleBanner {
    StaleBanner::derive(self.online, self.data_stale, true, self.refreshing_roster)
  }

  // Attach points for the external transports. The realtime and push
  // transports and the platform reachability events are outside collaborators
  // that publish into these handles.

  pub fn change_feed(&self) -> ChangeFeed {
    self.changes.clone()
  }

  pub fn push_events(&self) -> mpsc::UnboundedSender<WorkerEvent> {
    self.worker_tx.clone()
  }

  pub fn connectivity(&self) -> &ConnectivityMonitor {
    &self.monitor
  }
}
