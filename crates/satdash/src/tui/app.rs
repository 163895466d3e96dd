//! Dashboard application state.
//!
//! [`App`] is owned by the event loop. Network requests run in spawned tasks
//! and report back as [`AppEvent`]s on the same channel as terminal input, so
//! the state itself is never shared.

use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use reqwest::Client;
use satdash_globe::{ScreenPoint, Viewport};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::SatelliteApi;
use crate::atlas::{self, Ring};
use crate::config::Config;
use crate::dashboard::{Dashboard, SortKey, Ticket};
use crate::error::Result;
use crate::globe::{Globe, GlobeOptions};
use crate::model::{Position, PositionBatch, SatelliteList, SatelliteQuery};
use crate::refresh::{RefreshControl, RefreshOutcome};

/// Braille dots per terminal cell, horizontally and vertically.
pub const DOTS_PER_CELL: (f64, f64) = (2.0, 4.0);

/// Everything the event loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    /// Terminal input.
    Input(Event),
    /// The input reader stopped.
    InputClosed,
    /// A satellite list request finished.
    Satellites(Ticket, Result<SatelliteList>),
    /// A position request finished.
    Positions(Ticket, Result<PositionBatch>),
    /// Positions accepted by the dashboard, to be drawn.
    Plot(Vec<Position>),
    /// The backend completed a refresh.
    RefreshCompleted,
    /// A refresh request settled; carries a status line.
    RefreshSettled(String),
    /// The world atlas finished loading.
    Land(Result<Vec<Ring>>),
}

/// What key presses do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Keys are commands.
    #[default]
    Normal,
    /// Keys edit the search text.
    Search,
}

/// Initial list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchOptions {
    /// Initial search text.
    pub search: String,
    /// Initial ordering.
    pub sort: SortKey,
}

#[derive(Debug, Default)]
struct Tasks {
    metadata: Option<JoinHandle<()>>,
    positions: Option<JoinHandle<()>>,
    refresh: Option<JoinHandle<()>>,
    atlas: Option<JoinHandle<()>>,
}

impl Tasks {
    fn abort_all(&mut self) {
        for handle in [
            self.metadata.take(),
            self.positions.take(),
            self.refresh.take(),
            self.atlas.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
    }
}

/// Store `handle` in `slot`, aborting a still-running predecessor.
fn supersede(slot: &mut Option<JoinHandle<()>>, handle: JoinHandle<()>, what: &str) {
    if let Some(previous) = slot.replace(handle) {
        if !previous.is_finished() {
            debug!(request = what, "Aborting superseded request");
            previous.abort();
        }
    }
}

/// Status line for a settled refresh.
fn describe(outcome: &RefreshOutcome) -> String {
    match outcome {
        RefreshOutcome::Ignored => "Refresh already in progress".to_string(),
        RefreshOutcome::Completed(status) => match status.count {
            Some(count) => format!("Refresh completed ({count} satellites)"),
            None => "Refresh completed".to_string(),
        },
        RefreshOutcome::NotCompleted(status) => match &status.message {
            Some(message) => format!("Refresh {}: {message}", status.status),
            None => format!("Refresh {}", status.status),
        },
        RefreshOutcome::Failed(e) => format!("Refresh failed: {e}"),
    }
}

/// The interactive dashboard.
#[derive(Debug)]
pub struct App {
    dashboard: Dashboard,
    globe: Globe,
    refresh: RefreshControl,
    tx: UnboundedSender<AppEvent>,
    tasks: Tasks,
    mode: InputMode,
    status: String,
    globe_area: Rect,
    last_frame: Instant,
    should_quit: bool,
}

impl App {
    /// Build the dashboard, globe and refresh control around `api`.
    ///
    /// Position batches and refresh completions are delivered back through `tx`.
    pub fn new(
        api: Arc<dyn SatelliteApi>,
        config: &Config,
        tx: UnboundedSender<AppEvent>,
        options: WatchOptions,
    ) -> Self {
        let sink = {
            let tx = tx.clone();
            move |positions: Vec<Position>| {
                let _ = tx.send(AppEvent::Plot(positions));
            }
        };
        let mut dashboard =
            Dashboard::new(Arc::clone(&api), sink, config.polling.position_batch_limit);
        dashboard.set_sort(options.sort);
        dashboard.set_search(options.search);

        let refresh = {
            let tx = tx.clone();
            RefreshControl::new(api, move || {
                let _ = tx.send(AppEvent::RefreshCompleted);
            })
        };

        Self {
            dashboard,
            globe: Globe::new(Viewport::new(160.0, 80.0), GlobeOptions::from(&config.globe)),
            refresh,
            tx,
            tasks: Tasks::default(),
            mode: InputMode::Normal,
            status: String::new(),
            globe_area: Rect::default(),
            last_frame: Instant::now(),
            should_quit: false,
        }
    }

    /// The satellite list.
    #[must_use]
    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// The globe view.
    #[must_use]
    pub fn globe(&self) -> &Globe {
        &self.globe
    }

    /// Check whether a refresh press would start a request.
    #[must_use]
    pub fn refresh_enabled(&self) -> bool {
        self.refresh.is_enabled()
    }

    /// Current input mode.
    #[must_use]
    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Last status message.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Check whether the user asked to leave.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Record where the globe is drawn, in terminal cells, and refit it.
    pub fn set_globe_area(&mut self, area: Rect) {
        if area == self.globe_area {
            return;
        }
        self.globe_area = area;
        if area.width > 0 && area.height > 0 {
            self.globe.resize(Viewport::new(
                f64::from(area.width) * DOTS_PER_CELL.0,
                f64::from(area.height) * DOTS_PER_CELL.1,
            ));
        }
    }

    /// Start a satellite list request, superseding any in flight.
    pub fn fetch_satellites(&mut self) {
        let ticket = self.dashboard.begin_fetch_satellites();
        let api = self.dashboard.api();
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let result = api.satellites(&SatelliteQuery::default()).await;
            let _ = tx.send(AppEvent::Satellites(ticket, result));
        });
        supersede(&mut self.tasks.metadata, handle, "satellites");
    }

    /// Start a position request for the head of the list, superseding any in flight.
    pub fn update_positions(&mut self) {
        let Some(request) = self.dashboard.begin_update_positions() else {
            return;
        };
        let api = self.dashboard.api();
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let result = api.positions(&request.norad_ids).await;
            let _ = tx.send(AppEvent::Positions(request.ticket, result));
        });
        supersede(&mut self.tasks.positions, handle, "positions");
    }

    /// Press the refresh control.
    pub fn press_refresh(&mut self) {
        let pending = self
            .tasks
            .refresh
            .as_ref()
            .is_some_and(|handle| !handle.is_finished());
        if pending || !self.refresh.is_enabled() {
            self.status = describe(&RefreshOutcome::Ignored);
            return;
        }
        self.status = "Refreshing...".to_string();
        let control = self.refresh.clone();
        let tx = self.tx.clone();
        self.tasks.refresh = Some(tokio::spawn(async move {
            let outcome = control.press().await;
            let _ = tx.send(AppEvent::RefreshSettled(describe(&outcome)));
        }));
    }

    /// Start loading the world atlas.
    pub fn load_atlas(&mut self, client: Client, url: String) {
        let tx = self.tx.clone();
        self.tasks.atlas = Some(tokio::spawn(async move {
            let result = atlas::fetch_land(&client, &url).await;
            let _ = tx.send(AppEvent::Land(result));
        }));
    }

    /// Advance the globe animation.
    pub fn on_frame(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.globe.advance(elapsed.as_secs_f64() * 1000.0);
    }

    /// React to one event.
    pub fn handle(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(Event::Key(key)) => self.handle_key(key),
            AppEvent::Input(Event::Mouse(mouse)) => self.handle_mouse(mouse),
            AppEvent::Input(_) => {}
            AppEvent::InputClosed => self.should_quit = true,
            AppEvent::Satellites(ticket, result) => {
                let failure = result.as_ref().err().map(ToString::to_string);
                if self.dashboard.apply_satellites(ticket, result) {
                    self.update_positions();
                } else if let Some(message) = failure {
                    self.status = format!("Failed to fetch satellites: {message}");
                }
            }
            AppEvent::Positions(ticket, result) => {
                let failure = result.as_ref().err().map(ToString::to_string);
                if !self.dashboard.apply_positions(ticket, result) {
                    if let Some(message) = failure {
                        self.status = format!("Failed to fetch positions: {message}");
                    }
                }
            }
            AppEvent::Plot(positions) => {
                self.globe.update_satellites(positions);
            }
            AppEvent::RefreshCompleted => self.fetch_satellites(),
            AppEvent::RefreshSettled(message) => self.status = message,
            AppEvent::Land(Ok(rings)) => self.globe.set_land(rings),
            AppEvent::Land(Err(e)) => {
                warn!(error = %e, "Failed to load world atlas");
                self.status = format!("World map unavailable: {e}");
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match self.mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                KeyCode::Char('r') => self.press_refresh(),
                KeyCode::Char('/') => self.mode = InputMode::Search,
                KeyCode::Char('s') => {
                    let next = self.dashboard.sort().next();
                    self.dashboard.set_sort(next);
                }
                KeyCode::Char('g') => {
                    let show = !self.globe.options().show_graticule;
                    self.globe.set_show_graticule(show);
                }
                _ => {}
            },
            InputMode::Search => match key.code {
                KeyCode::Esc => {
                    self.dashboard.set_search("");
                    self.mode = InputMode::Normal;
                }
                KeyCode::Enter => self.mode = InputMode::Normal,
                KeyCode::Backspace => {
                    let mut search = self.dashboard.search().to_string();
                    search.pop();
                    self.dashboard.set_search(search);
                }
                KeyCode::Char(c) => {
                    let mut search = self.dashboard.search().to_string();
                    search.push(c);
                    self.dashboard.set_search(search);
                }
                _ => {}
            },
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let at = self.globe_point(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left)
                if self.in_globe_area(mouse.column, mouse.row) =>
            {
                self.globe.pointer_down(at);
            }
            MouseEventKind::Drag(MouseButton::Left) => self.globe.pointer_move(at),
            MouseEventKind::Up(MouseButton::Left) => self.globe.pointer_up(),
            _ => {}
        }
    }

    fn in_globe_area(&self, column: u16, row: u16) -> bool {
        let area = self.globe_area;
        column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
    }

    /// Centre of a terminal cell in globe dot coordinates.
    fn globe_point(&self, column: u16, row: u16) -> ScreenPoint {
        let dx = f64::from(column) - f64::from(self.globe_area.x);
        let dy = f64::from(row) - f64::from(self.globe_area.y);
        ScreenPoint::new(
            (dx + 0.5) * DOTS_PER_CELL.0,
            (dy + 0.5) * DOTS_PER_CELL.1,
        )
    }

    /// Abort every in-flight request.
    pub fn shutdown(&mut self) {
        self.tasks.abort_all();
    }
}
