//! Interactive terminal dashboard.
//!
//! One task owns the [`App`] and multiplexes animation frames, the two poll
//! timers and the event channel with `tokio::select!`. Terminal input is read
//! on a dedicated thread that stops when its [`StopSignal`] fires.

mod app;
mod ui;

pub use app::{App, AppEvent, InputMode, WatchOptions};

use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::api::{HttpApi, SatelliteApi};
use crate::config::Config;
use crate::error::Result;

/// How long the input thread waits for an event before checking its stop signal.
const INPUT_POLL: Duration = Duration::from_millis(100);

/// A shared flag asking a worker to stop.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stop: Arc<AtomicBool>,
}

impl StopSignal {
    /// Create a signal that has not fired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the worker to stop.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Check whether the signal has fired.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// Raw-mode alternate screen with mouse capture, restored on drop.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let mut session = Self {
            terminal: Terminal::new(CrosstermBackend::new(stdout))?,
        };
        session.terminal.clear()?;
        Ok(session)
    }

    fn draw(&mut self, app: &mut App) -> Result<()> {
        self.terminal.draw(|frame| ui::draw(frame, app))?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = self.terminal.show_cursor();
    }
}

fn spawn_input_thread(
    tx: UnboundedSender<AppEvent>,
    stop: StopSignal,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("satdash-input".to_string())
        .spawn(move || {
            while !stop.should_stop() {
                let event = match event::poll(INPUT_POLL) {
                    Ok(true) => event::read(),
                    Ok(false) => continue,
                    Err(e) => Err(e),
                };
                match event {
                    Ok(event) => {
                        if tx.send(AppEvent::Input(event)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to read terminal input");
                        let _ = tx.send(AppEvent::InputClosed);
                        break;
                    }
                }
            }
            debug!("Input thread stopped");
        })
}

/// Run the dashboard until the user quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up or drawn to. Network
/// failures are shown in the status bar and never end the session.
pub async fn run(config: &Config, api: HttpApi, options: WatchOptions) -> Result<()> {
    let client = api.client().clone();
    let api: Arc<dyn SatelliteApi> = Arc::new(api);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new(api, config, tx.clone(), options);

    let mut session = TerminalSession::enter()?;
    let stop = StopSignal::new();
    let input = spawn_input_thread(tx, stop.clone())?;
    info!("Dashboard started");

    app.load_atlas(client, config.globe.atlas_url.clone());
    app.fetch_satellites();

    let mut frames = interval(config.frame_interval());
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut metadata = interval_at(
        Instant::now() + config.satellites_interval(),
        config.satellites_interval(),
    );
    let mut positions = interval_at(
        Instant::now() + config.positions_interval(),
        config.positions_interval(),
    );

    let result = loop {
        if let Err(e) = session.draw(&mut app) {
            break Err(e);
        }
        tokio::select! {
            _ = frames.tick() => app.on_frame(),
            _ = metadata.tick() => app.fetch_satellites(),
            _ = positions.tick() => app.update_positions(),
            event = rx.recv() => match event {
                Some(event) => app.handle(event),
                None => break Ok(()),
            },
        }
        if app.should_quit() {
            break Ok(());
        }
    };

    app.shutdown();
    stop.stop();
    drop(session);
    if input.join().is_err() {
        warn!("Input thread panicked");
    }
    info!("Dashboard stopped");
    result
}
