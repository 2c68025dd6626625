mod event_loop;

use crate::components::{Footer, Header, Pen, StatsPanel, Tablet, scroll_offset};
use crate::event_handler::{EventHandler, KeyAction};
use crate::layout::TuiLayout;
use crate::probe::TerminalProbe;
use crate::state::AppState;
use crate::theme::Theme;

use crossterm::event::Event;
use quill_core::runtime;
use quill_core::{Config, EngineEvent, EngineHandle, FeedEvent, IncomingMessage, InkColors, Phase};
use ratatui::{Frame, widgets::Block};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Main TUI application
///
/// Owns the engine task, the feed receiver and the renderer state.
pub struct App {
    state: AppState,
    engine: EngineHandle,
    engine_events: mpsc::UnboundedReceiver<EngineEvent>,
    feed: Option<mpsc::UnboundedReceiver<FeedEvent>>,
    probe: TerminalProbe,
    frame_interval: Duration,
    cancel: CancellationToken,
}

impl App {
    /// Create the application and spawn its engine on the current runtime
    pub fn new(config: &Config, feed: Option<mpsc::UnboundedReceiver<FeedEvent>>, cancel: CancellationToken) -> Self {
        let probe = TerminalProbe::new();
        let task = runtime::spawn(config, probe.clone(), cancel.child_token());

        Self {
            state: AppState::new(config, feed.is_some()),
            engine: task.handle,
            engine_events: task.events,
            feed,
            probe,
            frame_interval: Duration::from_millis(config.display.frame_interval_ms),
            cancel,
        }
    }

    /// Get a reference to the application state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a mutable reference to the application state
    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn should_exit(&self) -> bool {
        self.state.should_exit
    }

    /// Run the TUI until the user quits
    pub async fn run(&mut self) -> std::io::Result<()> {
        event_loop::run(self).await
    }

    /// Handle one terminal event
    pub fn handle_event(&mut self, event: &Event) {
        if let Some(action) = EventHandler::handle_event(event) {
            self.handle_key_action(action);
        }
    }

    pub fn handle_key_action(&mut self, action: KeyAction) {
        tracing::debug!(?action, "key action");
        let sent = match action {
            KeyAction::Quit => {
                self.state.should_exit = true;
                return;
            }
            KeyAction::InjectDebug => self.engine.enqueue(IncomingMessage::debug_probe()),
            KeyAction::ClearPage => self.engine.clear_page(),
            KeyAction::Interrupt => self.engine.interrupt(),
        };

        if let Err(e) = sent {
            tracing::warn!(error = %e, "engine rejected command");
            self.state.should_exit = true;
        }
    }

    /// Apply an event published by the engine
    pub fn handle_engine_event(&mut self, event: EngineEvent, now: Instant) {
        match event {
            EngineEvent::Pose { pose } => self.state.pen.retarget(&pose, now),
            EngineEvent::PhaseChanged { phase: Phase::Clearing } => self.state.clearing_since = Some(now),
            EngineEvent::PhaseChanged { .. } => self.state.clearing_since = None,
            EngineEvent::LineCompleted { .. } => self.state.lines_written += 1,
            _ => {}
        }
    }

    /// Apply every engine event already waiting, returning how many there were
    pub fn pump_engine_events(&mut self, now: Instant) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.engine_events.try_recv() {
            self.handle_engine_event(event, now);
            handled += 1;
        }
        handled
    }

    /// Apply one feed record
    pub fn handle_feed_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::NewMessage(message) => {
                if let Err(e) = self.engine.enqueue(message) {
                    tracing::warn!(error = %e, "message not delivered");
                }
            }
            FeedEvent::StatsUpdate(stats) => self.state.stats = stats,
            FeedEvent::Status { connected } => self.state.connected = connected,
            FeedEvent::Ink { wet, dry } => {
                if let Err(e) = self.engine.set_ink(InkColors::new(wet, dry)) {
                    tracing::warn!(error = %e, "ink not delivered");
                }
            }
        }
    }

    /// The feed source ended
    pub fn feed_closed(&mut self) {
        tracing::info!("feed closed");
        self.feed = None;
        self.state.connected = false;
    }

    /// Draw one frame
    pub fn render(&mut self, frame: &mut Frame<'_>) {
        self.render_at(frame, Instant::now());
    }

    /// Draw one frame as of `now`
    pub fn render_at(&mut self, frame: &mut Frame<'_>, now: Instant) {
        let area = frame.area();
        let layout = TuiLayout::calculate(area);
        let view = self.engine.view();
        let pitch = self.state.line_pitch();
        let scroll = scroll_offset(&view, pitch, layout.screen.height);

        if self.probe.update(layout.screen, pitch, scroll)
            && let Err(e) = self.engine.relayout()
        {
            tracing::warn!(error = %e, "relayout not delivered");
        }

        frame.render_widget(Block::default().style(Theme::base()), area);
        Header::new(&view).render(frame, layout.header);
        Tablet::new(&view, pitch, scroll).wiping(self.state.wipe_progress(now)).render(frame, &layout);
        StatsPanel::new(&self.state).render(frame, layout.stats);
        Footer.render(frame, layout.footer);
        Pen::new(&self.state.pen, now).render(frame);
    }

    /// Stop the engine task
    pub fn shutdown(&self) {
        self.engine.shutdown();
        self.cancel.cancel();
    }
}
