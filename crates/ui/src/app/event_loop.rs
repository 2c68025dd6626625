use super::App;
use crate::event_handler::EventHandler;
use quill_core::FeedEvent;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::Result;
use std::panic;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

pub async fn run(app: &mut App) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let backend = CrosstermBackend::new(std::io::stdout());
        if let Ok(mut terminal) = Terminal::new(backend) {
            let _ = terminal.show_cursor();
        }
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    terminal.clear()?;
    terminal.hide_cursor()?;

    let mut frames = tokio::time::interval(app.frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while !app.should_exit() {
        tokio::select! {
            _ = frames.tick() => {
                while let Some(event) = EventHandler::read()? {
                    app.handle_event(&event);
                }
                terminal.draw(|frame| app.render(frame))?;
            }
            maybe_engine = app.engine_events.recv() => match maybe_engine {
                Some(event) => app.handle_engine_event(event, Instant::now()),
                None => {
                    tracing::warn!("engine stopped");
                    app.state.should_exit = true;
                }
            },
            maybe_feed = next_feed(&mut app.feed) => match maybe_feed {
                Some(event) => app.handle_feed_event(event),
                None => app.feed_closed(),
            },
        }
    }

    app.shutdown();

    terminal.show_cursor()?;
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;

    Ok(())
}

/// Next feed record, or pending forever once the feed is gone
async fn next_feed(feed: &mut Option<mpsc::UnboundedReceiver<FeedEvent>>) -> Option<FeedEvent> {
    match feed {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
