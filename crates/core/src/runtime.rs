//! Async host for [`Engine`].
//!
//! The engine runs inside one tokio task. Everything that mutates it arrives as
//! a [`Command`] on a channel, so ticks and external input are serialized by
//! construction. Timer waits are `sleep_until` on the engine's next deadline.

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::config::{Config, InkColors};
use crate::engine::{Engine, EngineEvent, PageView, Phase};
use crate::error::{Error, Result};
use crate::layout::LayoutProbe;
use crate::message::IncomingMessage;

/// Input to the engine task
#[derive(Debug)]
pub enum Command {
    Enqueue(IncomingMessage),
    SetInk(InkColors),
    Interrupt,
    ClearPage,
    /// Geometry changed; recompute the pen pose
    Relayout,
    /// Answered once every earlier command has been applied
    Sync(oneshot::Sender<()>),
}

/// Cloneable handle to a running engine task
#[derive(Debug, Clone)]
pub struct EngineHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<PageView>,
    cancel: CancellationToken,
}

impl EngineHandle {
    pub fn enqueue(&self, message: IncomingMessage) -> Result<()> {
        self.send(Command::Enqueue(message))
    }

    pub fn set_ink(&self, ink: InkColors) -> Result<()> {
        self.send(Command::SetInk(ink))
    }

    pub fn interrupt(&self) -> Result<()> {
        self.send(Command::Interrupt)
    }

    pub fn clear_page(&self) -> Result<()> {
        self.send(Command::ClearPage)
    }

    pub fn relayout(&self) -> Result<()> {
        self.send(Command::Relayout)
    }

    /// Wait until every message sent so far is on the page and the engine is idle
    pub async fn settled(&self) -> Result<()> {
        let (reply, done) = oneshot::channel();
        self.send(Command::Sync(reply))?;
        done.await.map_err(|_| Error::EngineClosed)?;

        let mut view = self.view.clone();
        view.wait_for(|v| v.phase == Phase::Idle && v.queued == 0 && v.active.is_none())
            .await
            .map_err(|_| Error::EngineClosed)?;
        Ok(())
    }

    /// Stop the engine task; pending messages are dropped
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Latest published page snapshot
    pub fn view(&self) -> PageView {
        self.view.borrow().clone()
    }

    /// Watch channel that fires whenever the page changes
    pub fn subscribe(&self) -> watch::Receiver<PageView> {
        self.view.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).map_err(|_| Error::EngineClosed)
    }
}

/// A spawned engine task and its outputs
pub struct EngineTask {
    pub handle: EngineHandle,
    pub events: mpsc::UnboundedReceiver<EngineEvent>,
    pub join: JoinHandle<()>,
}

/// Spawn the engine on the current tokio runtime
///
/// The task ends when `cancel` fires or every [`EngineHandle`] is dropped.
pub fn spawn<P>(config: &Config, probe: P, cancel: CancellationToken) -> EngineTask
where
    P: LayoutProbe + Send + 'static,
{
    let engine = Engine::new(config);
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = watch::channel(engine.view());

    let join = tokio::spawn(run(engine, probe, command_rx, event_tx, view_tx, cancel.clone()));
    let handle = EngineHandle { commands: command_tx, view: view_rx, cancel };

    EngineTask { handle, events: event_rx, join }
}

async fn run<P: LayoutProbe>(
    mut engine: Engine, probe: P, mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<EngineEvent>, view: watch::Sender<PageView>, cancel: CancellationToken,
) {
    tracing::debug!("engine task started");
    let initial = engine.refresh_pose(&probe);
    publish(&engine, initial, &events, &view);

    loop {
        let deadline = engine.next_deadline().map(Instant::from_std);

        let mut produced = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            command = commands.recv() => match command {
                Some(command) => apply(&mut engine, command, &probe),
                None => break,
            },
            _ = wait_until(deadline) => Vec::new(),
        };

        produced.extend(engine.advance(Instant::now().into_std(), &probe));
        publish(&engine, produced, &events, &view);
    }

    tracing::debug!(queued = engine.queued(), "engine task stopped");
}

fn apply(engine: &mut Engine, command: Command, probe: &dyn LayoutProbe) -> Vec<EngineEvent> {
    match command {
        Command::Enqueue(message) => {
            engine.enqueue(message);
            Vec::new()
        }
        Command::SetInk(ink) => {
            engine.set_ink(ink);
            Vec::new()
        }
        Command::Interrupt => engine.interrupt(probe),
        Command::ClearPage => engine.clear_page(Instant::now().into_std(), probe),
        Command::Relayout => engine.refresh_pose(probe),
        Command::Sync(reply) => {
            let _ = reply.send(());
            Vec::new()
        }
    }
}

fn publish(
    engine: &Engine, produced: Vec<EngineEvent>, events: &mpsc::UnboundedSender<EngineEvent>,
    view: &watch::Sender<PageView>,
) {
    view.send_replace(engine.view());
    for event in produced {
        if events.send(event).is_err() {
            break;
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
