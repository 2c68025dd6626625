//! The dispatcher: a single serialized state machine that owns the queue, the
//! open line and the page.
//!
//! The engine never sleeps. Hosts call [`Engine::advance`] with the current time
//! and it runs every step that has come due, in order, stamping each step with
//! the time it was scheduled for rather than the time it was observed. This keeps
//! the cadence exact even when the host wakes up late, and lets tests drive the
//! whole pipeline with synthetic instants.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::config::{Config, EngineConfig, InkColors, PointerConfig, PrivacyConfig};
use crate::layout::{LayoutProbe, Point};
use crate::logging::redact_text;
use crate::message::{IncomingMessage, Line, MessageId};
use crate::overflow::OverflowGuard;
use crate::page::Page;
use crate::pointer::{PointerPose, Stance, pose_for};
use crate::queue::MessageQueue;
use crate::typewriter::{TypeStep, Typewriter};

/// Externally visible phase of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Traveling,
    Typing,
    Overflow,
    Clearing,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Traveling => "traveling",
            Phase::Typing => "typing",
            Phase::Overflow => "overflow",
            Phase::Clearing => "clearing",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something the renderer or a log consumer should know about
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    PhaseChanged { phase: Phase },
    LineOpened { id: MessageId, author: String, row: usize },
    Typed { id: MessageId, visible: String },
    Overflowed { id: MessageId, at: usize },
    LineCompleted { line: Line },
    PageCleared,
    Pose { pose: PointerPose },
}

/// Read-only snapshot of the page for rendering
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PageView {
    pub lines: Vec<Line>,
    /// The open line, if any
    pub active: Option<Line>,
    pub phase: Phase,
    pub queued: usize,
    pub capacity: usize,
    pub pose: Option<PointerPose>,
}

impl PageView {
    /// Row the open line is written on
    pub fn active_row(&self) -> usize {
        self.lines.len()
    }
}

enum State {
    Idle,
    Traveling { writer: Typewriter, until: Instant },
    Typing { writer: Typewriter, next_tick: Instant },
    Overflow { writer: Typewriter, resolve_at: Instant },
    Clearing { until: Instant },
}

impl State {
    fn phase(&self) -> Phase {
        match self {
            State::Idle => Phase::Idle,
            State::Traveling { .. } => Phase::Traveling,
            State::Typing { .. } => Phase::Typing,
            State::Overflow { .. } => Phase::Overflow,
            State::Clearing { .. } => Phase::Clearing,
        }
    }

    fn writer(&self) -> Option<&Typewriter> {
        match self {
            State::Traveling { writer, .. } | State::Typing { writer, .. } | State::Overflow { writer, .. } => {
                Some(writer)
            }
            State::Idle | State::Clearing { .. } => None,
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    pointer: PointerConfig,
    privacy: PrivacyConfig,
    ink: InkColors,
    guard: OverflowGuard,
    queue: MessageQueue,
    page: Page,
    state: State,
    rng: SmallRng,
    last_pose: Option<PointerPose>,
}

impl Engine {
    pub fn new(config: &Config) -> Self {
        let rng = match config.pointer.seed {
            0 => SmallRng::from_os_rng(),
            seed => SmallRng::seed_from_u64(seed),
        };

        Self {
            config: config.engine.clone(),
            pointer: config.pointer.clone(),
            privacy: config.logging.privacy.clone(),
            ink: config.ink.clone(),
            guard: OverflowGuard::new(config.engine.safety_margin),
            queue: MessageQueue::new(config.engine.dedup_window),
            page: Page::new(config.engine.page_capacity),
            state: State::Idle,
            rng,
            last_pose: None,
        }
    }

    /// Add a message to the backlog
    ///
    /// Never disturbs the line being written. Returns `false` for a duplicate id.
    pub fn enqueue(&mut self, message: IncomingMessage) -> bool {
        let id = message.id.clone();
        let accepted = self.queue.enqueue(message);
        if accepted {
            tracing::debug!(id = %id, queued = self.queue.len(), "message queued");
        } else {
            tracing::debug!(id = %id, "duplicate message dropped");
        }
        accepted
    }

    /// Ink for lines opened from now on; lines already on the page keep theirs
    pub fn set_ink(&mut self, ink: InkColors) {
        self.ink = ink;
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn active_line(&self) -> Option<&Line> {
        self.state.writer().map(Typewriter::line)
    }

    pub fn last_pose(&self) -> Option<PointerPose> {
        self.last_pose
    }

    /// When the next step falls due, if one is scheduled
    ///
    /// An idle engine with work queued is due immediately; `advance` never
    /// returns in that state.
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.state {
            State::Idle => None,
            State::Traveling { until, .. } | State::Clearing { until } => Some(*until),
            State::Typing { next_tick, .. } => Some(*next_tick),
            State::Overflow { resolve_at, .. } => Some(*resolve_at),
        }
    }

    pub fn view(&self) -> PageView {
        PageView {
            lines: self.page.lines().to_vec(),
            active: self.active_line().cloned(),
            phase: self.phase(),
            queued: self.queue.len(),
            capacity: self.page.capacity(),
            pose: self.last_pose,
        }
    }

    /// Run every step due at or before `now`
    pub fn advance(&mut self, now: Instant, probe: &dyn LayoutProbe) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        let mut cursor: Option<Instant> = None;

        loop {
            let due = match &self.state {
                State::Idle if self.queue.is_empty() => break,
                State::Idle => cursor.unwrap_or(now),
                State::Traveling { until, .. } | State::Clearing { until } => *until,
                State::Typing { next_tick, .. } => *next_tick,
                State::Overflow { resolve_at, .. } => *resolve_at,
            };
            if due > now {
                break;
            }

            self.step(due, probe, &mut events);
            self.emit_pose(probe, &mut events);
            cursor = Some(due);
        }

        events
    }

    /// Recompute the pen pose against fresh geometry without stepping
    pub fn refresh_pose(&mut self, probe: &dyn LayoutProbe) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        self.emit_pose(probe, &mut events);
        events
    }

    /// Stop writing the open line now
    ///
    /// Whatever is visible is committed as a closed line. A wipe in progress is
    /// left alone.
    pub fn interrupt(&mut self, probe: &dyn LayoutProbe) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        if self.close_open_line(&mut events) {
            self.set_phase(State::Idle, &mut events);
            self.emit_pose(probe, &mut events);
        }
        events
    }

    /// Wipe the page starting at `now`, committing the open line first
    pub fn clear_page(&mut self, now: Instant, probe: &dyn LayoutProbe) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        if matches!(self.state, State::Clearing { .. }) {
            return events;
        }

        self.close_open_line(&mut events);
        self.begin_clear(now, &mut events);
        self.emit_pose(probe, &mut events);
        events
    }

    fn step(&mut self, at: Instant, probe: &dyn LayoutProbe, events: &mut Vec<EngineEvent>) {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => self.dispatch(at, events),
            State::Traveling { writer, .. } => {
                if writer.is_complete() {
                    self.commit(writer.finish(), events);
                    self.set_phase(State::Idle, events);
                } else {
                    let next_tick = at + self.config.char_interval();
                    self.set_phase(State::Typing { writer, next_tick }, events);
                }
            }
            State::Typing { mut writer, .. } => match writer.tick(&self.guard, probe) {
                TypeStep::Revealed(_) => {
                    tracing::trace!(id = %writer.line().id, revealed = writer.revealed(), "tick");
                    let visible = writer.visible().to_string();
                    events.push(EngineEvent::Typed { id: writer.line().id.clone(), visible });
                    self.state = State::Typing { writer, next_tick: at + self.config.char_interval() };
                }
                TypeStep::Overflow => {
                    let char_at = writer.revealed() + 1;
                    tracing::debug!(id = %writer.line().id, char_at, "line overflow");
                    events.push(EngineEvent::Overflowed { id: writer.line().id.clone(), at: char_at });
                    let resolve_at = at + self.config.char_interval();
                    self.set_phase(State::Overflow { writer, resolve_at }, events);
                }
                TypeStep::Finished => {
                    self.commit(writer.finish(), events);
                    self.set_phase(State::Idle, events);
                }
            },
            State::Overflow { writer, .. } => {
                let line = writer.truncate(&self.config.ellipsis);
                self.commit(line, events);
                self.set_phase(State::Idle, events);
            }
            State::Clearing { .. } => {
                self.page.reset();
                tracing::debug!("page cleared");
                events.push(EngineEvent::PageCleared);
                self.set_phase(State::Idle, events);
            }
        }
    }

    fn dispatch(&mut self, at: Instant, events: &mut Vec<EngineEvent>) {
        if self.page.is_full() {
            self.begin_clear(at, events);
            return;
        }

        let Some(message) = self.queue.dequeue() else {
            return;
        };

        let row = self.page.len();
        tracing::debug!(
            id = %message.id,
            row,
            chars = message.char_count(),
            text = %redact_text(&message.text, &self.privacy),
            "line opened"
        );

        let writer = Typewriter::new(Line::open(&message, &self.ink), &message, row);
        events.push(EngineEvent::LineOpened { id: message.id.clone(), author: message.author.clone(), row });
        let until = at + self.config.travel_delay();
        self.set_phase(State::Traveling { writer, until }, events);
    }

    fn begin_clear(&mut self, at: Instant, events: &mut Vec<EngineEvent>) {
        tracing::debug!(lines = self.page.len(), queued = self.queue.len(), "clearing page");
        let until = at + self.config.clear_delay();
        self.set_phase(State::Clearing { until }, events);
    }

    /// Commit the open line, if there is one. Leaves the state idle.
    fn close_open_line(&mut self, events: &mut Vec<EngineEvent>) -> bool {
        let line = match std::mem::replace(&mut self.state, State::Idle) {
            State::Traveling { writer, .. } | State::Typing { writer, .. } => writer.finish(),
            State::Overflow { writer, .. } => writer.truncate(&self.config.ellipsis),
            other => {
                self.state = other;
                return false;
            }
        };

        tracing::debug!(id = %line.id, chars = line.char_count(), "line interrupted");
        self.commit(line, events);
        true
    }

    fn commit(&mut self, line: Line, events: &mut Vec<EngineEvent>) {
        tracing::debug!(id = %line.id, chars = line.char_count(), truncated = line.truncated, "line completed");
        match self.page.append(line.clone()) {
            Ok(()) => events.push(EngineEvent::LineCompleted { line }),
            Err(e) => tracing::warn!(id = %line.id, error = %e, "line dropped"),
        }
    }

    fn set_phase(&mut self, state: State, events: &mut Vec<EngineEvent>) {
        let phase = state.phase();
        self.state = state;
        tracing::debug!(phase = %phase, "phase changed");
        events.push(EngineEvent::PhaseChanged { phase });
    }

    fn emit_pose(&mut self, probe: &dyn LayoutProbe, events: &mut Vec<EngineEvent>) {
        let noise = self.sample_noise();
        let stance = match &self.state {
            State::Idle | State::Clearing { .. } => Stance::Parked,
            State::Traveling { writer, .. } => Stance::Traveling { row: writer.row() },
            State::Typing { writer, .. } => Stance::Typing { row: writer.row(), text: writer.visible() },
            State::Overflow { .. } => Stance::OverflowPending,
        };

        if let Some(pose) = pose_for(stance, probe, &self.pointer, self.config.char_interval_ms, noise) {
            self.last_pose = Some(pose);
            events.push(EngineEvent::Pose { pose });
        }
    }

    fn sample_noise(&mut self) -> Point {
        let bound = self.pointer.noise;
        if bound <= 0.0 {
            return Point::default();
        }
        Point::new(self.rng.random_range(-bound..=bound), self.rng.random_range(-bound..=bound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{MonospaceProbe, Rect};
    use std::time::Duration;

    fn config() -> Config {
        let mut config = Config::default();
        config.pointer.seed = 7;
        config
    }

    /// 400 wide at 10 per char with a 20 margin: 38 characters fit per row
    fn probe() -> MonospaceProbe {
        MonospaceProbe::new(Rect::new(0.0, 0.0, 400.0, 600.0), 10.0, 20.0)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn completed(events: &[EngineEvent]) -> Vec<Line> {
        events
            .iter()
            .filter_map(|e| match e {
                EngineEvent::LineCompleted { line } => Some(line.clone()),
                _ => None,
            })
            .collect()
    }

    fn phases(events: &[EngineEvent]) -> Vec<Phase> {
        events
            .iter()
            .filter_map(|e| match e {
                EngineEvent::PhaseChanged { phase } => Some(*phase),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_idle_engine_does_nothing() {
        let mut engine = Engine::new(&config());
        assert!(engine.advance(Instant::now(), &probe()).is_empty());
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(engine.next_deadline().is_none());
    }

    #[test]
    fn test_message_lifecycle_timing() {
        let mut engine = Engine::new(&config());
        let t0 = Instant::now();
        let probe = probe();
        engine.enqueue(IncomingMessage::new("a", "ana", "HELLO"));

        let events = engine.advance(t0, &probe);
        assert_eq!(engine.phase(), Phase::Traveling);
        assert!(events.iter().any(|e| matches!(e, EngineEvent::LineOpened { row: 0, .. })));
        assert_eq!(engine.next_deadline(), Some(t0 + ms(600)));

        engine.advance(t0 + ms(599), &probe);
        assert_eq!(engine.phase(), Phase::Traveling);

        engine.advance(t0 + ms(600), &probe);
        assert_eq!(engine.phase(), Phase::Typing);
        assert_eq!(engine.active_line().map(|l| l.text.as_str()), Some(""));

        engine.advance(t0 + ms(660), &probe);
        assert_eq!(engine.active_line().map(|l| l.text.as_str()), Some("HE"));

        // five reveals and one finishing tick
        let events = engine.advance(t0 + ms(750), &probe);
        assert_eq!(engine.active_line().map(|l| l.text.as_str()), Some("HELLO"));
        assert!(completed(&events).is_empty());

        let events = engine.advance(t0 + ms(780), &probe);
        assert_eq!(completed(&events).len(), 1);
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.page().lines()[0].text, "HELLO");
        assert!(engine.active_line().is_none());
    }

    #[test]
    fn test_backlog_dispatches_when_observed() {
        let mut engine = Engine::new(&config());
        let t0 = Instant::now();
        let probe = probe();
        engine.enqueue(IncomingMessage::new("a", "x", "hi"));

        // nothing was running before this call, so travel starts now
        let events = engine.advance(t0 + Duration::from_secs(5), &probe);
        assert_eq!(phases(&events), vec![Phase::Traveling]);
        assert_eq!(engine.next_deadline(), Some(t0 + Duration::from_secs(5) + ms(600)));
    }

    #[test]
    fn test_duplicate_scenario() {
        let mut engine = Engine::new(&config());
        assert!(engine.enqueue(IncomingMessage::new("a", "x", "HELLO")));
        assert!(!engine.enqueue(IncomingMessage::new("a", "x", "DUPLICATE")));

        let t0 = Instant::now();
        let mut events = engine.advance(t0, &probe());
        events.extend(engine.advance(t0 + Duration::from_secs(60), &probe()));
        let lines = completed(&events);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "HELLO");
    }

    #[test]
    fn test_order_preserved_and_single_writer() {
        let mut engine = Engine::new(&config());
        let t0 = Instant::now();
        let probe = probe();
        let ids: Vec<String> = (0..6).map(|i| format!("m{i}")).collect();

        engine.enqueue(IncomingMessage::new(ids[0].as_str(), "a", "first"));
        let mut events = engine.advance(t0, &probe);
        for (i, id) in ids.iter().enumerate().skip(1) {
            engine.enqueue(IncomingMessage::new(id.as_str(), "a", format!("line {i}")));
            events.extend(engine.advance(t0 + ms(100 * i as u64), &probe));
        }
        events.extend(engine.advance(t0 + Duration::from_secs(60), &probe));

        let done: Vec<String> = completed(&events).iter().map(|l| l.id.to_string()).collect();
        assert_eq!(done, ids);

        let mut open = 0;
        for event in &events {
            match event {
                EngineEvent::LineOpened { .. } => {
                    open += 1;
                    assert_eq!(open, 1, "two lines open at once");
                }
                EngineEvent::LineCompleted { .. } => open -= 1,
                _ => {}
            }
        }
        assert_eq!(open, 0);
    }

    #[test]
    fn test_enqueue_does_not_disturb_typing() {
        let mut engine = Engine::new(&config());
        let t0 = Instant::now();
        let probe = probe();
        engine.enqueue(IncomingMessage::new("a", "x", "ABCDEF"));
        engine.advance(t0, &probe);
        engine.advance(t0 + ms(690), &probe);
        let before = engine.active_line().cloned();

        engine.enqueue(IncomingMessage::new("b", "x", "next"));
        assert_eq!(engine.phase(), Phase::Typing);
        assert_eq!(engine.active_line().cloned(), before);
        assert_eq!(engine.queued(), 1);
    }

    #[test]
    fn test_page_fill_triggers_clear() {
        let mut engine = Engine::new(&config());
        let t0 = Instant::now();
        let probe = probe();
        for i in 0..12 {
            engine.enqueue(IncomingMessage::new(format!("c{i}").as_str(), "x", "x"));
        }
        engine.advance(t0, &probe);

        // each one-character line: 600 travel + 2 ticks of 30
        let filled = t0 + ms(12 * 660);
        engine.advance(filled - ms(1), &probe);
        assert_eq!(engine.page().len(), 11);
        engine.advance(filled, &probe);
        assert_eq!(engine.page().len(), 12);
        assert_eq!(engine.phase(), Phase::Idle);

        engine.enqueue(IncomingMessage::new("c12", "x", "thirteenth"));
        let events = engine.advance(filled, &probe);
        assert_eq!(phases(&events), vec![Phase::Clearing]);
        assert_eq!(engine.page().len(), 12);
        assert_eq!(engine.queued(), 1);

        engine.advance(filled + ms(799), &probe);
        assert_eq!(engine.phase(), Phase::Clearing);

        let events = engine.advance(filled + ms(800), &probe);
        assert!(events.contains(&EngineEvent::PageCleared));
        assert_eq!(engine.page().len(), 0);
        assert_eq!(engine.phase(), Phase::Traveling);
        assert_eq!(engine.active_line().map(|l| l.id.as_str()), Some("c12"));

        engine.advance(filled + Duration::from_secs(60), &probe);
        assert_eq!(engine.page().len(), 1);
        assert_eq!(engine.page().lines()[0].text, "thirteenth");
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let mut config = config();
        config.engine.page_capacity = 3;
        let mut engine = Engine::new(&config);
        let t0 = Instant::now();
        let probe = probe();
        for i in 0..10 {
            engine.enqueue(IncomingMessage::new(format!("k{i}").as_str(), "x", "ab"));
        }

        let mut cleared = 0;
        for step in 0..2000u64 {
            let events = engine.advance(t0 + ms(step * 5), &probe);
            assert!(engine.page().len() <= 3);
            if events.contains(&EngineEvent::PageCleared) {
                cleared += 1;
                assert_eq!(engine.page().len(), 0);
            }
        }
        assert_eq!(cleared, 3);
        assert_eq!(engine.page().len(), 1);
    }

    #[test]
    fn test_late_wakeup_keeps_cadence() {
        let mut engine = Engine::new(&config());
        let t0 = Instant::now();
        let probe = probe();
        engine.enqueue(IncomingMessage::new("a", "x", "ab"));
        engine.enqueue(IncomingMessage::new("b", "x", "cd"));
        engine.advance(t0, &probe);

        // a: 600 + 3 * 30 = 690; b opens at 690 and finishes at 1380
        let events = engine.advance(t0 + ms(1379), &probe);
        assert_eq!(completed(&events).len(), 1);
        let events = engine.advance(t0 + ms(1380), &probe);
        assert_eq!(completed(&events).len(), 1);
    }

    #[test]
    fn test_overflow_truncates_and_discards_rest() {
        let mut engine = Engine::new(&config());
        let t0 = Instant::now();
        let narrow = MonospaceProbe::new(Rect::new(0.0, 0.0, 100.0, 600.0), 10.0, 20.0);
        engine.enqueue(IncomingMessage::new("long", "x", "ABCDEFGHIJKLMNOP"));
        engine.enqueue(IncomingMessage::new("next", "x", "ok"));
        engine.advance(t0, &narrow);

        // eight characters fit; the ninth overflows at 600 + 9 * 30
        let overflow_at = t0 + ms(870);
        let events = engine.advance(overflow_at, &narrow);
        assert_eq!(engine.phase(), Phase::Overflow);
        assert!(events.contains(&EngineEvent::Overflowed { id: MessageId::from("long"), at: 9 }));
        assert_eq!(engine.active_line().map(|l| l.text.as_str()), Some("ABCDEFGH"));

        let events = engine.advance(overflow_at + ms(30), &narrow);
        let lines = completed(&events);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "ABCDEFG…");
        assert!(lines[0].truncated);

        let events = engine.advance(t0 + Duration::from_secs(60), &narrow);
        let lines = completed(&events);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "ok");
        assert!(engine.page().lines().iter().all(|l| !l.text.contains('I')));
    }

    #[test]
    fn test_overflow_holds_pose() {
        let mut engine = Engine::new(&config());
        let t0 = Instant::now();
        let narrow = MonospaceProbe::new(Rect::new(0.0, 0.0, 100.0, 600.0), 10.0, 20.0);
        engine.enqueue(IncomingMessage::new("long", "x", "ABCDEFGHIJKLMNOP"));
        engine.advance(t0, &narrow);

        engine.advance(t0 + ms(840), &narrow);
        let held = engine.last_pose();
        let events = engine.advance(t0 + ms(870), &narrow);
        assert_eq!(engine.phase(), Phase::Overflow);
        assert!(!events.iter().any(|e| matches!(e, EngineEvent::Pose { .. })));
        assert_eq!(engine.last_pose(), held);
        assert!(engine.refresh_pose(&narrow).is_empty());
    }

    #[test]
    fn test_empty_message_completes_without_typing() {
        let mut engine = Engine::new(&config());
        let t0 = Instant::now();
        let probe = probe();
        engine.enqueue(IncomingMessage::new("e", "x", ""));
        engine.enqueue(IncomingMessage::new("f", "x", "after"));
        engine.advance(t0, &probe);

        let events = engine.advance(t0 + ms(600), &probe);
        let lines = completed(&events);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].id.as_str(), "e");
        assert_eq!(lines[0].text, "");
        assert!(!events.iter().any(|e| matches!(e, EngineEvent::Typed { .. })));
        assert_eq!(engine.active_line().map(|l| l.id.as_str()), Some("f"));
    }

    #[test]
    fn test_pointer_parked_when_idle() {
        let mut engine = Engine::new(&config());
        let probe = probe();
        let t0 = Instant::now();
        engine.enqueue(IncomingMessage::new("a", "x", "hi"));
        engine.advance(t0, &probe);
        engine.advance(t0 + Duration::from_secs(10), &probe);

        assert_eq!(engine.phase(), Phase::Idle);
        let pose = engine.last_pose().unwrap();
        assert!(pose.x > 400.0);
    }

    #[test]
    fn test_pointer_follows_phases() {
        let mut engine = Engine::new(&config());
        let t0 = Instant::now();
        let probe = probe();
        engine.enqueue(IncomingMessage::new("a", "x", "hey"));

        engine.advance(t0, &probe);
        let travel = engine.last_pose().unwrap();
        assert_eq!(travel.easing, crate::pointer::Easing::EaseOut);
        assert_eq!(travel.x, 0.0);

        engine.advance(t0 + ms(660), &probe);
        let typing = engine.last_pose().unwrap();
        assert_eq!(typing.easing, crate::pointer::Easing::Linear);
        assert!((typing.x - 20.0).abs() <= 1.0);
    }

    #[test]
    fn test_unmounted_layout_parks_offscreen() {
        let mut engine = Engine::new(&config());
        let probe = MonospaceProbe::unmounted();
        engine.enqueue(IncomingMessage::new("a", "x", "a very long message that would overflow if measured"));
        let t0 = Instant::now();
        engine.advance(t0, &probe);
        let events = engine.advance(t0 + Duration::from_secs(60), &probe);

        assert!(!completed(&events)[0].truncated);
        assert_eq!(engine.last_pose().map(|p| p.position()), Some(crate::pointer::OFFSCREEN));
    }

    #[test]
    fn test_interrupt_commits_revealed_text() {
        let mut engine = Engine::new(&config());
        let t0 = Instant::now();
        let probe = probe();
        engine.enqueue(IncomingMessage::new("a", "x", "ABCDEF"));
        engine.enqueue(IncomingMessage::new("b", "x", "next"));
        engine.advance(t0, &probe);
        engine.advance(t0 + ms(690), &probe);

        let events = engine.interrupt(&probe);
        let lines = completed(&events);
        assert_eq!(lines[0].text, "ABC");
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(engine.active_line().is_none());

        engine.advance(t0 + ms(690), &probe);
        assert_eq!(engine.active_line().map(|l| l.id.as_str()), Some("b"));
    }

    #[test]
    fn test_interrupt_while_idle_is_noop() {
        let mut engine = Engine::new(&config());
        assert!(engine.interrupt(&probe()).is_empty());
    }

    #[test]
    fn test_clear_page_cancels_typing() {
        let mut engine = Engine::new(&config());
        let t0 = Instant::now();
        let probe = probe();
        engine.enqueue(IncomingMessage::new("a", "x", "ABCDEF"));
        engine.advance(t0, &probe);
        engine.advance(t0 + ms(660), &probe);

        let events = engine.clear_page(t0 + ms(660), &probe);
        assert_eq!(completed(&events)[0].text, "AB");
        assert_eq!(engine.phase(), Phase::Clearing);
        assert_eq!(engine.next_deadline(), Some(t0 + ms(1460)));

        // no further characters appear during or after the wipe
        let events = engine.advance(t0 + ms(1460), &probe);
        assert!(!events.iter().any(|e| matches!(e, EngineEvent::Typed { .. })));
        assert!(engine.page().is_empty());
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_messages_wait_during_clear() {
        let mut engine = Engine::new(&config());
        let t0 = Instant::now();
        let probe = probe();
        engine.clear_page(t0, &probe);
        engine.enqueue(IncomingMessage::new("w", "x", "waiting"));

        engine.advance(t0 + ms(400), &probe);
        assert_eq!(engine.phase(), Phase::Clearing);
        assert_eq!(engine.queued(), 1);

        engine.advance(t0 + ms(800), &probe);
        assert_eq!(engine.phase(), Phase::Traveling);
        assert_eq!(engine.queued(), 0);
    }

    #[test]
    fn test_ink_applies_to_new_lines_only() {
        let mut engine = Engine::new(&config());
        let t0 = Instant::now();
        let probe = probe();
        engine.enqueue(IncomingMessage::new("a", "x", "one"));
        engine.advance(t0, &probe);

        let red = InkColors::new("#ff0000", "#aa0000");
        engine.set_ink(red.clone());
        engine.enqueue(IncomingMessage::new("b", "x", "two"));
        engine.advance(t0 + Duration::from_secs(60), &probe);

        let lines = engine.page().lines();
        assert_eq!(lines[0].ink, InkColors::default());
        assert_eq!(lines[1].ink, red);
    }

    #[test]
    fn test_view_snapshot() {
        let mut engine = Engine::new(&config());
        let t0 = Instant::now();
        let probe = probe();
        engine.enqueue(IncomingMessage::new("a", "x", "abc"));
        engine.enqueue(IncomingMessage::new("b", "x", "def"));
        engine.advance(t0, &probe);
        engine.advance(t0 + ms(630), &probe);

        let view = engine.view();
        assert_eq!(view.phase, Phase::Typing);
        assert_eq!(view.queued, 1);
        assert_eq!(view.capacity, 12);
        assert_eq!(view.active.as_ref().map(|l| l.text.as_str()), Some("a"));
        assert_eq!(view.active_row(), 0);
        assert!(view.pose.is_some());
    }

    #[test]
    fn test_events_serialize_tagged() {
        let json = serde_json::to_value(EngineEvent::PhaseChanged { phase: Phase::Clearing }).unwrap();
        assert_eq!(json["type"], "phase_changed");
        assert_eq!(json["phase"], "clearing");

        let json = serde_json::to_value(EngineEvent::PageCleared).unwrap();
        assert_eq!(json["type"], "page_cleared");
    }
}
