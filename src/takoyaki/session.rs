//! Session controller: owns the current [`Session`], its tick schedule and
//! the listeners that re-render after each change.
//!
//! Timers are polled, not called back. Every firing becomes a [`TickEvent`]
//! stamped with the schedule generation it came from; `restart()` starts a
//! new generation and ending the session stops the schedule, so an event
//! from a previous session is dropped instead of mutating the new one.

use tracing::{debug, info};

use super::logic::{self, ClockTick, SlotAction};
use super::state::{Outcome, Session, SlotId, Timing};
use crate::config::{ConfigError, GameConfig};
use crate::time::{Clock, IntervalTimer, Millis};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickKind {
    /// One second off the countdown.
    Countdown,
    /// Re-derive slot statuses.
    Slots,
}

/// One timer firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickEvent {
    pub generation: u64,
    pub kind: TickKind,
    pub now: Millis,
}

/// What changed, passed to listeners together with the new state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Countdown { time_left: u32 },
    SlotsChanged { slots: Vec<SlotId> },
    Action { slot: SlotId, action: SlotAction },
    Ended { outcome: Outcome },
    Restarted,
}

pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&Session, &SessionEvent)>;

/// The two periodic timers of one session.
struct TickSchedule {
    generation: u64,
    countdown: IntervalTimer,
    slots: IntervalTimer,
    running: bool,
}

impl TickSchedule {
    fn start(generation: u64, now: Millis, period_ms: Millis) -> Self {
        Self {
            generation,
            countdown: IntervalTimer::start(now, period_ms),
            slots: IntervalTimer::start(now, period_ms),
            running: true,
        }
    }
}

pub struct SessionController {
    config: GameConfig,
    timing: Timing,
    clock: Box<dyn Clock>,
    session: Session,
    schedule: TickSchedule,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl SessionController {
    /// Validate `config` and start the first session at the clock's now.
    pub fn new(config: GameConfig, clock: Box<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;
        let now = clock.now_ms();
        info!(
            slots = config.slot_count,
            countdown = config.countdown_secs,
            "session started"
        );
        Ok(Self {
            timing: Timing::from_config(&config),
            session: Session::new(&config),
            schedule: TickSchedule::start(0, now, config.tick_interval_ms),
            config,
            clock,
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Read-only view for rendering.
    pub fn state(&self) -> &Session {
        &self.session
    }

    pub fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    pub fn is_win(&self) -> bool {
        self.session.is_win(self.config.win_threshold)
    }

    pub fn outcome(&self) -> Outcome {
        self.session.outcome(self.config.win_threshold)
    }

    /// Generation of the current tick schedule.
    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.schedule.generation
    }

    /// Whether the timers are still firing.
    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.schedule.running
    }

    // ── Listeners ──────────────────────────────────────────────

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&Session, &SessionEvent) + 'static,
    ) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, event: SessionEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.session, &event);
        }
    }

    // ── Ticks ──────────────────────────────────────────────────

    /// Collect the timer firings due at `now`, oldest first. Each event
    /// carries its own due time. Nothing fires once the schedule is stopped.
    pub fn poll(&mut self, now: Millis) -> Vec<TickEvent> {
        if !self.schedule.running {
            return Vec::new();
        }
        let generation = self.schedule.generation;
        let slots = self.schedule.slots.poll(now).into_iter().map(|at| TickEvent {
            generation,
            kind: TickKind::Slots,
            now: at,
        });
        let countdown = self.schedule.countdown.poll(now).into_iter().map(|at| TickEvent {
            generation,
            kind: TickKind::Countdown,
            now: at,
        });
        let mut events: Vec<TickEvent> = slots.chain(countdown).collect();
        // Stable: at the same instant slot ticks stay ahead of the countdown.
        events.sort_by_key(|e| e.now);
        events
    }

    /// Apply one timer firing. Returns false for stale or stopped events.
    pub fn handle_tick(&mut self, event: TickEvent) -> bool {
        if event.generation != self.schedule.generation || !self.schedule.running {
            debug!(?event, current = self.schedule.generation, "dropping stale tick");
            return false;
        }
        match event.kind {
            TickKind::Countdown => self.tick_clock(),
            TickKind::Slots => self.tick_slots(event.now),
        }
    }

    /// Sample the clock once and run every due firing. Returns how many
    /// firings were applied.
    pub fn pump(&mut self) -> usize {
        let now = self.clock.now_ms();
        self.poll(now)
            .into_iter()
            .filter(|e| self.handle_tick(*e))
            .count()
    }

    /// Take one second off the countdown, ending the session at zero.
    pub fn tick_clock(&mut self) -> bool {
        match logic::tick_clock(&mut self.session) {
            ClockTick::Ignored => false,
            ClockTick::Counted { time_left } => {
                self.notify(SessionEvent::Countdown { time_left });
                true
            }
            ClockTick::Ended => {
                self.schedule.running = false;
                let outcome = self.outcome();
                info!(
                    good = self.session.good_count,
                    bad = self.session.bad_count,
                    ?outcome,
                    "session ended"
                );
                self.notify(SessionEvent::Countdown { time_left: 0 });
                self.notify(SessionEvent::Ended { outcome });
                true
            }
        }
    }

    /// Re-derive slot statuses at `now`. Listeners hear about it only when
    /// a slot actually changed.
    pub fn tick_slots(&mut self, now: Millis) -> bool {
        if self.session.ended {
            return false;
        }
        let changed = logic::tick_slots(&mut self.session, now, &self.timing);
        if !changed.is_empty() {
            debug!(?changed, "slots advanced");
            self.notify(SessionEvent::SlotsChanged { slots: changed });
        }
        true
    }

    // ── Player input ───────────────────────────────────────────

    /// Apply `action` to slot `id`. Invalid inputs are ignored and return
    /// false.
    pub fn apply_action(&mut self, id: SlotId, action: SlotAction) -> bool {
        let now = self.clock.now_ms();
        let applied = logic::apply_action(&mut self.session, id, action, now);
        if applied {
            self.notify(SessionEvent::Action { slot: id, action });
        }
        applied
    }

    pub fn on_fill(&mut self, id: SlotId) -> bool {
        self.apply_action(id, SlotAction::Fill)
    }

    pub fn on_collect(&mut self, id: SlotId) -> bool {
        self.apply_action(id, SlotAction::Collect)
    }

    pub fn on_discard(&mut self, id: SlotId) -> bool {
        self.apply_action(id, SlotAction::Discard)
    }

    /// A plain tap on a slot: fill, collect or discard depending on what is
    /// in it.
    pub fn click(&mut self, id: SlotId) -> bool {
        if self.session.ended {
            return false;
        }
        match logic::resolve_click(&self.session, id) {
            Some(action) => self.apply_action(id, action),
            None => false,
        }
    }

    /// Throw the current session away and start a fresh one. The old tick
    /// schedule's events become stale.
    pub fn restart(&mut self) {
        let now = self.clock.now_ms();
        let generation = self.schedule.generation + 1;
        self.session = Session::new(&self.config);
        self.schedule = TickSchedule::start(generation, now, self.config.tick_interval_ms);
        info!(generation, "session restarted");
        self.notify(SessionEvent::Restarted);
    }

    pub fn on_restart(&mut self) {
        self.restart();
    }
}
