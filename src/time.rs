//! Clock abstraction and fixed-interval timers.
//!
//! `draw_web()` calls at ~60fps with a variable delta. The shell samples a
//! [`Clock`] once per frame and feeds the reading to [`IntervalTimer::poll`],
//! which returns the due time of every firing since the previous poll. Game
//! logic only ever sees millisecond timestamps, so tests drive it with
//! synthetic time.

/// Milliseconds on the game clock.
pub type Millis = u64;

/// Source of "now" for the game.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now_ms(&self) -> Millis {
        (**self).now_ms()
    }
}

/// Browser clock backed by `performance.now()`.
///
/// Falls back to `Date.now()` relative to construction when the Performance
/// API is unavailable.
pub struct PerformanceClock {
    performance: Option<web_sys::Performance>,
    origin: f64,
}

impl PerformanceClock {
    pub fn new() -> Self {
        let performance = web_sys::window().and_then(|w| w.performance());
        let origin = match &performance {
            Some(_) => 0.0,
            None => js_sys::Date::now(),
        };
        Self {
            performance,
            origin,
        }
    }
}

impl Clock for PerformanceClock {
    fn now_ms(&self) -> Millis {
        let raw = match &self.performance {
            Some(p) => p.now(),
            None => js_sys::Date::now() - self.origin,
        };
        raw.max(0.0) as Millis
    }
}

/// Hand-driven clock for tests.
#[cfg(test)]
#[derive(Default)]
pub struct ManualClock {
    now: std::cell::Cell<Millis>,
}

#[cfg(test)]
impl ManualClock {
    pub fn at(ms: Millis) -> Self {
        Self {
            now: std::cell::Cell::new(ms),
        }
    }

    pub fn advance(&self, ms: Millis) {
        self.now.set(self.now.get() + ms);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

/// A periodic timer that fires every `period_ms`, starting one period after
/// it was started. Equivalent to a `setInterval` that is polled instead of
/// called back.
///
/// A long gap between polls (backgrounded tab) is replayed in full, so every
/// timer started at the same instant agrees on elapsed time.
#[derive(Clone, Debug, PartialEq)]
pub struct IntervalTimer {
    period_ms: Millis,
    next_due: Millis,
}

impl IntervalTimer {
    /// Start a timer at `now`. `period_ms` must be non-zero (checked by
    /// config validation).
    pub fn start(now: Millis, period_ms: Millis) -> Self {
        debug_assert!(period_ms > 0);
        Self {
            period_ms,
            next_due: now + period_ms,
        }
    }

    /// Due times of the firings since the last poll, oldest first.
    pub fn poll(&mut self, now: Millis) -> Vec<Millis> {
        let mut due = Vec::new();
        while self.next_due <= now {
            due.push(self.next_due);
            self.next_due += self.period_ms;
        }
        due
    }
}
