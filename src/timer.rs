use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source. Timestamps are offsets from the clock's origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Production clock backed by `Instant`
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Engagement and pause bookkeeping for one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionTimer {
    pub started_at: Option<Duration>,
    pub pause_started_at: Option<Duration>,
    pub pause_accumulated: Duration,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_engaged(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started_at.is_some()
    }

    /// Anchor the session on its first active frame. Returns true only the first time.
    pub fn engage(&mut self, now: Duration) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    /// Open a pause interval. Nothing to pause before engagement.
    pub fn pause(&mut self, now: Duration) -> bool {
        if !self.is_engaged() || self.pause_started_at.is_some() {
            return false;
        }
        self.pause_started_at = Some(now);
        true
    }

    /// Close any open pause interval, returning its length
    pub fn resume(&mut self, now: Duration) -> Option<Duration> {
        let started = self.pause_started_at.take()?;
        let interval = now.saturating_sub(started);
        self.pause_accumulated += interval;
        Some(interval)
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        self.started_at
            .map_or(Duration::ZERO, |start| now.saturating_sub(start))
    }

    /// Accumulated pause including a still-open interval
    pub fn pause_total(&self, now: Duration) -> Duration {
        let open = self
            .pause_started_at
            .map_or(Duration::ZERO, |start| now.saturating_sub(start));
        self.pause_accumulated + open
    }

    /// Whole seconds from engagement to `stop`, 0 if never engaged
    pub fn total_duration_secs(&self, stop: Duration) -> f64 {
        match self.started_at {
            Some(start) => stop.saturating_sub(start).as_secs_f64().round(),
            None => 0.0,
        }
    }
}
