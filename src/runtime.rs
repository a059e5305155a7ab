use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{SessionError, SourceError};
use crate::exercise::{ExerciseKind, SourceMode};
use crate::landmark::LandmarkFrame;
use crate::profile::ExerciseProfile;
use crate::summary::SessionSummary;
use crate::timer::Clock;
use crate::tracker::{FrameOutcome, RepTracker};

/// A frame as handed over by a source, stamped on the source's clock
#[derive(Clone, Debug, PartialEq)]
pub struct DeliveredFrame {
    pub frame: LandmarkFrame,
    pub at: Duration,
    pub sequence: u64,
}

/// What a source produced when asked for the next frame
#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    Frame(DeliveredFrame),
    /// Nothing arrived within the tick interval
    Tick,
    Exhausted,
}

/// Producer of landmark frames: a live pipeline, a recording, or a generator
pub trait FrameSource {
    fn mode(&self) -> SourceMode;
    /// Acquire the underlying camera, file or channel.
    fn open(&mut self) -> Result<(), SourceError>;
    fn next_frame(&mut self) -> SourceEvent;
    /// Current time on the source's clock
    fn now(&self) -> Duration;
    /// Release the source. No frames are delivered afterwards.
    fn close(&mut self);
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn mode(&self) -> SourceMode {
        (**self).mode()
    }

    fn open(&mut self) -> Result<(), SourceError> {
        (**self).open()
    }

    fn next_frame(&mut self) -> SourceEvent {
        (**self).next_frame()
    }

    fn now(&self) -> Duration {
        (**self).now()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Live source fed by an external pose pipeline over a channel.
///
/// Frames are stamped with the consumer's clock when received, not when produced.
pub struct ChannelFrameSource<C: Clock> {
    rx: Receiver<LandmarkFrame>,
    clock: C,
    tick: Duration,
    sequence: u64,
    closed: bool,
}

impl<C: Clock> ChannelFrameSource<C> {
    pub fn new(rx: Receiver<LandmarkFrame>, clock: C, tick: Duration) -> Self {
        Self {
            rx,
            clock,
            tick,
            sequence: 0,
            closed: false,
        }
    }

    /// Run `pipeline` on its own thread, feeding frames into a new source
    pub fn spawn<F>(pipeline: F, clock: C, tick: Duration) -> Self
    where
        F: FnOnce(Sender<LandmarkFrame>) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || pipeline(tx));
        Self::new(rx, clock, tick)
    }
}

impl<C: Clock> FrameSource for ChannelFrameSource<C> {
    fn mode(&self) -> SourceMode {
        SourceMode::Live
    }

    fn open(&mut self) -> Result<(), SourceError> {
        if self.closed {
            return Err(SourceError::Unavailable("frame channel already closed".into()));
        }
        Ok(())
    }

    fn next_frame(&mut self) -> SourceEvent {
        if self.closed {
            return SourceEvent::Exhausted;
        }
        match self.rx.recv_timeout(self.tick) {
            Ok(frame) => {
                self.sequence += 1;
                SourceEvent::Frame(DeliveredFrame {
                    frame,
                    at: self.clock.now(),
                    sequence: self.sequence,
                })
            }
            Err(RecvTimeoutError::Timeout) => SourceEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => SourceEvent::Exhausted,
        }
    }

    fn now(&self) -> Duration {
        self.clock.now()
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Result of one runner step
#[derive(Clone, Debug, PartialEq)]
pub enum RunnerEvent {
    Frame(FrameOutcome),
    Tick,
    Finished(SessionSummary),
}

/// Drives a tracker from a source, one frame at a time
pub struct Runner<S: FrameSource> {
    source: S,
    tracker: RepTracker,
    /// Frame pulled ahead of the playback position
    pending: Option<DeliveredFrame>,
    /// Stamp of the last frame handed to the tracker
    processed_at: Duration,
    closed: bool,
}

impl<S: FrameSource> fmt::Debug for Runner<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("mode", &self.source.mode())
            .field("tracker", &self.tracker)
            .field("pending", &self.pending.as_ref().map(|p| p.at))
            .field("processed_at", &self.processed_at)
            .field("closed", &self.closed)
            .finish()
    }
}

impl<S: FrameSource> Runner<S> {
    /// Validate the profile, then acquire the source. Nothing is created if either fails.
    pub fn start(
        mut source: S,
        kind: ExerciseKind,
        profile: ExerciseProfile,
    ) -> Result<Self, SessionError> {
        let tracker = RepTracker::for_mode(kind, profile, source.mode())?;
        if let Err(err) = source.open() {
            warn!(%err, "could not acquire frame source");
            return Err(err.into());
        }
        info!(%kind, mode = ?source.mode(), "frame source opened");
        Ok(Self {
            source,
            tracker,
            pending: None,
            processed_at: Duration::ZERO,
            closed: false,
        })
    }

    pub fn tracker(&self) -> &RepTracker {
        &self.tracker
    }

    /// Session clock. A held-back frame has moved the source clock past the
    /// playback position, so the last processed stamp is used instead.
    pub fn now(&self) -> Duration {
        match self.pending {
            Some(_) => self.processed_at,
            None => self.source.now(),
        }
    }

    pub fn mode(&self) -> SourceMode {
        self.source.mode()
    }

    fn pull(&mut self) -> SourceEvent {
        match self.pending.take() {
            Some(delivered) => SourceEvent::Frame(delivered),
            None => self.source.next_frame(),
        }
    }

    fn process(&mut self, delivered: &DeliveredFrame) -> FrameOutcome {
        self.processed_at = delivered.at;
        let outcome = self.tracker.on_frame(&delivered.frame, delivered.at);
        if outcome.auto_stopped {
            self.close_source();
        }
        outcome
    }

    /// Pull and process at most one frame
    pub fn step(&mut self) -> RunnerEvent {
        if self.tracker.is_ended() {
            return RunnerEvent::Finished(self.stop());
        }
        match self.pull() {
            SourceEvent::Frame(delivered) => RunnerEvent::Frame(self.process(&delivered)),
            SourceEvent::Tick => RunnerEvent::Tick,
            SourceEvent::Exhausted => RunnerEvent::Finished(self.stop()),
        }
    }

    /// Process every frame stamped at or before `until`, holding back the
    /// first later one. Paces file playback against a display clock.
    pub fn advance_to(&mut self, until: Duration) -> Option<SessionSummary> {
        loop {
            if self.tracker.is_ended() {
                return Some(self.stop());
            }
            match self.pull() {
                SourceEvent::Frame(delivered) if delivered.at <= until => {
                    self.process(&delivered);
                }
                SourceEvent::Frame(delivered) => {
                    self.pending = Some(delivered);
                    return None;
                }
                SourceEvent::Tick => return None,
                SourceEvent::Exhausted => return Some(self.stop()),
            }
        }
    }

    /// Process frames until the source runs dry or the session stops itself
    pub fn run(&mut self) -> SessionSummary {
        loop {
            if let RunnerEvent::Finished(summary) = self.step() {
                return summary;
            }
        }
    }

    /// Stop the session and release the source. Safe to call repeatedly.
    pub fn stop(&mut self) -> SessionSummary {
        let summary = self.tracker.stop(self.now());
        self.pending = None;
        self.close_source();
        summary
    }

    fn close_source(&mut self) {
        if !self.closed {
            self.source.close();
            self.closed = true;
            info!("frame source closed");
        }
    }
}
