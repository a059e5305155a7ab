use crate::error::SessionError;
use crate::exercise::{ExerciseKind, SourceMode};
use crate::features::extract;
use crate::machine::{machine_for, RepCounter, Stage};
use crate::profile::ExerciseProfile;
use crate::quality::{classify, pose_score, FrameQuality};
use crate::session::{SessionConfig, SessionState};
use crate::summary::{SessionSummary, SummaryBuilder};
use crate::landmark::LandmarkFrame;
use crate::util::mean;
use std::time::Duration;
use tracing::{debug, info};

/// What a single frame did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutcome {
    pub quality: FrameQuality,
    pub rep_delta: u32,
    pub stage_changed: bool,
    /// This frame anchored the session start
    pub engaged: bool,
    /// The exercise's time cap was reached on this frame
    pub auto_stopped: bool,
}

impl FrameOutcome {
    fn new(quality: FrameQuality) -> Self {
        Self {
            quality,
            rep_delta: 0,
            stage_changed: false,
            engaged: false,
            auto_stopped: false,
        }
    }
}

/// Read-only view for live displays
#[derive(Debug, Clone, PartialEq)]
pub struct LiveStatus {
    pub kind: ExerciseKind,
    pub rep_count: u32,
    pub stage: Stage,
    pub engaged: bool,
    pub paused: bool,
    pub elapsed_secs: f64,
    pub pause_secs: f64,
    pub remaining_secs: Option<f64>,
    pub last_pose_score: Option<f64>,
}

/// Rep-counting engine for one exercise session.
///
/// Frames must be fed one at a time, in timestamp order, from a single caller.
#[derive(Debug)]
pub struct RepTracker {
    pub session_config: SessionConfig,
    session_state: SessionState,
    machine: Box<dyn RepCounter>,
    summary: Option<SessionSummary>,
}

impl RepTracker {
    pub fn new(
        kind: ExerciseKind,
        profile: ExerciseProfile,
        session_config: SessionConfig,
    ) -> Result<Self, SessionError> {
        profile.validate()?;
        let machine = machine_for(kind);
        let session_state = SessionState::new(kind, profile, machine.stage());
        Ok(Self {
            session_config,
            session_state,
            machine,
            summary: None,
        })
    }

    pub fn for_mode(
        kind: ExerciseKind,
        profile: ExerciseProfile,
        mode: SourceMode,
    ) -> Result<Self, SessionError> {
        Self::new(kind, profile, SessionConfig::for_mode(kind, mode))
    }

    pub fn state(&self) -> &SessionState {
        &self.session_state
    }

    pub fn kind(&self) -> ExerciseKind {
        self.session_state.kind
    }

    pub fn rep_count(&self) -> u32 {
        self.session_state.rep_count
    }

    pub fn stage(&self) -> Stage {
        self.session_state.stage
    }

    pub fn has_started(&self) -> bool {
        self.session_state.timer.is_engaged()
    }

    pub fn is_ended(&self) -> bool {
        self.session_state.ended
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        self.session_state.timer.elapsed(now)
    }

    pub fn avg_pose_score(&self) -> f64 {
        mean(&self.session_state.pose_scores).unwrap_or(0.0)
    }

    /// The summary produced by the first `stop`, if any
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// Feed one frame from the pose pipeline. Never fails; bad frames only
    /// move pause bookkeeping.
    pub fn on_frame(&mut self, frame: &LandmarkFrame, now: Duration) -> FrameOutcome {
        let kind = self.session_state.kind;
        let quality = classify(frame, kind.required_landmarks());
        let mut outcome = FrameOutcome::new(quality);
        if self.session_state.ended {
            return outcome;
        }

        let state = &mut self.session_state;
        state.frames_seen += 1;

        // close any open pause before anything else about this frame is recorded
        if quality.is_usable() {
            if let Some(gap) = state.timer.resume(now) {
                debug!(pause_secs = gap.as_secs_f64(), "pose usable again, pause closed");
            }
        } else if state.timer.pause(now) {
            debug!(?quality, "pose unusable, pause opened");
        }

        if let Some(score) = pose_score(frame) {
            state.pose_scores.push(score);
        }

        if quality.is_usable() {
            state.usable_frames += 1;
            if let Some(feature) = extract(kind, frame) {
                let step = self.machine.on_feature(feature, now);
                if step.active && state.timer.engage(now) {
                    info!(%kind, at = now.as_secs_f64(), "session engaged");
                    outcome.engaged = true;
                }
                if step.rep_delta > 0 && state.record_rep(now) {
                    outcome.rep_delta = step.rep_delta;
                    debug!(reps = state.rep_count, "rep counted");
                }
                outcome.stage_changed = step.stage_changed;
                state.stage = self.machine.stage();
            }
        }

        if let Some(limit) = self.session_config.time_limit {
            if self.has_started() && self.elapsed(now) >= limit {
                info!(limit_secs = limit.as_secs_f64(), "time limit reached, stopping");
                self.stop(now);
                outcome.auto_stopped = true;
            }
        }

        outcome
    }

    /// Finish the session. Repeated calls return the first summary unchanged.
    pub fn stop(&mut self, now: Duration) -> SessionSummary {
        if let Some(summary) = &self.summary {
            return summary.clone();
        }

        let state = &mut self.session_state;
        state.timer.resume(now);
        state.ended = true;

        let summary = SummaryBuilder::new(state, now).build();
        info!(
            kind = %state.kind,
            reps = summary.rep_count,
            duration_secs = summary.total_duration_secs,
            pause_secs = summary.pause_secs,
            "session stopped"
        );
        self.summary = Some(summary.clone());
        summary
    }

    /// Discard all progress and start over with the same exercise and profile
    pub fn reset(&mut self) {
        let kind = self.session_state.kind;
        let profile = self.session_state.profile.clone();
        self.machine = machine_for(kind);
        self.session_state = SessionState::new(kind, profile, self.machine.stage());
        self.summary = None;
        debug!(%kind, "session reset");
    }

    pub fn status(&self, now: Duration) -> LiveStatus {
        let state = &self.session_state;
        let at = if state.ended {
            self.summary_stop_time().unwrap_or(now)
        } else {
            now
        };
        let elapsed = state.timer.elapsed(at);
        LiveStatus {
            kind: state.kind,
            rep_count: state.rep_count,
            stage: state.stage,
            engaged: state.timer.is_engaged(),
            paused: state.timer.is_paused(),
            elapsed_secs: elapsed.as_secs_f64(),
            pause_secs: state.timer.pause_total(at).as_secs_f64(),
            remaining_secs: self
                .session_config
                .time_limit
                .map(|limit| limit.saturating_sub(elapsed).as_secs_f64()),
            last_pose_score: state.pose_scores.last().copied(),
        }
    }

    fn summary_stop_time(&self) -> Option<Duration> {
        let summary = self.summary.as_ref()?;
        let start = self.session_state.timer.started_at?;
        Some(start + Duration::from_secs_f64(summary.total_duration_secs))
    }
}
