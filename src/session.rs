use crate::exercise::{ExerciseKind, SourceMode};
use crate::machine::Stage;
use crate::profile::ExerciseProfile;
use crate::timer::SessionTimer;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub source_mode: SourceMode,
    /// Auto-stop once this much time has elapsed since engagement
    pub time_limit: Option<Duration>,
}

impl SessionConfig {
    /// Default limits for an exercise fed from the given kind of source
    pub fn for_mode(kind: ExerciseKind, source_mode: SourceMode) -> Self {
        Self {
            source_mode,
            time_limit: kind.time_limit(source_mode),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            source_mode: SourceMode::File,
            time_limit: None,
        }
    }
}

/// Everything that changes while a session runs
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub kind: ExerciseKind,
    pub profile: ExerciseProfile,
    pub timer: SessionTimer,
    pub stage: Stage,
    pub rep_count: u32,
    pub last_rep_at: Option<Duration>,
    /// One whole-frame visibility score per frame in which a pose was found
    pub pose_scores: Vec<f64>,
    /// Seconds since engagement, one per counted rep
    pub rep_timestamps: Vec<f64>,
    pub frames_seen: u64,
    pub usable_frames: u64,
    pub ended: bool,
}

impl SessionState {
    pub fn new(kind: ExerciseKind, profile: ExerciseProfile, initial_stage: Stage) -> Self {
        Self {
            kind,
            profile,
            timer: SessionTimer::new(),
            stage: initial_stage,
            rep_count: 0,
            last_rep_at: None,
            pose_scores: Vec::new(),
            rep_timestamps: Vec::new(),
            frames_seen: 0,
            usable_frames: 0,
            ended: false,
        }
    }

    pub fn started_at(&self) -> Option<Duration> {
        self.timer.started_at
    }

    pub fn pause_started_at(&self) -> Option<Duration> {
        self.timer.pause_started_at
    }

    pub fn pause_accumulated_secs(&self) -> f64 {
        self.timer.pause_accumulated.as_secs_f64()
    }

    /// Record a counted rep at `now`. No-op before engagement.
    pub fn record_rep(&mut self, now: Duration) -> bool {
        let Some(start) = self.timer.started_at else {
            return false;
        };
        self.rep_count += 1;
        self.rep_timestamps
            .push(now.saturating_sub(start).as_secs_f64());
        self.last_rep_at = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_for_mode() {
        let live = SessionConfig::for_mode(ExerciseKind::HighKnees, SourceMode::Live);
        assert_eq!(live.time_limit, Some(Duration::from_secs(30)));
        let file = SessionConfig::for_mode(ExerciseKind::HighKnees, SourceMode::File);
        assert_eq!(file.time_limit, None);
        assert_eq!(SessionConfig::default().source_mode, SourceMode::File);
    }

    #[test]
    fn test_record_rep_requires_engagement() {
        let mut state = SessionState::new(ExerciseKind::Squat, ExerciseProfile::guest(), Stage::Up);
        assert!(!state.record_rep(Duration::from_secs(1)));
        assert_eq!(state.rep_count, 0);

        state.timer.engage(Duration::from_secs(2));
        assert!(state.record_rep(Duration::from_millis(4500)));
        assert_eq!(state.rep_count, 1);
        assert_eq!(state.rep_timestamps, vec![2.5]);
        assert_eq!(state.last_rep_at, Some(Duration::from_millis(4500)));
    }
}
