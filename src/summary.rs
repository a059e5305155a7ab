use crate::exercise::ExerciseKind;
use crate::profile::ExerciseProfile;
use crate::scoring::{calories_burned, reps_per_segment, stamina_tier, StaminaTier};
use crate::session::SessionState;
use crate::util::{mean, round_to};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Final record of a stopped session, handed to presentation code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub profile: ExerciseProfile,
    pub kind: ExerciseKind,
    pub total_duration_secs: f64,
    pub active_secs: f64,
    pub pause_secs: f64,
    pub rep_count: u32,
    /// Mean whole-frame visibility on the 0..1 scale
    pub avg_pose_score: f64,
    pub calories_kcal: f64,
    pub stamina_tier: StaminaTier,
    pub reps_per_segment: Vec<u32>,
    pub pose_scores: Vec<f64>,
}

impl SessionSummary {
    pub fn rep_rate_per_min(&self) -> f64 {
        let duration = self.total_duration_secs.max(1.0);
        self.rep_count as f64 / duration * 60.0
    }
}

/// Plain text workout report
impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "======= Workout Summary =======")?;
        writeln!(f, "Name: {}", self.profile.name)?;
        writeln!(f, "Age: {}   Gender: {}", self.profile.age, self.profile.gender)?;
        writeln!(f, "Weight: {} kg", self.profile.weight_kg)?;
        if let Some(height) = self.profile.height_cm {
            writeln!(f, "Height: {height} cm")?;
        }
        writeln!(f, "Exercise: {}", self.kind.display_name())?;
        writeln!(f, "Duration: {} seconds", self.total_duration_secs)?;
        writeln!(f, "Active Time: {:.1} seconds", self.active_secs)?;
        writeln!(f, "Repetitions: {}", self.rep_count)?;
        writeln!(f, "Average Pose Score: {:.2}", self.avg_pose_score)?;
        writeln!(f, "Pause Time: {:.1} seconds", self.pause_secs)?;
        writeln!(f, "Stamina Level: {}", self.stamina_tier.badge())?;
        writeln!(f, "Calories Burned: {:.2} kcal", self.calories_kcal)?;
        write!(f, "===============================")
    }
}

/// Assembles a [`SessionSummary`] from a finished session state
pub struct SummaryBuilder<'a> {
    state: &'a SessionState,
    stopped_at: Duration,
}

impl<'a> SummaryBuilder<'a> {
    pub fn new(state: &'a SessionState, stopped_at: Duration) -> Self {
        Self { state, stopped_at }
    }

    pub fn build(&self) -> SessionSummary {
        let state = self.state;
        let profile = &state.profile;

        let total_duration_secs = state.timer.total_duration_secs(self.stopped_at);
        let pause_secs = state.timer.pause_total(self.stopped_at).as_secs_f64();
        let active_secs = (total_duration_secs - pause_secs).max(0.0);
        let avg_pose_score = mean(&state.pose_scores).unwrap_or(0.0);

        let stamina_tier = stamina_tier(
            state.kind,
            profile.age,
            profile.weight_kg,
            state.rep_count,
            total_duration_secs,
            avg_pose_score,
            pause_secs,
        );
        let calories_kcal = calories_burned(
            state.rep_count,
            total_duration_secs,
            profile.weight_kg,
            profile.age,
            profile.gender,
            Some(state.kind),
        );

        SessionSummary {
            profile: profile.clone(),
            kind: state.kind,
            total_duration_secs,
            active_secs,
            pause_secs: round_to(pause_secs, 3),
            rep_count: state.rep_count,
            avg_pose_score,
            calories_kcal,
            stamina_tier,
            reps_per_segment: reps_per_segment(&state.rep_timestamps, total_duration_secs),
            pose_scores: state.pose_scores.clone(),
        }
    }
}
