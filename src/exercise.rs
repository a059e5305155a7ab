use crate::error::SessionError;
use crate::landmark::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Cap for live-camera high knees sessions
pub const HIGH_KNEES_LIVE_LIMIT: Duration = Duration::from_secs(30);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExerciseKind {
    JumpingJacks,
    Pushup,
    Squat,
    HighKnees,
}

/// Where frames come from; decides whether the live time cap applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    Live,
    File,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 4] = [
        ExerciseKind::JumpingJacks,
        ExerciseKind::Pushup,
        ExerciseKind::Squat,
        ExerciseKind::HighKnees,
    ];

    /// Landmarks that must pass the visibility floor for rep counting
    pub fn required_landmarks(&self) -> &'static [usize] {
        match self {
            ExerciseKind::JumpingJacks => &[
                LEFT_SHOULDER,
                RIGHT_SHOULDER,
                LEFT_WRIST,
                RIGHT_WRIST,
                LEFT_ANKLE,
                RIGHT_ANKLE,
            ],
            ExerciseKind::Pushup => &[LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST],
            ExerciseKind::Squat => &[
                LEFT_HIP,
                RIGHT_HIP,
                LEFT_KNEE,
                RIGHT_KNEE,
                LEFT_ANKLE,
                RIGHT_ANKLE,
            ],
            ExerciseKind::HighKnees => &[LEFT_HIP, RIGHT_HIP, LEFT_KNEE, RIGHT_KNEE],
        }
    }

    /// MET-like multiplier for the calorie estimate
    pub fn calorie_multiplier(&self) -> f64 {
        match self {
            ExerciseKind::JumpingJacks => 8.0,
            ExerciseKind::HighKnees => 8.5,
            ExerciseKind::Squat => 6.5,
            ExerciseKind::Pushup => 7.0,
        }
    }

    /// (lower, upper) reps-per-minute bands used by the stamina score.
    /// High knees run at a faster cadence and get their own bar.
    pub fn rep_rate_bands(&self) -> (f64, f64) {
        match self {
            ExerciseKind::HighKnees => (40.0, 60.0),
            _ => (20.0, 30.0),
        }
    }

    pub fn time_limit(&self, mode: SourceMode) -> Option<Duration> {
        match (self, mode) {
            (ExerciseKind::HighKnees, SourceMode::Live) => Some(HIGH_KNEES_LIVE_LIMIT),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ExerciseKind::JumpingJacks => "Jumping Jacks",
            ExerciseKind::Pushup => "Push-ups",
            ExerciseKind::Squat => "Squats",
            ExerciseKind::HighKnees => "High Knees",
        }
    }
}

impl FromStr for ExerciseKind {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "jumping_jacks" | "jumpingjacks" => Ok(ExerciseKind::JumpingJacks),
            "pushup" | "pushups" | "push_up" | "push_ups" => Ok(ExerciseKind::Pushup),
            "squat" | "squats" => Ok(ExerciseKind::Squat),
            "high_knees" | "highknees" => Ok(ExerciseKind::HighKnees),
            _ => Err(SessionError::InvalidConfiguration(format!(
                "unknown exercise kind '{s}'"
            ))),
        }
    }
}
