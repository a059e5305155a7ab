//! Repetition state machines, one strategy per exercise.

use crate::exercise::ExerciseKind;
use crate::features::Feature;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const PUSHUP_DOWN_THRESHOLD: f64 = 90.0;
pub const PUSHUP_UP_THRESHOLD: f64 = 160.0;
pub const SQUAT_DOWN_THRESHOLD: f64 = 115.0;
pub const SQUAT_UP_THRESHOLD: f64 = 160.0;
pub const HIGH_KNEES_MARGIN: f64 = 0.12;
pub const HIGH_KNEES_COOLDOWN: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Closed,
    Open,
    Up,
    Down,
    Idle,
    LeftLast,
    RightLast,
}

/// Result of feeding one feature to a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MachineStep {
    pub rep_delta: u32,
    pub stage_changed: bool,
    /// The frame satisfied the exercise's "engaged" predicate
    pub active: bool,
}

pub trait RepCounter: std::fmt::Debug {
    fn kind(&self) -> ExerciseKind;
    fn stage(&self) -> Stage;
    /// Features of the wrong shape for this exercise are ignored.
    fn on_feature(&mut self, feature: Feature, now: Duration) -> MachineStep;
}

pub fn machine_for(kind: ExerciseKind) -> Box<dyn RepCounter> {
    match kind {
        ExerciseKind::JumpingJacks => Box::new(JumpingJacksMachine::new()),
        ExerciseKind::Pushup => Box::new(ThresholdMachine::pushup()),
        ExerciseKind::Squat => Box::new(ThresholdMachine::squat()),
        ExerciseKind::HighKnees => Box::new(HighKneesMachine::new()),
    }
}

/// Open/closed machine: a rep is the return from open to closed
#[derive(Debug, Clone)]
pub struct JumpingJacksMachine {
    stage: Stage,
}

impl JumpingJacksMachine {
    pub fn new() -> Self {
        Self {
            stage: Stage::Closed,
        }
    }
}

impl Default for JumpingJacksMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RepCounter for JumpingJacksMachine {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::JumpingJacks
    }

    fn stage(&self) -> Stage {
        self.stage
    }

    fn on_feature(&mut self, feature: Feature, _now: Duration) -> MachineStep {
        let Feature::JumpingJacks {
            hands_up,
            feet_apart,
            feet_together,
        } = feature
        else {
            return MachineStep::default();
        };

        let active = hands_up && feet_apart;
        match self.stage {
            Stage::Closed if active => {
                self.stage = Stage::Open;
                debug!("jumping jacks: closed -> open");
                MachineStep {
                    rep_delta: 0,
                    stage_changed: true,
                    active,
                }
            }
            Stage::Open if !hands_up && feet_together => {
                self.stage = Stage::Closed;
                debug!("jumping jacks: open -> closed, rep");
                MachineStep {
                    rep_delta: 1,
                    stage_changed: true,
                    active,
                }
            }
            _ => MachineStep {
                active,
                ..MachineStep::default()
            },
        }
    }
}

/// Down/up machine driven by a joint angle.
///
/// A rep is counted on the down -> up transition only; crossing the upper
/// threshold without having visited `Down` first never counts.
#[derive(Debug, Clone)]
pub struct ThresholdMachine {
    kind: ExerciseKind,
    down_threshold: f64,
    up_threshold: f64,
    stage: Stage,
}

impl ThresholdMachine {
    pub fn new(kind: ExerciseKind, down_threshold: f64, up_threshold: f64) -> Self {
        Self {
            kind,
            down_threshold,
            up_threshold,
            stage: Stage::Up,
        }
    }

    pub fn pushup() -> Self {
        Self::new(
            ExerciseKind::Pushup,
            PUSHUP_DOWN_THRESHOLD,
            PUSHUP_UP_THRESHOLD,
        )
    }

    pub fn squat() -> Self {
        Self::new(ExerciseKind::Squat, SQUAT_DOWN_THRESHOLD, SQUAT_UP_THRESHOLD)
    }

    pub fn thresholds(&self) -> (f64, f64) {
        (self.down_threshold, self.up_threshold)
    }
}

impl RepCounter for ThresholdMachine {
    fn kind(&self) -> ExerciseKind {
        self.kind
    }

    fn stage(&self) -> Stage {
        self.stage
    }

    fn on_feature(&mut self, feature: Feature, _now: Duration) -> MachineStep {
        let angle = match (self.kind, feature) {
            (ExerciseKind::Pushup, Feature::ElbowAngle(a)) => a,
            (ExerciseKind::Squat, Feature::KneeAngle(a)) => a,
            _ => return MachineStep::default(),
        };

        let active = angle < self.down_threshold;
        if active && self.stage != Stage::Down {
            self.stage = Stage::Down;
            debug!(kind = %self.kind, angle, "stage -> down");
            MachineStep {
                rep_delta: 0,
                stage_changed: true,
                active,
            }
        } else if angle > self.up_threshold && self.stage == Stage::Down {
            self.stage = Stage::Up;
            debug!(kind = %self.kind, angle, "stage -> up, rep");
            MachineStep {
                rep_delta: 1,
                stage_changed: true,
                active,
            }
        } else {
            MachineStep {
                active,
                ..MachineStep::default()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Alternating-knee machine with a minimum spacing between reps
#[derive(Debug, Clone)]
pub struct HighKneesMachine {
    margin: f64,
    cooldown: Duration,
    last_knee: Option<Side>,
    last_rep_at: Option<Duration>,
}

impl HighKneesMachine {
    pub fn new() -> Self {
        Self {
            margin: HIGH_KNEES_MARGIN,
            cooldown: HIGH_KNEES_COOLDOWN,
            last_knee: None,
            last_rep_at: None,
        }
    }

    fn cooled_down(&self, now: Duration) -> bool {
        self.last_rep_at
            .map_or(true, |last| now.saturating_sub(last) > self.cooldown)
    }

    fn count(&mut self, side: Side, now: Duration) -> MachineStep {
        self.last_knee = Some(side);
        self.last_rep_at = Some(now);
        debug!(?side, "high knees rep");
        MachineStep {
            rep_delta: 1,
            stage_changed: true,
            active: true,
        }
    }
}

impl Default for HighKneesMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RepCounter for HighKneesMachine {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::HighKnees
    }

    fn stage(&self) -> Stage {
        match self.last_knee {
            None => Stage::Idle,
            Some(Side::Left) => Stage::LeftLast,
            Some(Side::Right) => Stage::RightLast,
        }
    }

    fn on_feature(&mut self, feature: Feature, now: Duration) -> MachineStep {
        let Feature::KneeHipGap { left, right } = feature else {
            return MachineStep::default();
        };

        let left_up = left < self.margin;
        let right_up = right < self.margin;
        let idle = MachineStep {
            active: left_up || right_up,
            ..MachineStep::default()
        };

        // the right knee is only considered when the left-side check does not apply
        if left_up && self.last_knee != Some(Side::Left) {
            if self.cooled_down(now) {
                return self.count(Side::Left, now);
            }
        } else if right_up && self.last_knee != Some(Side::Right) && self.cooled_down(now) {
            return self.count(Side::Right, now);
        }
        idle
    }
}
