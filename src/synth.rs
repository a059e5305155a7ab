//! Seeded synthetic pose pipeline.
//!
//! Produces plausible landmark frames for each exercise so the engine can be
//! demoed and exercised without a camera. Same seed, same frames.

use std::f64::consts::TAU;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::SourceError;
use crate::exercise::{ExerciseKind, SourceMode};
use crate::landmark::*;
use crate::runtime::{DeliveredFrame, FrameSource, SourceEvent};

pub const DEFAULT_FPS: f64 = 30.0;
pub const DEFAULT_DURATION: Duration = Duration::from_secs(20);
pub const DEFAULT_DROPOUT: f64 = 0.02;

const POSITION_NOISE: f64 = 0.004;
const MIN_VISIBILITY: f64 = 0.7;

/// Seconds for one full movement cycle
fn cycle_secs(kind: ExerciseKind) -> f64 {
    match kind {
        ExerciseKind::JumpingJacks => 1.5,
        ExerciseKind::Pushup => 2.5,
        ExerciseKind::Squat => 3.0,
        // one cycle is a left and a right knee lift
        ExerciseKind::HighKnees => 1.2,
    }
}

/// Wrist or ankle position for a joint at `angle_deg`, given the direction
/// of the upper segment is straight up from the middle joint
fn hinge(joint: (f64, f64), angle_deg: f64, length: f64) -> (f64, f64) {
    let theta = angle_deg.to_radians();
    (joint.0 + length * theta.sin(), joint.1 - length * theta.cos())
}

/// Standing pose, everything centred and facing the camera
fn standing() -> [(f64, f64); POSE_LANDMARK_COUNT] {
    let mut pose = [(0.5, 0.15); POSE_LANDMARK_COUNT];
    pose[LEFT_SHOULDER] = (0.42, 0.3);
    pose[RIGHT_SHOULDER] = (0.58, 0.3);
    pose[LEFT_ELBOW] = (0.4, 0.42);
    pose[RIGHT_ELBOW] = (0.6, 0.42);
    pose[LEFT_WRIST] = (0.4, 0.55);
    pose[RIGHT_WRIST] = (0.6, 0.55);
    pose[LEFT_HIP] = (0.45, 0.5);
    pose[RIGHT_HIP] = (0.55, 0.5);
    pose[LEFT_KNEE] = (0.45, 0.7);
    pose[RIGHT_KNEE] = (0.55, 0.7);
    pose[LEFT_ANKLE] = (0.45, 0.9);
    pose[RIGHT_ANKLE] = (0.55, 0.9);
    pose
}

/// Noise-free pose for `kind` at `t` seconds into the movement
pub fn pose_at(kind: ExerciseKind, t: f64) -> [(f64, f64); POSE_LANDMARK_COUNT] {
    let phase = TAU * t / cycle_secs(kind);
    let mut pose = standing();
    match kind {
        ExerciseKind::JumpingJacks => {
            // 0 = closed, 1 = fully open
            let spread = (1.0 - phase.cos()) / 2.0;
            let wrist_y = 0.55 - 0.45 * spread;
            pose[LEFT_WRIST] = (0.4 - 0.1 * spread, wrist_y);
            pose[RIGHT_WRIST] = (0.6 + 0.1 * spread, wrist_y);
            pose[LEFT_ANKLE].0 = 0.45 - 0.1 * spread;
            pose[RIGHT_ANKLE].0 = 0.55 + 0.1 * spread;
        }
        ExerciseKind::Pushup => {
            let angle = 120.0 + 55.0 * phase.cos();
            pose[LEFT_ELBOW] = (0.42, 0.5);
            pose[LEFT_WRIST] = hinge(pose[LEFT_ELBOW], angle, 0.18);
            pose[RIGHT_ELBOW] = (0.58, 0.5);
            pose[RIGHT_WRIST] = hinge(pose[RIGHT_ELBOW], angle, 0.18);
        }
        ExerciseKind::Squat => {
            let angle = 120.0 + 55.0 * phase.cos();
            for (knee, ankle) in [(LEFT_KNEE, LEFT_ANKLE), (RIGHT_KNEE, RIGHT_ANKLE)] {
                pose[ankle] = hinge(pose[knee], angle, 0.2);
            }
        }
        ExerciseKind::HighKnees => {
            let lift = phase.sin();
            pose[LEFT_KNEE].1 = 0.7 - 0.2 * lift.max(0.0);
            pose[RIGHT_KNEE].1 = 0.7 - 0.2 * (-lift).max(0.0);
        }
    }
    pose
}

/// Frame source that generates an exercise from a seeded RNG
#[derive(Debug)]
pub struct SyntheticSource {
    kind: ExerciseKind,
    rng: StdRng,
    mode: SourceMode,
    fps: f64,
    duration: Duration,
    dropout: f64,
    index: u64,
    last_at: Duration,
    closed: bool,
}

impl SyntheticSource {
    pub fn new(kind: ExerciseKind, seed: u64) -> Self {
        Self {
            kind,
            rng: StdRng::seed_from_u64(seed),
            mode: SourceMode::File,
            fps: DEFAULT_FPS,
            duration: DEFAULT_DURATION,
            dropout: DEFAULT_DROPOUT,
            index: 0,
            last_at: Duration::ZERO,
            closed: false,
        }
    }

    pub fn fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Probability that any given frame has no detected pose
    pub fn dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    pub fn mode(mut self, mode: SourceMode) -> Self {
        self.mode = mode;
        self
    }

    fn generate(&mut self, t: f64) -> LandmarkFrame {
        if self.dropout > 0.0 && self.rng.gen_bool(self.dropout.min(1.0)) {
            return LandmarkFrame::no_pose();
        }
        let landmarks = pose_at(self.kind, t)
            .iter()
            .map(|&(x, y)| {
                let x = x + self.rng.gen_range(-POSITION_NOISE..=POSITION_NOISE);
                let y = y + self.rng.gen_range(-POSITION_NOISE..=POSITION_NOISE);
                let visibility = self.rng.gen_range(MIN_VISIBILITY..=1.0);
                Landmark::new(x, y, 0.0, visibility)
            })
            .collect();
        LandmarkFrame::new(landmarks)
    }
}

impl FrameSource for SyntheticSource {
    fn mode(&self) -> SourceMode {
        self.mode
    }

    fn open(&mut self) -> Result<(), SourceError> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(SourceError::Unavailable(format!(
                "synthetic source needs a positive frame rate, got {}",
                self.fps
            )));
        }
        if !(0.0..=1.0).contains(&self.dropout) {
            return Err(SourceError::Unavailable(format!(
                "dropout must be within 0..=1, got {}",
                self.dropout
            )));
        }
        Ok(())
    }

    fn next_frame(&mut self) -> SourceEvent {
        if self.closed {
            return SourceEvent::Exhausted;
        }
        let t = self.index as f64 / self.fps;
        let at = Duration::from_secs_f64(t);
        if at > self.duration {
            return SourceEvent::Exhausted;
        }
        self.index += 1;
        self.last_at = at;
        SourceEvent::Frame(DeliveredFrame {
            frame: self.generate(t),
            at,
            sequence: self.index,
        })
    }

    fn now(&self) -> Duration {
        self.last_at
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
