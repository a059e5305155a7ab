//! Per-exercise geometric features extracted from a landmark frame.
//!
//! Every extractor returns `None` when a landmark it needs is absent; that frame
//! is then skipped by the state machine instead of being treated as an error.

use crate::exercise::ExerciseKind;
use crate::landmark::*;

/// Wrists must rise this far above the shoulders to count as "hands up"
pub const HANDS_UP_MARGIN: f64 = 0.1;
pub const FEET_APART_MIN: f64 = 0.25;
pub const FEET_TOGETHER_MAX: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Feature {
    JumpingJacks {
        hands_up: bool,
        feet_apart: bool,
        feet_together: bool,
    },
    /// Shoulder-elbow-wrist angle in degrees
    ElbowAngle(f64),
    /// Smaller of the two hip-knee-ankle angles in degrees
    KneeAngle(f64),
    /// Vertical distance of each knee from the mean hip height
    KneeHipGap { left: f64, right: f64 },
}

/// Angle at `b` formed by `a` and `c`, folded into [0, 180] degrees
pub fn joint_angle(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    let radians = (c.1 - b.1).atan2(c.0 - b.0) - (a.1 - b.1).atan2(a.0 - b.0);
    let angle = radians.to_degrees().abs();
    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

pub fn extract(kind: ExerciseKind, frame: &LandmarkFrame) -> Option<Feature> {
    match kind {
        ExerciseKind::JumpingJacks => jumping_jacks(frame),
        ExerciseKind::Pushup => elbow_angle(frame).map(Feature::ElbowAngle),
        ExerciseKind::Squat => knee_angle(frame).map(Feature::KneeAngle),
        ExerciseKind::HighKnees => knee_hip_gap(frame),
    }
}

fn jumping_jacks(frame: &LandmarkFrame) -> Option<Feature> {
    let [l_wrist, r_wrist, l_shoulder, r_shoulder, l_ankle, r_ankle] = frame.select([
        LEFT_WRIST,
        RIGHT_WRIST,
        LEFT_SHOULDER,
        RIGHT_SHOULDER,
        LEFT_ANKLE,
        RIGHT_ANKLE,
    ])?;

    let avg_wrist_y = (l_wrist.y + r_wrist.y) / 2.0;
    let avg_shoulder_y = (l_shoulder.y + r_shoulder.y) / 2.0;
    let ankle_dist = (l_ankle.x - r_ankle.x).abs();

    Some(Feature::JumpingJacks {
        hands_up: avg_wrist_y < avg_shoulder_y - HANDS_UP_MARGIN,
        feet_apart: ankle_dist > FEET_APART_MIN,
        feet_together: ankle_dist < FEET_TOGETHER_MAX,
    })
}

fn elbow_angle(frame: &LandmarkFrame) -> Option<f64> {
    let [shoulder, elbow, wrist] = frame.select([LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST])?;
    Some(joint_angle(shoulder.xy(), elbow.xy(), wrist.xy()))
}

fn knee_angle(frame: &LandmarkFrame) -> Option<f64> {
    let [l_hip, l_knee, l_ankle, r_hip, r_knee, r_ankle] = frame.select([
        LEFT_HIP,
        LEFT_KNEE,
        LEFT_ANKLE,
        RIGHT_HIP,
        RIGHT_KNEE,
        RIGHT_ANKLE,
    ])?;
    let left = joint_angle(l_hip.xy(), l_knee.xy(), l_ankle.xy());
    let right = joint_angle(r_hip.xy(), r_knee.xy(), r_ankle.xy());
    Some(left.min(right))
}

fn knee_hip_gap(frame: &LandmarkFrame) -> Option<Feature> {
    let [l_hip, r_hip, l_knee, r_knee] = frame.select([LEFT_HIP, RIGHT_HIP, LEFT_KNEE, RIGHT_KNEE])?;
    let hip_y = (l_hip.y + r_hip.y) / 2.0;
    Some(Feature::KneeHipGap {
        left: (l_knee.y - hip_y).abs(),
        right: (r_knee.y - hip_y).abs(),
    })
}
