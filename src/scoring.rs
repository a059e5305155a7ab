//! Heuristic workout scoring: stamina tier, calorie estimate and the rep histogram.
//!
//! These are fixed formulas, not physiological models. The calorie estimate is
//! driven by duration and a BMR computed from fixed reference heights; the rep
//! count is accepted but does not enter it.

use crate::exercise::ExerciseKind;
use crate::profile::Gender;
use crate::util::round_to;
use serde::{Deserialize, Serialize};

/// Width of one histogram bucket in seconds
pub const SEGMENT_SECS: f64 = 5.0;
/// Multiplier used when no exercise is known
pub const GENERIC_CALORIE_MULTIPLIER: f64 = 6.0;

const MALE_REFERENCE_HEIGHT_CM: f64 = 170.0;
const FEMALE_REFERENCE_HEIGHT_CM: f64 = 160.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaminaTier {
    NeedsImprovement,
    Average,
    Good,
    Excellent,
    Elite,
}

impl StaminaTier {
    pub fn from_points(points: u32) -> Self {
        if points >= 8 {
            StaminaTier::Elite
        } else if points >= 7 {
            StaminaTier::Excellent
        } else if points >= 5 {
            StaminaTier::Good
        } else if points >= 3 {
            StaminaTier::Average
        } else {
            StaminaTier::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StaminaTier::Elite => "Elite",
            StaminaTier::Excellent => "Excellent",
            StaminaTier::Good => "Good",
            StaminaTier::Average => "Average",
            StaminaTier::NeedsImprovement => "Needs Improvement",
        }
    }

    /// Label with its decorative suffix, for display only
    pub fn badge(&self) -> String {
        let suffix = match self {
            StaminaTier::Elite => "💎",
            StaminaTier::Excellent => "💪",
            StaminaTier::Good => "🙂",
            StaminaTier::Average => "😐",
            StaminaTier::NeedsImprovement => "😓",
        };
        format!("{} {}", self.label(), suffix)
    }
}

impl std::fmt::Display for StaminaTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Additive 0..=8 point score behind [`stamina_tier`]
pub fn stamina_points(
    kind: ExerciseKind,
    age: u32,
    reps: u32,
    duration_secs: f64,
    avg_pose_score: f64,
    pause_secs: f64,
) -> u32 {
    let duration = if duration_secs > 0.0 { duration_secs } else { 1.0 };
    let rep_rate = reps as f64 / duration * 60.0;
    let (rate_low, rate_high) = kind.rep_rate_bands();

    let rate_points = if rep_rate > rate_high {
        2
    } else if rep_rate >= rate_low {
        1
    } else {
        0
    };

    let pose_points = if avg_pose_score > 0.8 {
        2
    } else if avg_pose_score >= 0.6 {
        1
    } else {
        0
    };

    let pause_points = if pause_secs < 5.0 {
        2
    } else if pause_secs < 10.0 {
        1
    } else {
        0
    };

    let age_points = match age {
        0..=24 => 2,
        25..=35 => 1,
        _ => 0,
    };

    rate_points + pose_points + pause_points + age_points
}

/// `weight_kg` is part of the scoring inputs but does not move the tier.
/// `avg_pose_score` is on the 0..1 scale.
pub fn stamina_tier(
    kind: ExerciseKind,
    age: u32,
    _weight_kg: f64,
    reps: u32,
    duration_secs: f64,
    avg_pose_score: f64,
    pause_secs: f64,
) -> StaminaTier {
    StaminaTier::from_points(stamina_points(
        kind,
        age,
        reps,
        duration_secs,
        avg_pose_score,
        pause_secs,
    ))
}

/// Mifflin-St Jeor style BMR with a fixed reference height per gender
pub fn basal_metabolic_rate(weight_kg: f64, age: u32, gender: Gender) -> f64 {
    let age = age as f64;
    match gender {
        Gender::Male => 10.0 * weight_kg + 6.25 * MALE_REFERENCE_HEIGHT_CM - 5.0 * age + 5.0,
        Gender::Female | Gender::Other => {
            10.0 * weight_kg + 6.25 * FEMALE_REFERENCE_HEIGHT_CM - 5.0 * age - 161.0
        }
    }
}

/// Estimated kcal, rounded to two decimals. `None` for `kind` uses the generic multiplier.
pub fn calories_burned(
    _reps: u32,
    duration_secs: f64,
    weight_kg: f64,
    age: u32,
    gender: Gender,
    kind: Option<ExerciseKind>,
) -> f64 {
    if duration_secs == 0.0 {
        return 0.0;
    }
    let calories_per_min = basal_metabolic_rate(weight_kg, age, gender) / 1440.0;
    let multiplier = kind.map_or(GENERIC_CALORIE_MULTIPLIER, |k| k.calorie_multiplier());
    let total = calories_per_min * (duration_secs / 60.0) * (multiplier / 1.5);
    round_to(total, 2)
}

/// Count reps per fixed-width time bucket. Timestamps are seconds since engagement.
pub fn reps_per_segment(rep_timestamps: &[f64], duration_secs: f64) -> Vec<u32> {
    let total = duration_secs.max(1.0);
    let num_segments = (total / SEGMENT_SECS).ceil() as usize;
    let mut counts = vec![0u32; num_segments];
    for &t in rep_timestamps {
        if t < 0.0 || !t.is_finite() {
            continue;
        }
        let idx = (t / SEGMENT_SECS).floor() as usize;
        if let Some(slot) = counts.get_mut(idx) {
            *slot += 1;
        }
    }
    counts
}
