use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reptrack::landmark::{Landmark, LandmarkFrame, POSE_LANDMARK_COUNT};
use reptrack::quality::is_usable;
use reptrack::session::SessionConfig;
use reptrack::synth::pose_at;
use reptrack::{ExerciseKind, ExerciseProfile, RepTracker, SourceMode};

/// Mix of real poses, jittered poses, low visibility and lost frames
fn random_frame(rng: &mut StdRng, kind: ExerciseKind, t: f64) -> LandmarkFrame {
    match rng.gen_range(0..10) {
        0 => LandmarkFrame::no_pose(),
        1 => LandmarkFrame::new(
            (0..POSE_LANDMARK_COUNT)
                .map(|_| {
                    Landmark::new(
                        rng.gen_range(0.0..1.0),
                        rng.gen_range(0.0..1.0),
                        0.0,
                        rng.gen_range(0.0..1.0),
                    )
                })
                .collect(),
        ),
        2 => LandmarkFrame::new(
            pose_at(kind, t)
                .iter()
                .map(|&(x, y)| Landmark::new(x, y, 0.0, rng.gen_range(0.0..0.6)))
                .collect(),
        ),
        _ => LandmarkFrame::new(
            pose_at(kind, t)
                .iter()
                .map(|&(x, y)| {
                    Landmark::new(
                        x + rng.gen_range(-0.02..0.02),
                        y + rng.gen_range(-0.02..0.02),
                        0.0,
                        rng.gen_range(0.5..1.0),
                    )
                })
                .collect(),
        ),
    }
}

fn random_session(seed: u64, kind: ExerciseKind, mode: SourceMode) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tracker = RepTracker::for_mode(kind, ExerciseProfile::guest(), mode).unwrap();
    let frames = rng.gen_range(50..600);

    let mut t = 0.0;
    let mut last_reps = 0;
    let mut last_pause = Duration::ZERO;
    for _ in 0..frames {
        t += rng.gen_range(0.01..0.1);
        let now = Duration::from_secs_f64(t);
        let frame = random_frame(&mut rng, kind, t);
        let usable = is_usable(&frame, kind.required_landmarks());
        tracker.on_frame(&frame, now);

        let state = tracker.state();
        // monotone count, one timestamp per rep
        assert!(state.rep_count >= last_reps);
        assert_eq!(state.rep_count as usize, state.rep_timestamps.len());
        last_reps = state.rep_count;

        if !state.ended {
            // a usable frame always closes the pause, an unusable one keeps it open
            if usable {
                assert!(state.timer.pause_started_at.is_none());
            } else if state.timer.is_engaged() {
                assert!(state.timer.pause_started_at.is_some());
            }
            // closed pause time only grows when a pause ends
            if state.timer.pause_accumulated > last_pause {
                assert!(usable);
            }
            last_pause = state.timer.pause_accumulated;
        }
    }

    let stop_at = Duration::from_secs_f64(t + 0.5);
    let summary = tracker.stop(stop_at);
    assert_eq!(summary.rep_count as usize, tracker.state().rep_timestamps.len());
    assert!(summary.active_secs >= 0.0);
    // total is rounded to whole seconds
    assert!(
        (summary.active_secs + summary.pause_secs - summary.total_duration_secs).abs() <= 0.501,
        "{summary:?}"
    );
    assert!(summary.avg_pose_score >= 0.0 && summary.avg_pose_score <= 1.0);
    let segments: u32 = summary.reps_per_segment.iter().sum();
    assert!(segments <= summary.rep_count);

    // frozen after the first stop
    let again = tracker.stop(stop_at + Duration::from_secs(10));
    assert_eq!(summary, again);
}

#[test]
fn random_sessions_keep_invariants() {
    for seed in 0..40 {
        for kind in ExerciseKind::ALL {
            random_session(seed, kind, SourceMode::File);
        }
    }
}

#[test]
fn random_live_high_knees_sessions_keep_invariants() {
    for seed in 100..120 {
        random_session(seed, ExerciseKind::HighKnees, SourceMode::Live);
    }
}

#[test]
fn never_engaged_session_is_degenerate() {
    let mut tracker = RepTracker::new(
        ExerciseKind::Squat,
        ExerciseProfile::guest(),
        SessionConfig::default(),
    )
    .unwrap();
    for i in 0..20 {
        tracker.on_frame(&LandmarkFrame::no_pose(), Duration::from_millis(i * 100));
    }
    let summary = tracker.stop(Duration::from_secs(5));
    assert_eq!(summary.rep_count, 0);
    assert_eq!(summary.total_duration_secs, 0.0);
    assert_eq!(summary.pause_secs, 0.0);
    assert_eq!(summary.calories_kcal, 0.0);
    assert_eq!(summary.avg_pose_score, 0.0);
}

#[test]
fn reset_starts_a_fresh_session() {
    let kind = ExerciseKind::Pushup;
    let mut tracker = RepTracker::for_mode(kind, ExerciseProfile::guest(), SourceMode::File).unwrap();
    let mut t = 0.0;
    while t < 6.0 {
        let frame = LandmarkFrame::new(
            pose_at(kind, t)
                .iter()
                .map(|&(x, y)| Landmark::new(x, y, 0.0, 1.0))
                .collect(),
        );
        tracker.on_frame(&frame, Duration::from_secs_f64(t));
        t += 0.1;
    }
    assert!(tracker.rep_count() > 0);
    let first = tracker.stop(Duration::from_secs(6));

    tracker.reset();
    assert_eq!(tracker.rep_count(), 0);
    assert!(tracker.state().pose_scores.is_empty());
    let second = tracker.stop(Duration::from_secs(7));
    assert_ne!(first, second);
    assert_eq!(second.rep_count, 0);
}
