use std::sync::mpsc;
use std::time::Duration;

use reptrack::landmark::*;
use reptrack::runtime::{ChannelFrameSource, FrameSource, Runner, RunnerEvent};
use reptrack::synth::{pose_at, SyntheticSource};
use reptrack::timer::ManualClock;
use reptrack::{ExerciseKind, ExerciseProfile, SourceMode};

fn clean_frame(kind: ExerciseKind, t: f64) -> LandmarkFrame {
    LandmarkFrame::new(
        pose_at(kind, t)
            .iter()
            .map(|&(x, y)| Landmark::new(x, y, 0.0, 0.95))
            .collect(),
    )
}

fn demo_session(kind: ExerciseKind, secs: u64) -> reptrack::SessionSummary {
    let source = SyntheticSource::new(kind, 11)
        .dropout(0.0)
        .duration(Duration::from_secs(secs));
    let mut runner = Runner::start(source, kind, ExerciseProfile::guest()).unwrap();
    runner.run()
}

// Headless integration using the runtime without a camera or TTY.
// A producer pushes frames over the channel while the test advances the clock.
#[test]
fn headless_live_flow_counts_reps() {
    let kind = ExerciseKind::Squat;
    let (tx, rx) = mpsc::channel();
    let clock = ManualClock::new();
    let source = ChannelFrameSource::new(rx, clock.clone(), Duration::from_millis(5));
    let mut runner = Runner::start(source, kind, ExerciseProfile::guest()).unwrap();
    assert_eq!(runner.mode(), SourceMode::Live);

    let mut t = 0.0;
    while t <= 9.0 {
        clock.set(Duration::from_secs_f64(t));
        tx.send(clean_frame(kind, t)).unwrap();
        match runner.step() {
            RunnerEvent::Frame(_) => {}
            other => panic!("expected a frame, got {other:?}"),
        }
        t += 0.1;
    }
    assert_eq!(runner.step(), RunnerEvent::Tick);

    drop(tx);
    let summary = runner.run();
    assert_eq!(summary.rep_count, 3);
    assert_eq!(summary.pause_secs, 0.0);
}

#[test]
fn headless_live_flow_tracks_camera_dropout() {
    let kind = ExerciseKind::Pushup;
    let (tx, rx) = mpsc::channel();
    let clock = ManualClock::new();
    let source = ChannelFrameSource::new(rx, clock.clone(), Duration::from_millis(5));
    let mut runner = Runner::start(source, kind, ExerciseProfile::guest()).unwrap();

    let mut t: f64 = 0.0;
    while t <= 6.0 {
        clock.set(Duration::from_secs_f64(t));
        // the person leaves the frame between 3 and 4 seconds
        let frame = if (3.0..4.0).contains(&t) {
            LandmarkFrame::no_pose()
        } else {
            clean_frame(kind, t)
        };
        tx.send(frame).unwrap();
        runner.step();
        t += 0.25;
    }
    let summary = runner.stop();

    assert_eq!(summary.pause_secs, 1.0);
    assert!(summary.active_secs < summary.total_duration_secs);
}

#[test]
fn synthetic_squats() {
    // 3 s cycle, one rep per cycle
    let summary = demo_session(ExerciseKind::Squat, 30);
    assert!((9..=10).contains(&summary.rep_count), "{}", summary.rep_count);
    assert_eq!(summary.pause_secs, 0.0);
}

#[test]
fn synthetic_pushups() {
    // 2.5 s cycle
    let summary = demo_session(ExerciseKind::Pushup, 20);
    assert!((7..=8).contains(&summary.rep_count), "{}", summary.rep_count);
}

#[test]
fn synthetic_jumping_jacks() {
    // 1.5 s cycle
    let summary = demo_session(ExerciseKind::JumpingJacks, 20);
    assert!((12..=13).contains(&summary.rep_count), "{}", summary.rep_count);
}

#[test]
fn synthetic_high_knees() {
    // 1.2 s cycle, a left and a right rep each
    let summary = demo_session(ExerciseKind::HighKnees, 20);
    assert!((32..=34).contains(&summary.rep_count), "{}", summary.rep_count);
}

#[test]
fn synthetic_live_high_knees_stop_at_cap() {
    let kind = ExerciseKind::HighKnees;
    let source = SyntheticSource::new(kind, 5)
        .dropout(0.0)
        .duration(Duration::from_secs(60))
        .mode(SourceMode::Live);
    let mut runner = Runner::start(source, kind, ExerciseProfile::guest()).unwrap();
    let summary = runner.run();

    assert_eq!(summary.total_duration_secs, 30.0);
    assert!(runner.tracker().is_ended());
    // no frame after the cap was counted
    assert_eq!(runner.stop(), summary);
}

#[test]
fn synthetic_dropouts_become_pause_time() {
    let kind = ExerciseKind::JumpingJacks;
    let source = SyntheticSource::new(kind, 99)
        .dropout(0.2)
        .duration(Duration::from_secs(20));
    let mut runner = Runner::start(source, kind, ExerciseProfile::guest()).unwrap();
    let summary = runner.run();

    assert!(summary.pause_secs > 0.0);
    assert!(summary.rep_count > 0);
    let state = runner.tracker().state();
    assert!(state.usable_frames < state.frames_seen);
}

#[test]
fn boxed_sources_are_interchangeable() {
    let sources: Vec<Box<dyn FrameSource>> = vec![
        Box::new(SyntheticSource::new(ExerciseKind::Squat, 1).duration(Duration::from_secs(3))),
        Box::new(SyntheticSource::new(ExerciseKind::Squat, 2).duration(Duration::from_secs(3))),
    ];
    for source in sources {
        let mut runner = Runner::start(source, ExerciseKind::Squat, ExerciseProfile::guest()).unwrap();
        let summary = runner.run();
        assert!(summary.rep_count <= 1);
    }
}
