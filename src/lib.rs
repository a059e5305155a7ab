// Library surface for the binary, headless integration tests and reuse.
// The terminal UI lives in the binary and is not exported.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod exercise;
pub mod features;
pub mod landmark;
pub mod machine;
pub mod profile;
pub mod quality;
pub mod recording;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod summary;
pub mod synth;
pub mod time_series;
pub mod timer;
pub mod tracker;
pub mod util;

pub use error::{SessionError, SourceError};
pub use exercise::{ExerciseKind, SourceMode};
pub use landmark::{Landmark, LandmarkFrame};
pub use profile::{ExerciseProfile, Gender};
pub use summary::SessionSummary;
pub use tracker::{FrameOutcome, LiveStatus, RepTracker};
