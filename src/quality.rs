use crate::landmark::LandmarkFrame;
use crate::util::mean;

/// Minimum visibility for a landmark to count as tracked
pub const VISIBILITY_FLOOR: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameQuality {
    /// The pipeline returned no landmarks at all
    NoPose,
    /// A pose exists but some required landmark is missing or below the floor
    LowVisibility,
    Usable,
}

impl FrameQuality {
    pub fn is_usable(&self) -> bool {
        matches!(self, FrameQuality::Usable)
    }
}

pub fn is_usable(frame: &LandmarkFrame, required: &[usize]) -> bool {
    !frame.is_empty()
        && required.iter().all(|&idx| {
            frame
                .get(idx)
                .is_some_and(|lm| lm.visibility >= VISIBILITY_FLOOR)
        })
}

pub fn classify(frame: &LandmarkFrame, required: &[usize]) -> FrameQuality {
    if frame.is_empty() {
        FrameQuality::NoPose
    } else if is_usable(frame, required) {
        FrameQuality::Usable
    } else {
        FrameQuality::LowVisibility
    }
}

/// Mean visibility across every landmark in the frame, `None` without a pose
pub fn pose_score(frame: &LandmarkFrame) -> Option<f64> {
    let visibilities: Vec<f64> = frame.landmarks.iter().map(|lm| lm.visibility).collect();
    mean(&visibilities)
}
