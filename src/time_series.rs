#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub t: f64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(t: f64, value: f64) -> Self {
        Self { t, value }
    }
}

impl From<TimeSeriesPoint> for (f64, f64) {
    fn from(p: TimeSeriesPoint) -> Self {
        (p.t, p.value)
    }
}

/// Pose scores as percentages, one point per scored frame
pub fn pose_score_series(pose_scores: &[f64]) -> Vec<TimeSeriesPoint> {
    pose_scores
        .iter()
        .enumerate()
        .map(|(i, score)| TimeSeriesPoint::new(i as f64, score * 100.0))
        .collect()
}
