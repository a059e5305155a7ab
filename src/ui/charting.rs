use reptrack::scoring::SEGMENT_SECS;

/// Compute X and Y upper bounds for a line chart
pub fn compute_chart_params(coords: &[(f64, f64)], fallback_x: Option<f64>) -> (f64, f64) {
    let mut highest_y = 0.0;
    for &(_, y) in coords {
        if y > highest_y {
            highest_y = y;
        }
    }

    let mut overall_x = match coords.last() {
        Some(x) => x.0,
        None => fallback_x.unwrap_or(1.0),
    };
    if overall_x < 1.0 {
        overall_x = 1.0;
    }

    (overall_x, highest_y.round())
}

/// Bar labels for a reps-per-segment histogram, e.g. "5s" for the 5-10 s bucket
pub fn segment_bars(reps_per_segment: &[u32]) -> Vec<(String, u64)> {
    reps_per_segment
        .iter()
        .enumerate()
        .map(|(i, &reps)| (format!("{}s", i as f64 * SEGMENT_SECS), reps as u64))
        .collect()
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_chart_params_empty() {
        let (x, y) = compute_chart_params(&[], Some(5.0));
        assert_eq!(x, 5.0);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn test_compute_chart_params_uses_last_x_and_max_y() {
        let (x, y) = compute_chart_params(&[(0.0, 80.4), (1.0, 97.6), (2.0, 90.0)], None);
        assert_eq!(x, 2.0);
        assert_eq!(y, 98.0);
    }

    #[test]
    fn test_segment_bars() {
        assert_eq!(
            segment_bars(&[2, 0, 3]),
            vec![("0s".to_string(), 2), ("5s".to_string(), 0), ("10s".to_string(), 3)]
        );
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }
}
