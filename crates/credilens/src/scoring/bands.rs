use super::config::BandThresholds;

/// Score earned at each threshold, best band first.
pub const BAND_SCORES: [f64; 4] = [95.0, 85.0, 70.0, 55.0];
/// Score for a value below every configured threshold.
pub const FLOOR_SCORE: f64 = 40.0;

/// Stepped band score: the first threshold (best to worst) that `value`
/// meets decides the score. Thresholds are not interpolated.
pub fn band_score(value: f64, thresholds: &BandThresholds) -> f64 {
    thresholds
        .ordered()
        .into_iter()
        .zip(BAND_SCORES)
        .find_map(|(threshold, score)| match threshold {
            Some(minimum) if value >= minimum => Some(score),
            _ => None,
        })
        .unwrap_or(FLOOR_SCORE)
}
