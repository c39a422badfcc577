use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Pillars missing at least this many configured ratios are dampened.
pub const DAMPENING_MIN_MISSING: usize = 2;
pub const DAMPENING_FACTOR: f64 = 0.8;

/// Aggregate score for one pillar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarScore {
    pub score: Option<f64>,
    pub is_not_available: bool,
    /// Configured ratios of this pillar that scored null.
    pub missing_input_count: usize,
    pub dampened: bool,
}

pub(crate) fn score_pillar(
    pillar: &str,
    weights: &BTreeMap<String, f64>,
    ratio_scores: &BTreeMap<String, Option<f64>>,
) -> PillarScore {
    let mut weighted_total = 0.0;
    let mut total_weight = 0.0;
    let mut missing_input_count = 0;

    for (ratio, weight) in weights {
        match ratio_scores.get(ratio).copied().flatten() {
            Some(score) => {
                weighted_total += score * weight;
                total_weight += weight;
            }
            None => missing_input_count += 1,
        }
    }

    if total_weight <= 0.0 {
        return PillarScore {
            score: None,
            is_not_available: true,
            missing_input_count,
            dampened: false,
        };
    }

    let mean = round2(weighted_total / total_weight);
    let dampened = missing_input_count >= DAMPENING_MIN_MISSING;
    // Dampening applies to the already rounded mean.
    let score = if dampened {
        let damped = round2(mean * DAMPENING_FACTOR);
        debug!(%pillar, missing_input_count, mean, damped, "dampened low-evidence pillar");
        damped
    } else {
        mean
    };

    PillarScore {
        score: Some(score),
        is_not_available: false,
        missing_input_count,
        dampened,
    }
}

/// Weight-normalized mean over pillars with a score; null pillars are left
/// out of both numerator and denominator.
pub(crate) fn final_score(
    pillars: &BTreeMap<String, PillarScore>,
    weights: &BTreeMap<String, f64>,
) -> Option<f64> {
    let (weighted_total, total_weight) = weights
        .iter()
        .filter_map(|(pillar, weight)| {
            pillars
                .get(pillar)
                .and_then(|scored| scored.score)
                .map(|score| (score * weight, *weight))
        })
        .fold((0.0, 0.0), |(sum, total), (weighted, weight)| {
            (sum + weighted, total + weight)
        });

    (total_weight > 0.0).then(|| round2(weighted_total / total_weight))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
