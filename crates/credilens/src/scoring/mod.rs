mod bands;
mod config;
mod policy;

pub use bands::{band_score, BAND_SCORES, FLOOR_SCORE};
pub use config::{BandThresholds, ScoringConfig, ScoringConfigError};
pub use policy::{PillarScore, DAMPENING_FACTOR, DAMPENING_MIN_MISSING};

use crate::ratios::{RatioReport, RatioTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Composite score: per-ratio band scores, pillar aggregates and the final
/// weighted score. Null marks "not enough evidence", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub ratio_scores: BTreeMap<String, Option<f64>>,
    pub pillars: BTreeMap<String, PillarScore>,
    pub final_score: Option<f64>,
}

/// Stateless scorer that applies a validated configuration to ratio results.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    /// Validates `config` against `table` once; scoring itself cannot fail.
    pub fn new(config: ScoringConfig, table: &RatioTable) -> Result<Self, ScoringConfigError> {
        config.validate(table)?;
        Ok(Self { config })
    }

    pub fn standard() -> Result<Self, ScoringConfigError> {
        Self::new(ScoringConfig::standard()?, &RatioTable::standard())
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, report: &RatioReport) -> ScoreResult {
        compute_scores(report, &self.config)
    }
}

pub fn compute_scores(report: &RatioReport, config: &ScoringConfig) -> ScoreResult {
    let ratio_scores: BTreeMap<String, Option<f64>> = report
        .ratios
        .iter()
        .map(|(key, result)| {
            let score = match (result.value, config.bands.get(key)) {
                (Some(value), Some(thresholds)) if !result.is_not_available => {
                    Some(policy::round2(band_score(value, thresholds)))
                }
                _ => None,
            };
            (key.clone(), score)
        })
        .collect();

    let pillars: BTreeMap<String, PillarScore> = config
        .ratio_weights
        .iter()
        .map(|(pillar, weights)| {
            (
                pillar.clone(),
                policy::score_pillar(pillar, weights, &ratio_scores),
            )
        })
        .collect();

    let final_score = policy::final_score(&pillars, &config.pillars);

    ScoreResult {
        ratio_scores,
        pillars,
        final_score,
    }
}
