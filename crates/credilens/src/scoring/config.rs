use crate::ratios::RatioTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

const STANDARD_SCORING_YAML: &str = include_str!("../../config/scoring.yaml");

/// Minimum values for each band, best first. Unset thresholds are skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BandThresholds {
    #[serde(rename = "A_min", default, skip_serializing_if = "Option::is_none")]
    pub a_min: Option<f64>,
    #[serde(rename = "B_min", default, skip_serializing_if = "Option::is_none")]
    pub b_min: Option<f64>,
    #[serde(rename = "C_min", default, skip_serializing_if = "Option::is_none")]
    pub c_min: Option<f64>,
    #[serde(rename = "D_min", default, skip_serializing_if = "Option::is_none")]
    pub d_min: Option<f64>,
}

impl BandThresholds {
    pub fn new(a_min: f64, b_min: f64, c_min: f64, d_min: f64) -> Self {
        Self {
            a_min: Some(a_min),
            b_min: Some(b_min),
            c_min: Some(c_min),
            d_min: Some(d_min),
        }
    }

    pub(crate) fn ordered(&self) -> [Option<f64>; 4] {
        [self.a_min, self.b_min, self.c_min, self.d_min]
    }

    fn is_descending(&self) -> bool {
        let set: Vec<f64> = self.ordered().into_iter().flatten().collect();
        set.windows(2).all(|pair| pair[0] >= pair[1])
    }
}

/// Bands, pillar composition and pillar weights for the composite score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub bands: BTreeMap<String, BandThresholds>,
    /// pillar -> ratio -> weight
    #[serde(default)]
    pub ratio_weights: BTreeMap<String, BTreeMap<String, f64>>,
    /// pillar -> weight in the final score
    #[serde(default)]
    pub pillars: BTreeMap<String, f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("failed to read scoring configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scoring configuration YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{scope} references ratio {ratio}, which the ratio table does not define")]
    UnknownRatio { scope: String, ratio: String },
    #[error("{scope} weight must be a positive finite number, found {weight}")]
    InvalidWeight { scope: String, weight: f64 },
    #[error("band thresholds for {ratio} must be finite numbers")]
    InvalidThreshold { ratio: String },
}

impl ScoringConfig {
    /// The configuration shipped with the crate.
    pub fn standard() -> Result<Self, ScoringConfigError> {
        Self::from_yaml_str(STANDARD_SCORING_YAML)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScoringConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ScoringConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Checks the configuration against the ratio table once, at load time.
    ///
    /// Empty pillar maps and pillars without a top-level weight are legal:
    /// they score null or drop out of the final score instead of failing.
    pub fn validate(&self, table: &RatioTable) -> Result<(), ScoringConfigError> {
        for (ratio, thresholds) in &self.bands {
            if !table.contains(ratio) {
                return Err(ScoringConfigError::UnknownRatio {
                    scope: "bands".to_string(),
                    ratio: ratio.clone(),
                });
            }
            if thresholds
                .ordered()
                .into_iter()
                .flatten()
                .any(|threshold| !threshold.is_finite())
            {
                return Err(ScoringConfigError::InvalidThreshold {
                    ratio: ratio.clone(),
                });
            }
            if !thresholds.is_descending() {
                warn!(%ratio, "band thresholds are not ordered best to worst");
            }
        }

        for (pillar, weights) in &self.ratio_weights {
            if weights.is_empty() {
                warn!(%pillar, "pillar has no ratios and will always score null");
            }
            for (ratio, weight) in weights {
                if !table.contains(ratio) {
                    return Err(ScoringConfigError::UnknownRatio {
                        scope: format!("pillar {pillar}"),
                        ratio: ratio.clone(),
                    });
                }
                check_weight(&format!("pillar {pillar} ratio {ratio}"), *weight)?;
                if !self.bands.contains_key(ratio) {
                    warn!(%pillar, %ratio, "weighted ratio has no bands and will always score null");
                }
            }
        }

        for (pillar, weight) in &self.pillars {
            check_weight(&format!("pillar {pillar}"), *weight)?;
            if !self.ratio_weights.contains_key(pillar) {
                warn!(%pillar, "weighted pillar has no ratio weights and is excluded");
            }
        }

        Ok(())
    }
}

fn check_weight(scope: &str, weight: f64) -> Result<(), ScoringConfigError> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(ScoringConfigError::InvalidWeight {
            scope: scope.to_string(),
            weight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_configuration_loads_and_validates() {
        let config = ScoringConfig::standard().expect("embedded config parses");
        config
            .validate(&RatioTable::standard())
            .expect("embedded config validates");

        assert_eq!(config.pillars.len(), 5);
        assert_eq!(
            config.bands["CURRENT_RATIO"],
            BandThresholds::new(2.0, 1.5, 1.2, 1.0)
        );
        assert!(config.ratio_weights["leverage"].contains_key("INTEREST_COVERAGE"));
    }

    #[test]
    fn rejects_ratios_missing_from_the_table() {
        let config = ScoringConfig::from_yaml_str(
            "ratio_weights:\n  returns:\n    RETURN_ON_EQUITY: 1.0\npillars:\n  returns: 1.0\n",
        )
        .expect("parses");

        match config.validate(&RatioTable::standard()) {
            Err(ScoringConfigError::UnknownRatio { scope, ratio }) => {
                assert_eq!(scope, "pillar returns");
                assert_eq!(ratio, "RETURN_ON_EQUITY");
            }
            other => panic!("expected unknown ratio, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_positive_weights() {
        let config =
            ScoringConfig::from_yaml_str("pillars:\n  liquidity: -0.5\n").expect("parses");
        assert!(matches!(
            config.validate(&RatioTable::standard()),
            Err(ScoringConfigError::InvalidWeight { weight, .. }) if weight == -0.5
        ));

        let config = ScoringConfig::from_yaml_str(
            "ratio_weights:\n  liquidity:\n    CURRENT_RATIO: 0\n",
        )
        .expect("parses");
        assert!(matches!(
            config.validate(&RatioTable::standard()),
            Err(ScoringConfigError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn tolerates_empty_pillars_and_partial_bands() {
        let config = ScoringConfig::from_yaml_str(
            "bands:\n  CURRENT_RATIO: { A_min: 2.0, D_min: 1.0 }\nratio_weights:\n  liquidity: {}\npillars:\n  liquidity: 1.0\n  orphan: 0.5\n",
        )
        .expect("parses");

        config
            .validate(&RatioTable::standard())
            .expect("non-fatal oddities only warn");
        assert_eq!(config.bands["CURRENT_RATIO"].b_min, None);
    }

    #[test]
    fn reports_missing_file() {
        assert!(matches!(
            ScoringConfig::from_path("./missing-scoring.yaml"),
            Err(ScoringConfigError::Io(_))
        ));
    }
}
