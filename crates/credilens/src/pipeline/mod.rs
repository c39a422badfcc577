//! End-to-end analysis of one filing: QA, ratios, scores and the click map,
//! plus the flat on-disk layout the results are published in.

mod export;
mod store;

pub use export::{write_ratio_csv, RATIO_CSV_HEADERS};
pub use store::{ArtifactError, ArtifactIndex, ArtifactStore, ARTIFACT_FILES};

use crate::config::{AnalysisConfig, DEFAULT_VIEWER_ROUTE};
use crate::error::AppError;
use crate::filing::FilingDocument;
use crate::provenance::ClickMap;
use crate::qa::{run_all_checks, QaIssue};
use crate::ratios::{RatioEngine, RatioReport, RatioTable};
use crate::scoring::{ScoreResult, ScoringConfig, ScoringConfigError, ScoringEngine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Everything derived from one filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub doc_id: String,
    pub document: FilingDocument,
    pub qa_issues: Vec<QaIssue>,
    pub ratios: RatioReport,
    pub score: ScoreResult,
    pub click_map: ClickMap,
}

impl Analysis {
    pub fn failed_checks(&self) -> impl Iterator<Item = &QaIssue> {
        self.qa_issues.iter().filter(|issue| !issue.passed)
    }
}

/// Immutable engines shared by every analysis; holds no per-document state.
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    ratios: RatioEngine,
    scoring: ScoringEngine,
    viewer_route: String,
}

impl AnalysisPipeline {
    pub fn new(ratios: RatioEngine, scoring: ScoringEngine, viewer_route: impl Into<String>) -> Self {
        Self {
            ratios,
            scoring,
            viewer_route: viewer_route.into(),
        }
    }

    /// Shipped ratio table and scoring configuration.
    pub fn standard() -> Result<Self, ScoringConfigError> {
        Ok(Self::new(
            RatioEngine::default(),
            ScoringEngine::standard()?,
            DEFAULT_VIEWER_ROUTE,
        ))
    }

    /// Loads the configured overrides; the scoring configuration is
    /// validated against whichever ratio table ends up in use.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, AppError> {
        let table = match &config.ratio_table {
            Some(path) => RatioTable::from_path(path)?,
            None => RatioTable::standard(),
        };
        let scoring = match &config.scoring_config {
            Some(path) => ScoringConfig::from_path(path)?,
            None => ScoringConfig::standard()?,
        };
        let scoring = ScoringEngine::new(scoring, &table)?;

        Ok(Self::new(
            RatioEngine::new(table),
            scoring,
            config.viewer_route.clone(),
        ))
    }

    pub fn ratio_table(&self) -> &RatioTable {
        self.ratios.table()
    }

    pub fn viewer_route(&self) -> &str {
        &self.viewer_route
    }

    pub fn analyze(&self, doc_id: &str, document: FilingDocument) -> Analysis {
        let qa_issues = run_all_checks(&document);
        let ratios = self.ratios.compute(&document);
        let score = self.scoring.score(&ratios);
        let click_map = document
            .provenance
            .click_map(&self.viewer_route, Some(doc_id), &[]);

        info!(
            %doc_id,
            available_ratios = ratios.available_count(),
            final_score = ?score.final_score,
            failed_checks = qa_issues.iter().filter(|issue| !issue.passed).count(),
            "document analyzed"
        );

        Analysis {
            doc_id: doc_id.to_string(),
            document,
            qa_issues,
            ratios,
            score,
            click_map,
        }
    }
}

/// `<unix-seconds>-<6 hex digits>`. Ids sort chronologically by name.
pub fn new_doc_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", now.timestamp(), &suffix[..6])
}
