use super::export::write_ratio_csv;
use super::Analysis;
use crate::ratios::RatioTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const PARSED_FILE: &str = "parsed_extracted10k.json";
pub const QA_FILE: &str = "qa.json";
pub const RATIOS_JSON_FILE: &str = "ratios.json";
pub const RATIOS_CSV_FILE: &str = "ratios.csv";
pub const SCORE_FILE: &str = "score.json";
pub const CLICKMAP_FILE: &str = "clickmap.json";
pub const INDEX_FILE: &str = "index.json";

/// Files written for every analyzed document.
pub const ARTIFACT_FILES: [&str; 7] = [
    PARSED_FILE,
    QA_FILE,
    RATIOS_JSON_FILE,
    RATIOS_CSV_FILE,
    SCORE_FILE,
    CLICKMAP_FILE,
    INDEX_FILE,
];

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode artifact JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write ratio CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("document id '{0}' cannot be used as a directory name")]
    InvalidDocId(String),
}

/// Summary record stored next to each document's artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactIndex {
    pub doc_id: String,
    pub company: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// Flat directory-per-document layout under a single outputs root.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_dir(&self, doc_id: &str) -> Result<PathBuf, ArtifactError> {
        let valid = !doc_id.is_empty()
            && doc_id != "."
            && doc_id != ".."
            && !doc_id.contains(['/', '\\']);
        if valid {
            Ok(self.root.join(doc_id))
        } else {
            Err(ArtifactError::InvalidDocId(doc_id.to_string()))
        }
    }

    /// Writes every artifact for `analysis`, replacing earlier files with the
    /// same document id. Returns the document directory.
    pub fn write(
        &self,
        analysis: &Analysis,
        table: &RatioTable,
        generated_at: DateTime<Utc>,
    ) -> Result<PathBuf, ArtifactError> {
        let dir = self.document_dir(&analysis.doc_id)?;
        fs::create_dir_all(&dir)?;

        write_json(&dir.join(PARSED_FILE), &analysis.document)?;
        write_json(
            &dir.join(QA_FILE),
            &json!({ "qa_issues": analysis.qa_issues }),
        )?;
        write_json(&dir.join(RATIOS_JSON_FILE), &analysis.ratios)?;
        write_json(&dir.join(SCORE_FILE), &analysis.score)?;
        write_json(&dir.join(CLICKMAP_FILE), &analysis.click_map)?;

        let csv_file = File::create(dir.join(RATIOS_CSV_FILE))?;
        write_ratio_csv(BufWriter::new(csv_file), &analysis.ratios, table)?;

        let index = ArtifactIndex {
            doc_id: analysis.doc_id.clone(),
            company: analysis.document.company.name.clone(),
            generated_at,
        };
        write_json(&dir.join(INDEX_FILE), &index)?;

        info!(doc_id = %analysis.doc_id, dir = %dir.display(), "artifacts written");
        Ok(dir)
    }

    pub fn index(&self, doc_id: &str) -> Result<ArtifactIndex, ArtifactError> {
        let path = self.document_dir(doc_id)?.join(INDEX_FILE);
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Most recent document ids first. A missing outputs root is empty.
    pub fn recent(&self, limit: usize) -> Result<Vec<String>, ArtifactError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(root = %self.root.display(), "no outputs directory yet");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                ids.push(name.to_string());
            }
        }
        ids.sort_unstable_by(|a, b| b.cmp(a));
        ids.truncate(limit);
        Ok(ids)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::AnalysisPipeline;
    use crate::filing::FilingDocument;
    use chrono::TimeZone;

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn write_produces_every_artifact() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = ArtifactStore::new(dir.path().join("outputs"));
        let pipeline = AnalysisPipeline::standard().expect("pipeline builds");

        let mut document = FilingDocument::default();
        document.company.name = Some("Acme Corp".to_string());
        let analysis = pipeline.analyze("1709294400-abc123", document);

        let written = store
            .write(&analysis, pipeline.ratio_table(), generated_at())
            .expect("artifacts written");

        for file in ARTIFACT_FILES {
            assert!(written.join(file).is_file(), "{file} missing");
        }

        let qa: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(written.join(QA_FILE)).expect("qa readable"),
        )
        .expect("qa parses");
        assert_eq!(qa["qa_issues"].as_array().map(Vec::len), Some(2));

        let index = store.index("1709294400-abc123").expect("index readable");
        assert_eq!(index.company.as_deref(), Some("Acme Corp"));
        assert_eq!(index.generated_at, generated_at());
    }

    #[test]
    fn recent_lists_newest_first_and_ignores_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = ArtifactStore::new(dir.path());
        for id in ["1700000000-aaaaaa", "1710000000-bbbbbb", "1705000000-cccccc"] {
            fs::create_dir_all(dir.path().join(id)).expect("create dir");
        }
        fs::write(dir.path().join("notes.txt"), "x").expect("write file");

        assert_eq!(
            store.recent(2).expect("recent lists"),
            vec!["1710000000-bbbbbb".to_string(), "1705000000-cccccc".to_string()]
        );
    }

    #[test]
    fn recent_is_empty_before_first_write() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = ArtifactStore::new(dir.path().join("never-created"));
        assert!(store.recent(10).expect("recent lists").is_empty());
    }

    #[test]
    fn rejects_path_like_doc_ids() {
        let store = ArtifactStore::new("outputs");
        for id in ["", "..", "a/b"] {
            assert!(matches!(
                store.document_dir(id),
                Err(ArtifactError::InvalidDocId(_))
            ));
        }
    }
}
