pub mod domain;
pub mod fields;
mod mapping;

pub use domain::{
    BalanceSheet, CashFlow, Company, FilingDocument, Financials, IncomeStatement, Notes, Sections,
};

use mapping::ExtractionPayload;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub enum FilingImportError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for FilingImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilingImportError::Io(err) => write!(f, "failed to read extraction payload: {}", err),
            FilingImportError::Json(err) => {
                write!(f, "extraction payload could not be decoded: {}", err)
            }
        }
    }
}

impl std::error::Error for FilingImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FilingImportError::Io(err) => Some(err),
            FilingImportError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for FilingImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for FilingImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Maps extraction-service output into a [`FilingDocument`].
///
/// Structural problems (unreadable input, malformed JSON) are errors; missing
/// or mistyped individual values are not, they simply stay undisclosed.
pub struct FilingImporter;

impl FilingImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<FilingDocument, FilingImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<FilingDocument, FilingImportError> {
        let payload: ExtractionPayload = serde_json::from_reader(reader)?;
        Ok(Self::from_payload(payload))
    }

    pub fn from_value(value: serde_json::Value) -> Result<FilingDocument, FilingImportError> {
        let payload: ExtractionPayload = serde_json::from_value(value)?;
        Ok(Self::from_payload(payload))
    }

    fn from_payload(payload: ExtractionPayload) -> FilingDocument {
        let document = mapping::map_payload(payload);
        debug!(
            company = document.company.name.as_deref().unwrap_or("unknown"),
            cited_fields = document.provenance.len(),
            "mapped extraction payload"
        );
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn importer_reads_payload_from_reader() {
        let json = r#"{"extraction": {"company": {"name": "Acme"},
            "financials": {"income_stmt": {"revenue": "2,000"}}}}"#;
        let document = FilingImporter::from_reader(Cursor::new(json)).expect("import succeeds");

        assert_eq!(document.company.name.as_deref(), Some("Acme"));
        assert_eq!(document.financials.income_stmt.revenue, Some(2000.0));
    }

    #[test]
    fn importer_rejects_malformed_json() {
        let error = FilingImporter::from_reader(Cursor::new("{not json"))
            .expect_err("expected json error");
        assert!(matches!(error, FilingImportError::Json(_)));
    }

    #[test]
    fn importer_from_path_propagates_io_errors() {
        let error = FilingImporter::from_path("./does-not-exist.json")
            .expect_err("expected io error");

        match error {
            FilingImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
