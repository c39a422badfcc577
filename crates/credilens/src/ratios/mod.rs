//! Declarative ratio derivation over a [`FilingDocument`].
//!
//! Each ratio names its input field paths in a [`RatioTable`]; the engine
//! resolves them, applies the ratio's formula and missing-data policy, and
//! isolates failures so one bad ratio never sinks the batch.

mod rules;
mod spec;

pub use rules::EvalError;
pub use spec::{RatioKey, RatioSpec, RatioTable, RatioTableError, RatioUnit, UnknownRatioKey};

use crate::filing::{fields, FilingDocument};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Outcome for one ratio. `value` is `None` exactly when the ratio is not
/// available; otherwise it is finite and rounded to four decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioResult {
    pub value: Option<f64>,
    pub unit: RatioUnit,
    pub is_not_available: bool,
}

impl RatioResult {
    pub fn available(value: f64, unit: RatioUnit) -> Self {
        Self {
            value: Some(value),
            unit,
            is_not_available: false,
        }
    }

    pub fn not_available(unit: RatioUnit) -> Self {
        Self {
            value: None,
            unit,
            is_not_available: true,
        }
    }
}

/// Ratio results keyed by ratio name plus every input path that resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioReport {
    pub ratios: BTreeMap<String, RatioResult>,
    pub used_fields: Vec<String>,
}

impl RatioReport {
    pub fn get(&self, key: &str) -> Option<&RatioResult> {
        self.ratios.get(key)
    }

    pub fn value(&self, key: RatioKey) -> Option<f64> {
        self.ratios.get(key.as_str()).and_then(|result| result.value)
    }

    pub fn available_count(&self) -> usize {
        self.ratios
            .values()
            .filter(|result| !result.is_not_available)
            .count()
    }
}

/// Stateless evaluator bound to an immutable ratio table.
#[derive(Debug, Clone, Default)]
pub struct RatioEngine {
    table: RatioTable,
}

impl RatioEngine {
    pub fn new(table: RatioTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RatioTable {
        &self.table
    }

    pub fn compute(&self, document: &FilingDocument) -> RatioReport {
        compute_ratios(document, &self.table)
    }
}

pub fn compute_ratios(document: &FilingDocument, table: &RatioTable) -> RatioReport {
    let mut ratios = BTreeMap::new();
    let mut used_fields = BTreeSet::new();

    for spec in table.specs() {
        let inputs: Vec<Option<f64>> = spec
            .inputs
            .iter()
            .map(|path| fields::resolve(document, path))
            .collect();

        used_fields.extend(
            spec.inputs
                .iter()
                .zip(&inputs)
                .filter(|(_, value)| value.is_some())
                .map(|(path, _)| path.clone()),
        );

        let result = match rules::evaluate(spec, &inputs) {
            Ok(result) => {
                if result.is_not_available {
                    debug!(ratio = %spec.key, "ratio not available from disclosed inputs");
                }
                result
            }
            Err(err) => {
                debug!(ratio = %spec.key, error = %err, "ratio evaluation failed; reporting NA");
                RatioResult::not_available(rules::result_unit(spec))
            }
        };
        ratios.insert(spec.key.clone(), result);
    }

    RatioReport {
        ratios,
        used_fields: used_fields.into_iter().collect(),
    }
}
