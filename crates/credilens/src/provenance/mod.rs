//! Field-level citations back to source pages of the filing.
//!
//! The store maps a dotted field path to the 1-indexed pages that support its
//! value. Page sets are always deduplicated and ascending; raw page input is
//! normalized leniently (non-positive or unparseable pages are dropped).

mod clickmap;
mod ranges;

pub use clickmap::{build_click_map, Citation, ClickMap};
pub use ranges::compact_ranges;

use crate::filing::domain::null_as_default;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One raw page reference as it arrives from an extraction payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPage {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawPage {
    /// Coerces to a positive page number, truncating fractional input.
    pub fn to_page(&self) -> Option<u32> {
        let number = match self {
            RawPage::Integer(value) => *value,
            RawPage::Float(value) if value.is_finite() => value.trunc() as i64,
            RawPage::Text(text) => text.trim().parse::<i64>().ok()?,
            _ => return None,
        };
        u32::try_from(number).ok().filter(|page| *page > 0)
    }
}

impl From<i32> for RawPage {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<i64> for RawPage {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for RawPage {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for RawPage {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for RawPage {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawPage {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Normalizes raw pages into a sorted, deduplicated list of positive pages.
pub fn normalize_pages<I, P>(pages: I) -> Vec<u32>
where
    I: IntoIterator<Item = P>,
    P: Into<RawPage>,
{
    pages
        .into_iter()
        .filter_map(|page| page.into().to_page())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawProvenance")]
pub struct ProvenanceStore {
    page_refs: BTreeMap<String, BTreeSet<u32>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProvenance {
    #[serde(deserialize_with = "null_as_default")]
    page_refs: BTreeMap<String, Option<Vec<RawPage>>>,
}

impl From<RawProvenance> for ProvenanceStore {
    fn from(raw: RawProvenance) -> Self {
        let mut store = ProvenanceStore::default();
        for (keypath, pages) in raw.page_refs {
            store.add_ref(&keypath, pages.unwrap_or_default());
        }
        store
    }
}

impl ProvenanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unions normalized `pages` into the entry for `keypath`.
    ///
    /// An empty keypath or a page list that normalizes to nothing leaves the
    /// store untouched, so no key ever maps to an empty page set.
    pub fn add_ref<I, P>(&mut self, keypath: &str, pages: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<RawPage>,
    {
        if keypath.is_empty() {
            return;
        }
        let normalized = normalize_pages(pages);
        if normalized.is_empty() {
            return;
        }
        self.page_refs
            .entry(keypath.to_string())
            .or_default()
            .extend(normalized);
    }

    /// Pages cited for `keypath`, ascending. Empty when the key is absent.
    pub fn refs(&self, keypath: &str) -> Vec<u32> {
        self.page_refs
            .get(keypath)
            .map(|pages| pages.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns a new store holding the per-key union of both sides.
    pub fn merge(&self, other: &ProvenanceStore) -> ProvenanceStore {
        let mut merged = self.clone();
        for (keypath, pages) in &other.page_refs {
            merged
                .page_refs
                .entry(keypath.clone())
                .or_default()
                .extend(pages.iter().copied());
        }
        merged
    }

    /// Keypaths from `required` with no citation, in input order.
    pub fn missing<'a, I>(&self, required: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        required
            .into_iter()
            .filter(|keypath| {
                self.page_refs
                    .get(*keypath)
                    .map_or(true, |pages| pages.is_empty())
            })
            .map(str::to_string)
            .collect()
    }

    /// Human-readable page label for `keypath`, e.g. `pp. 5–7, 10`.
    pub fn compact_for(&self, keypath: &str) -> String {
        compact_ranges(self.refs(keypath))
    }

    pub fn click_map(
        &self,
        viewer_route: &str,
        doc_id: Option<&str>,
        extra_params: &[(&str, &str)],
    ) -> ClickMap {
        build_click_map(self, viewer_route, doc_id, extra_params)
    }

    pub fn keypaths(&self) -> impl Iterator<Item = &str> {
        self.page_refs.keys().map(String::as_str)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &BTreeSet<u32>)> {
        self.page_refs
            .iter()
            .map(|(keypath, pages)| (keypath.as_str(), pages))
    }

    pub fn len(&self) -> usize {
        self.page_refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.page_refs.is_empty()
    }
}

/// Keypaths from `required` lacking a citation in `store`.
pub fn validate_required<'a, I>(store: &ProvenanceStore, required: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    store.missing(required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const REVENUE: &str = "financials.income_stmt.revenue";

    #[test]
    fn add_ref_unions_and_sorts_pages() {
        let mut store = ProvenanceStore::new();
        store.add_ref(REVENUE, [5, 5, 6]);
        store.add_ref(REVENUE, [6, 7]);

        assert_eq!(store.refs(REVENUE), vec![5, 6, 7]);
    }

    #[test]
    fn add_ref_is_idempotent() {
        let mut store = ProvenanceStore::new();
        store.add_ref(REVENUE, [44, 45]);
        let snapshot = store.clone();
        store.add_ref(REVENUE, [44, 45]);

        assert_eq!(store, snapshot);
    }

    #[test]
    fn add_ref_drops_invalid_pages_and_empty_keys() {
        let mut store = ProvenanceStore::new();
        store.add_ref(REVENUE, [0, -3]);
        store.add_ref("", [4]);
        assert!(store.is_empty());

        store.add_ref(
            REVENUE,
            vec![
                RawPage::from("12"),
                RawPage::from("abc"),
                RawPage::from(3.9),
                RawPage::Other(json!(null)),
            ],
        );
        assert_eq!(store.refs(REVENUE), vec![3, 12]);
    }

    #[test]
    fn refs_for_absent_key_is_empty() {
        let store = ProvenanceStore::new();
        assert!(store.refs("financials.cash_flow.fcf").is_empty());
    }

    #[test]
    fn merge_unions_both_sides() {
        let mut left = ProvenanceStore::new();
        left.add_ref(REVENUE, [2, 4]);
        left.add_ref("sections.mdna", [30]);
        let mut right = ProvenanceStore::new();
        right.add_ref(REVENUE, [3, 4]);
        right.add_ref("financials.income_stmt.ebit", [50]);

        let merged = left.merge(&right);
        assert_eq!(merged.refs(REVENUE), vec![2, 3, 4]);
        assert_eq!(merged.refs("sections.mdna"), vec![30]);
        assert_eq!(merged.refs("financials.income_stmt.ebit"), vec![50]);
        assert_eq!(left.refs(REVENUE), vec![2, 4], "inputs stay untouched");
    }

    #[test]
    fn merge_with_self_is_a_no_op() {
        let mut store = ProvenanceStore::new();
        store.add_ref(REVENUE, [9, 8, 8]);
        store.add_ref("financials.balance_sheet.total_assets", [61]);

        assert_eq!(store.merge(&store), store);
    }

    #[test]
    fn missing_reports_absent_keys_in_order() {
        let mut store = ProvenanceStore::new();
        store.add_ref(REVENUE, [44]);

        let missing = validate_required(
            &store,
            ["financials.income_stmt.ebit", REVENUE, "financials.income_stmt.net_income"],
        );
        assert_eq!(
            missing,
            vec![
                "financials.income_stmt.ebit".to_string(),
                "financials.income_stmt.net_income".to_string()
            ]
        );
    }

    #[test]
    fn deserializes_leniently_and_serializes_sorted() {
        let store: ProvenanceStore = serde_json::from_value(json!({
            "page_refs": {
                "financials.income_stmt.revenue": [45, "44", 44, -1, "x", null],
                "sections.mdna": [0],
            }
        }))
        .expect("provenance parses");

        assert_eq!(store.refs(REVENUE), vec![44, 45]);
        assert!(store.refs("sections.mdna").is_empty());
        assert_eq!(store.len(), 1);
        assert_eq!(
            serde_json::to_value(&store).expect("serializes"),
            json!({"page_refs": {"financials.income_stmt.revenue": [44, 45]}})
        );
    }

    #[test]
    fn compact_for_formats_pages() {
        let mut store = ProvenanceStore::new();
        store.add_ref(REVENUE, [10, 5, 6, 7]);
        assert_eq!(store.compact_for(REVENUE), "pp. 5\u{2013}7, 10");
        assert_eq!(store.compact_for("sections.mdna"), "");
    }
}
