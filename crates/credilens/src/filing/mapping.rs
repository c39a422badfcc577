use super::domain::{
    null_as_default, Company, Financials, FilingDocument, Notes, Sections,
};
use super::fields;
use crate::provenance::{ProvenanceStore, RawPage};
use serde::Deserialize;
use tracing::debug;

/// Structured output of the document-extraction service.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ExtractionPayload {
    #[serde(deserialize_with = "null_as_default")]
    extraction: ExtractedFields,
    #[serde(deserialize_with = "null_as_default")]
    provenance: ProvenanceStore,
    #[serde(deserialize_with = "null_as_default")]
    chunks: Vec<ParsedChunk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExtractedFields {
    #[serde(deserialize_with = "null_as_default")]
    company: Company,
    #[serde(deserialize_with = "null_as_default")]
    sections: Sections,
    #[serde(deserialize_with = "null_as_default")]
    financials: Financials,
    #[serde(deserialize_with = "null_as_default")]
    notes: Notes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ParsedChunk {
    #[serde(deserialize_with = "null_as_default")]
    grounding: Vec<Grounding>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Grounding {
    page: Option<RawPage>,
}

pub(crate) fn map_payload(payload: ExtractionPayload) -> FilingDocument {
    let ExtractionPayload {
        extraction,
        provenance,
        chunks,
    } = payload;

    let mut document = FilingDocument {
        company: extraction.company,
        sections: extraction.sections,
        financials: extraction.financials,
        notes: extraction.notes,
        provenance,
    };

    derive_missing_totals(&mut document.financials);
    let coarse = chunk_provenance(&chunks);
    document.provenance = document.provenance.merge(&coarse);
    document
}

/// Fills totals the statements imply but the extraction left unset.
pub(crate) fn derive_missing_totals(financials: &mut Financials) {
    let income = &mut financials.income_stmt;
    if income.gross_profit.is_none() {
        if let (Some(revenue), Some(cost)) = (income.revenue, income.cost_of_revenue) {
            income.gross_profit = Some(revenue - cost);
            debug!(field = fields::GROSS_PROFIT, "derived from revenue and cost of revenue");
        }
    }

    let balance = &mut financials.balance_sheet;
    if balance.total_debt.is_none() {
        if let (Some(short_term), Some(long_term)) =
            (balance.short_term_debt, balance.long_term_debt)
        {
            balance.total_debt = Some(short_term + long_term);
            debug!(field = fields::TOTAL_DEBT, "derived from short and long term debt");
        }
    }

    let cash_flow = &mut financials.cash_flow;
    if cash_flow.fcf.is_none() {
        if let (Some(operating), Some(capex)) = (cash_flow.net_cash_from_ops, cash_flow.capex) {
            // capex arrives as an outflow (negative)
            cash_flow.fcf = Some(operating + capex);
            debug!(field = fields::FREE_CASH_FLOW, "derived from operating cash flow and capex");
        }
    }
}

// Chunk grounding pages are 0-indexed and only locate the filing broadly, so
// they are attributed to the business overview.
fn chunk_provenance(chunks: &[ParsedChunk]) -> ProvenanceStore {
    let pages: Vec<u32> = chunks
        .iter()
        .filter_map(|chunk| chunk.grounding.first())
        .filter_map(|grounding| grounding.page.as_ref())
        .filter_map(zero_indexed_page)
        .collect();

    let mut store = ProvenanceStore::new();
    store.add_ref(fields::BUSINESS_OVERVIEW, pages);
    store
}

fn zero_indexed_page(raw: &RawPage) -> Option<u32> {
    let index = match raw {
        RawPage::Integer(value) => *value,
        RawPage::Float(value) if value.is_finite() => value.trunc() as i64,
        RawPage::Text(text) => text.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    u32::try_from(index).ok().and_then(|index| index.checked_add(1))
}
