use crate::provenance::ProvenanceStore;
use serde::{Deserialize, Deserializer, Serialize};

/// Root aggregate for one extracted 10-K filing.
///
/// Every field is optional: an unset value means "not disclosed", which the
/// downstream engines keep distinct from a disclosed zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilingDocument {
    pub company: Company,
    pub sections: Sections,
    pub financials: Financials,
    pub notes: Notes,
    pub provenance: ProvenanceStore,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Company {
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub ticker: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub cik: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub fy_end: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub currency: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub sic: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub hq: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub logo_url: Option<String>,
}

/// Narrative sections lifted from the filing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sections {
    #[serde(deserialize_with = "lenient_text")]
    pub business_overview: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub mdna: Option<String>,
    #[serde(deserialize_with = "lenient_text_list")]
    pub risk_factors: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub auditor_opinion: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub legal_contingencies: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Financials {
    #[serde(deserialize_with = "null_as_default")]
    pub income_stmt: IncomeStatement,
    #[serde(deserialize_with = "null_as_default")]
    pub balance_sheet: BalanceSheet,
    #[serde(deserialize_with = "null_as_default")]
    pub cash_flow: CashFlow,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeStatement {
    #[serde(deserialize_with = "lenient_number")]
    pub revenue: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub cost_of_revenue: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub gross_profit: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub sga: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub rnd: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub ebit: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub interest_expense: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub pretax_income: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub net_income: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceSheet {
    #[serde(deserialize_with = "lenient_number")]
    pub cash: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub short_term_investments: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub accounts_receivable: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub inventory: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub other_current_assets: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub current_assets: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub ppne: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub intangible_assets: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub other_noncurrent_assets: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub accounts_payable: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub other_current_liabilities: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub short_term_debt: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub current_liabilities: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub long_term_debt: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub total_debt: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub noncurrent_liabilities: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub total_liabilities: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub total_equity: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub total_assets: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashFlow {
    #[serde(deserialize_with = "lenient_number")]
    pub net_cash_from_ops: Option<f64>,
    /// Reported as a cash outflow, so normally negative.
    #[serde(deserialize_with = "lenient_number")]
    pub capex: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub fcf: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub interest_paid_if_disclosed: Option<f64>,
}

/// Qualitative flags from the notes to the financial statements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notes {
    #[serde(deserialize_with = "lenient_text")]
    pub off_balance_sheet: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub covenant_mentions: Option<String>,
    #[serde(deserialize_with = "lenient_flag")]
    pub going_concern_flag: Option<bool>,
}

/// Treats an explicit `null` like an absent key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

pub(crate) fn number_from_value(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => parse_amount(text),
        _ => None,
    };
    parsed.filter(|number| number.is_finite())
}

fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|ch| *ch != ',' && !ch.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) if !text.trim().is_empty() => Some(text),
        Some(serde_json::Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

fn lenient_text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(text) if !text.trim().is_empty() => Some(text),
                _ => None,
            })
            .collect(),
        Some(serde_json::Value::String(text)) if !text.trim().is_empty() => vec![text],
        _ => Vec::new(),
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Bool(flag)) => Some(flag),
        Some(serde_json::Value::String(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_strings_and_separators_are_accepted() {
        let statement: IncomeStatement = serde_json::from_value(json!({
            "revenue": "1,250.5",
            "ebit": 300,
            "net_income": "n/a",
            "sga": null,
        }))
        .expect("lenient statement parses");

        assert_eq!(statement.revenue, Some(1250.5));
        assert_eq!(statement.ebit, Some(300.0));
        assert_eq!(statement.net_income, None);
        assert_eq!(statement.sga, None);
        assert_eq!(statement.rnd, None);
    }

    #[test]
    fn unknown_fields_and_wrong_types_degrade_to_unset() {
        let document: FilingDocument = serde_json::from_value(json!({
            "company": {"name": "Acme Corp", "ticker": 42, "unknown": true},
            "sections": {"risk_factors": ["Supply chain", "", 7]},
            "notes": {"going_concern_flag": "no"},
            "financials": {"balance_sheet": {"cash": [1, 2]}},
        }))
        .expect("document parses");

        assert_eq!(document.company.name.as_deref(), Some("Acme Corp"));
        assert_eq!(document.company.ticker.as_deref(), Some("42"));
        assert_eq!(document.sections.risk_factors, vec!["Supply chain"]);
        assert_eq!(document.notes.going_concern_flag, Some(false));
        assert_eq!(document.financials.balance_sheet.cash, None);
    }
}
