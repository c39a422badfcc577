use crate::filing::fields;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatioUnit {
    Multiple,
    Percent,
}

impl RatioUnit {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Multiple => "multiple",
            Self::Percent => "percent",
        }
    }
}

impl Default for RatioUnit {
    fn default() -> Self {
        Self::Multiple
    }
}

/// The ratio formulas the engine knows how to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatioKey {
    CurrentRatio,
    QuickRatio,
    DebtToEquity,
    DebtToAssets,
    InterestCoverage,
    OcfToDebt,
    FcfMargin,
    GrossMargin,
    EbitMargin,
    NetMargin,
    AssetTurnover,
    OcfToCl,
}

impl RatioKey {
    pub const fn ordered() -> [Self; 12] {
        [
            Self::CurrentRatio,
            Self::QuickRatio,
            Self::DebtToEquity,
            Self::DebtToAssets,
            Self::InterestCoverage,
            Self::OcfToDebt,
            Self::FcfMargin,
            Self::GrossMargin,
            Self::EbitMargin,
            Self::NetMargin,
            Self::AssetTurnover,
            Self::OcfToCl,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CurrentRatio => "CURRENT_RATIO",
            Self::QuickRatio => "QUICK_RATIO",
            Self::DebtToEquity => "DEBT_TO_EQUITY",
            Self::DebtToAssets => "DEBT_TO_ASSETS",
            Self::InterestCoverage => "INTEREST_COVERAGE",
            Self::OcfToDebt => "OCF_TO_DEBT",
            Self::FcfMargin => "FCF_MARGIN",
            Self::GrossMargin => "GROSS_MARGIN",
            Self::EbitMargin => "EBIT_MARGIN",
            Self::NetMargin => "NET_MARGIN",
            Self::AssetTurnover => "ASSET_TURNOVER",
            Self::OcfToCl => "OCF_TO_CL",
        }
    }

    /// Ratios always reported as a share of their denominator.
    pub const fn is_percentage(self) -> bool {
        matches!(
            self,
            Self::DebtToAssets
                | Self::FcfMargin
                | Self::GrossMargin
                | Self::EbitMargin
                | Self::NetMargin
        )
    }
}

impl fmt::Display for RatioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRatioKey(pub String);

impl FromStr for RatioKey {
    type Err = UnknownRatioKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| UnknownRatioKey(value.to_string()))
    }
}

/// Static description of one ratio: which fields it reads and how it reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioSpec {
    pub key: String,
    pub inputs: Vec<String>,
    pub formula_hint: String,
    #[serde(default)]
    pub display_unit: RatioUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RatioSpec {
    fn standard(
        key: RatioKey,
        inputs: &[&str],
        formula_hint: &str,
        display_unit: RatioUnit,
        notes: &str,
    ) -> Self {
        Self {
            key: key.as_str().to_string(),
            inputs: inputs.iter().map(|input| input.to_string()).collect(),
            formula_hint: formula_hint.to_string(),
            display_unit,
            notes: Some(notes.to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RatioTableError {
    #[error("failed to read ratio table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid ratio table YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("ratio {ratio} reads unknown field path {path}")]
    UnknownField { ratio: String, path: String },
    #[error("ratio {0} is declared more than once")]
    DuplicateRatio(String),
}

/// Ordered ratio specifications; immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatioTable {
    specs: Vec<RatioSpec>,
}

impl RatioTable {
    /// The twelve ratios derived from every filing.
    pub fn standard() -> Self {
        use RatioUnit::{Multiple, Percent};

        let specs = vec![
            RatioSpec::standard(
                RatioKey::CurrentRatio,
                &[fields::CURRENT_ASSETS, fields::CURRENT_LIABILITIES],
                "current assets \u{f7} current liabilities",
                Multiple,
                "If current_liabilities == 0 \u{2192} NA",
            ),
            RatioSpec::standard(
                RatioKey::QuickRatio,
                &[
                    fields::CASH,
                    fields::SHORT_TERM_INVESTMENTS,
                    fields::ACCOUNTS_RECEIVABLE,
                    fields::CURRENT_LIABILITIES,
                ],
                "(cash + short-term investments + receivables) \u{f7} current liabilities",
                Multiple,
                "If current_liabilities == 0 or no quick asset is disclosed \u{2192} NA",
            ),
            RatioSpec::standard(
                RatioKey::DebtToEquity,
                &[fields::TOTAL_DEBT, fields::TOTAL_EQUITY],
                "total debt \u{f7} total equity",
                Multiple,
                "If total_equity == 0 or missing \u{2192} NA",
            ),
            RatioSpec::standard(
                RatioKey::DebtToAssets,
                &[fields::TOTAL_DEBT, fields::TOTAL_ASSETS],
                "total debt \u{f7} total assets",
                Percent,
                "If total_assets == 0 or missing \u{2192} NA",
            ),
            RatioSpec::standard(
                RatioKey::InterestCoverage,
                &[fields::EBIT, fields::INTEREST_EXPENSE],
                "EBIT \u{f7} interest expense",
                Multiple,
                "If interest_expense <= 0 or missing \u{2192} NA",
            ),
            RatioSpec::standard(
                RatioKey::OcfToDebt,
                &[fields::OPERATING_CASH_FLOW, fields::TOTAL_DEBT],
                "operating cash flow \u{f7} total debt",
                Multiple,
                "If total_debt == 0 or missing \u{2192} NA",
            ),
            RatioSpec::standard(
                RatioKey::FcfMargin,
                &[fields::FREE_CASH_FLOW, fields::REVENUE],
                "free cash flow \u{f7} revenue",
                Percent,
                "If revenue == 0 or missing \u{2192} NA",
            ),
            RatioSpec::standard(
                RatioKey::GrossMargin,
                &[fields::GROSS_PROFIT, fields::REVENUE],
                "gross profit \u{f7} revenue",
                Percent,
                "If revenue == 0 or missing \u{2192} NA",
            ),
            RatioSpec::standard(
                RatioKey::EbitMargin,
                &[fields::EBIT, fields::REVENUE],
                "EBIT \u{f7} revenue",
                Percent,
                "If revenue == 0 or missing \u{2192} NA",
            ),
            RatioSpec::standard(
                RatioKey::NetMargin,
                &[fields::NET_INCOME, fields::REVENUE],
                "net income \u{f7} revenue",
                Percent,
                "If revenue == 0 or missing \u{2192} NA",
            ),
            RatioSpec::standard(
                RatioKey::AssetTurnover,
                &[fields::REVENUE, fields::TOTAL_ASSETS],
                "revenue \u{f7} total assets",
                Multiple,
                "If total_assets == 0 or missing \u{2192} NA",
            ),
            RatioSpec::standard(
                RatioKey::OcfToCl,
                &[fields::OPERATING_CASH_FLOW, fields::CURRENT_LIABILITIES],
                "operating cash flow \u{f7} current liabilities",
                Multiple,
                "If current_liabilities == 0 or missing \u{2192} NA",
            ),
        ];

        Self { specs }
    }

    /// Builds a table from explicit specs, rejecting unknown field paths and
    /// duplicate keys. Unrecognized ratio keys are accepted and evaluate to NA.
    pub fn new(specs: Vec<RatioSpec>) -> Result<Self, RatioTableError> {
        let table = Self { specs };
        table.validate()?;
        Ok(table)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RatioTableError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, RatioTableError> {
        let specs: Vec<RatioSpec> = serde_yaml::from_str(text)?;
        Self::new(specs)
    }

    fn validate(&self) -> Result<(), RatioTableError> {
        let mut seen = std::collections::HashSet::new();
        for spec in &self.specs {
            if !seen.insert(spec.key.as_str()) {
                return Err(RatioTableError::DuplicateRatio(spec.key.clone()));
            }
            if let Some(path) = spec.inputs.iter().find(|path| !fields::is_known(path)) {
                return Err(RatioTableError::UnknownField {
                    ratio: spec.key.clone(),
                    path: path.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn specs(&self) -> &[RatioSpec] {
        &self.specs
    }

    pub fn get(&self, key: &str) -> Option<&RatioSpec> {
        self.specs.iter().find(|spec| spec.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|spec| spec.key.as_str())
    }
}

impl Default for RatioTable {
    fn default() -> Self {
        Self::standard()
    }
}
