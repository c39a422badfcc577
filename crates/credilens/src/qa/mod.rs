//! Advisory consistency checks over an extracted filing.
//!
//! Checks only observe: a failure is reported alongside the ratios and
//! scores and never stops them from being computed.

use crate::filing::{fields, FilingDocument};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tolerance for the accounting identity.
pub const BALANCE_TOLERANCE: f64 = 1e-6;

/// Fields every analysis should be able to cite.
pub const REQUIRED_CITATIONS: [&str; 5] = [
    fields::REVENUE,
    fields::EBIT,
    fields::NET_INCOME,
    fields::TOTAL_ASSETS,
    fields::TOTAL_EQUITY,
];

pub const BALANCE_MISMATCH_REASON: &str = "Assets != Liabilities + Equity";
pub const BALANCE_MISSING_REASON: &str = "Missing A/L/E";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QaCheckKind {
    #[serde(rename = "A=L+E")]
    BalanceIdentity,
    #[serde(rename = "provenance_required")]
    RequiredProvenance,
}

impl QaCheckKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::BalanceIdentity => "A=L+E",
            Self::RequiredProvenance => "provenance_required",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaIssue {
    pub check: QaCheckKind,
    #[serde(rename = "pass")]
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl QaIssue {
    fn ok(check: QaCheckKind) -> Self {
        Self {
            check,
            passed: true,
            reason: None,
            missing: Vec::new(),
        }
    }

    fn failed(check: QaCheckKind, reason: &str, missing: Vec<String>) -> Self {
        Self {
            check,
            passed: false,
            reason: Some(reason.to_string()),
            missing,
        }
    }

    pub fn summary(&self) -> String {
        if self.passed {
            return format!("{}: pass", self.check.label());
        }
        match (&self.reason, self.missing.is_empty()) {
            (Some(reason), true) => format!("{}: fail ({reason})", self.check.label()),
            (Some(reason), false) => format!(
                "{}: fail ({reason}: {})",
                self.check.label(),
                self.missing.join(", ")
            ),
            (None, _) => format!("{}: fail", self.check.label()),
        }
    }
}

/// Total assets must equal total liabilities plus total equity.
pub fn check_balance(document: &FilingDocument) -> QaIssue {
    let balance = &document.financials.balance_sheet;
    let (Some(assets), Some(liabilities), Some(equity)) = (
        balance.total_assets,
        balance.total_liabilities,
        balance.total_equity,
    ) else {
        let missing = [
            (fields::TOTAL_ASSETS, balance.total_assets),
            (fields::TOTAL_LIABILITIES, balance.total_liabilities),
            (fields::TOTAL_EQUITY, balance.total_equity),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(path, _)| path.to_string())
        .collect();
        return QaIssue::failed(QaCheckKind::BalanceIdentity, BALANCE_MISSING_REASON, missing);
    };

    if (assets - (liabilities + equity)).abs() < BALANCE_TOLERANCE {
        QaIssue::ok(QaCheckKind::BalanceIdentity)
    } else {
        QaIssue::failed(
            QaCheckKind::BalanceIdentity,
            BALANCE_MISMATCH_REASON,
            Vec::new(),
        )
    }
}

/// Each high-importance field needs at least one page citation.
pub fn check_required_provenance(document: &FilingDocument) -> QaIssue {
    let missing = document.provenance.missing(REQUIRED_CITATIONS);
    if missing.is_empty() {
        QaIssue::ok(QaCheckKind::RequiredProvenance)
    } else {
        QaIssue::failed(
            QaCheckKind::RequiredProvenance,
            "Missing citations",
            missing,
        )
    }
}

pub fn run_all_checks(document: &FilingDocument) -> Vec<QaIssue> {
    let issues = vec![check_balance(document), check_required_provenance(document)];
    for issue in issues.iter().filter(|issue| !issue.passed) {
        warn!(check = issue.check.label(), detail = %issue.summary(), "qa check failed");
    }
    issues
}
