//! Dotted field paths and the accessor table that resolves them.
//!
//! Ratio inputs and provenance keys name document fields by dotted path
//! (`financials.income_stmt.revenue`). Paths resolve through a fixed table of
//! typed getters built once per process; a path outside the table resolves to
//! `None` exactly like an undisclosed value.

use super::domain::FilingDocument;
use std::collections::HashMap;
use std::sync::OnceLock;

pub type FieldGetter = fn(&FilingDocument) -> Option<f64>;

pub const INCOME_STMT: &str = "financials.income_stmt";
pub const BALANCE_SHEET: &str = "financials.balance_sheet";
pub const CASH_FLOW: &str = "financials.cash_flow";

pub const REVENUE: &str = "financials.income_stmt.revenue";
pub const GROSS_PROFIT: &str = "financials.income_stmt.gross_profit";
pub const EBIT: &str = "financials.income_stmt.ebit";
pub const INTEREST_EXPENSE: &str = "financials.income_stmt.interest_expense";
pub const NET_INCOME: &str = "financials.income_stmt.net_income";

pub const CASH: &str = "financials.balance_sheet.cash";
pub const SHORT_TERM_INVESTMENTS: &str = "financials.balance_sheet.short_term_investments";
pub const ACCOUNTS_RECEIVABLE: &str = "financials.balance_sheet.accounts_receivable";
pub const CURRENT_ASSETS: &str = "financials.balance_sheet.current_assets";
pub const CURRENT_LIABILITIES: &str = "financials.balance_sheet.current_liabilities";
pub const TOTAL_DEBT: &str = "financials.balance_sheet.total_debt";
pub const TOTAL_LIABILITIES: &str = "financials.balance_sheet.total_liabilities";
pub const TOTAL_EQUITY: &str = "financials.balance_sheet.total_equity";
pub const TOTAL_ASSETS: &str = "financials.balance_sheet.total_assets";

pub const OPERATING_CASH_FLOW: &str = "financials.cash_flow.net_cash_from_ops";
pub const FREE_CASH_FLOW: &str = "financials.cash_flow.fcf";

pub const BUSINESS_OVERVIEW: &str = "sections.business_overview";

static FIELD_TABLE: OnceLock<HashMap<&'static str, FieldGetter>> = OnceLock::new();

/// Resolves a dotted path against the document.
pub fn resolve(document: &FilingDocument, path: &str) -> Option<f64> {
    field_table()
        .get(path)
        .and_then(|getter| getter(document))
        .filter(|value| value.is_finite())
}

pub fn is_known(path: &str) -> bool {
    field_table().contains_key(path)
}

/// Every numeric path the accessor table understands, sorted.
pub fn known_paths() -> Vec<&'static str> {
    let mut paths: Vec<_> = field_table().keys().copied().collect();
    paths.sort_unstable();
    paths
}

fn field_table() -> &'static HashMap<&'static str, FieldGetter> {
    FIELD_TABLE.get_or_init(|| {
        let entries: &[(&'static str, FieldGetter)] = &[
            // Income statement
            (REVENUE, |doc| doc.financials.income_stmt.revenue),
            ("financials.income_stmt.cost_of_revenue", |doc| {
                doc.financials.income_stmt.cost_of_revenue
            }),
            (GROSS_PROFIT, |doc| doc.financials.income_stmt.gross_profit),
            ("financials.income_stmt.sga", |doc| doc.financials.income_stmt.sga),
            ("financials.income_stmt.rnd", |doc| doc.financials.income_stmt.rnd),
            (EBIT, |doc| doc.financials.income_stmt.ebit),
            (INTEREST_EXPENSE, |doc| {
                doc.financials.income_stmt.interest_expense
            }),
            ("financials.income_stmt.pretax_income", |doc| {
                doc.financials.income_stmt.pretax_income
            }),
            (NET_INCOME, |doc| doc.financials.income_stmt.net_income),
            // Balance sheet
            (CASH, |doc| doc.financials.balance_sheet.cash),
            (SHORT_TERM_INVESTMENTS, |doc| {
                doc.financials.balance_sheet.short_term_investments
            }),
            (ACCOUNTS_RECEIVABLE, |doc| {
                doc.financials.balance_sheet.accounts_receivable
            }),
            ("financials.balance_sheet.inventory", |doc| {
                doc.financials.balance_sheet.inventory
            }),
            ("financials.balance_sheet.other_current_assets", |doc| {
                doc.financials.balance_sheet.other_current_assets
            }),
            (CURRENT_ASSETS, |doc| doc.financials.balance_sheet.current_assets),
            ("financials.balance_sheet.ppne", |doc| {
                doc.financials.balance_sheet.ppne
            }),
            ("financials.balance_sheet.intangible_assets", |doc| {
                doc.financials.balance_sheet.intangible_assets
            }),
            ("financials.balance_sheet.other_noncurrent_assets", |doc| {
                doc.financials.balance_sheet.other_noncurrent_assets
            }),
            ("financials.balance_sheet.accounts_payable", |doc| {
                doc.financials.balance_sheet.accounts_payable
            }),
            ("financials.balance_sheet.other_current_liabilities", |doc| {
                doc.financials.balance_sheet.other_current_liabilities
            }),
            ("financials.balance_sheet.short_term_debt", |doc| {
                doc.financials.balance_sheet.short_term_debt
            }),
            (CURRENT_LIABILITIES, |doc| {
                doc.financials.balance_sheet.current_liabilities
            }),
            ("financials.balance_sheet.long_term_debt", |doc| {
                doc.financials.balance_sheet.long_term_debt
            }),
            (TOTAL_DEBT, |doc| doc.financials.balance_sheet.total_debt),
            ("financials.balance_sheet.noncurrent_liabilities", |doc| {
                doc.financials.balance_sheet.noncurrent_liabilities
            }),
            (TOTAL_LIABILITIES, |doc| {
                doc.financials.balance_sheet.total_liabilities
            }),
            (TOTAL_EQUITY, |doc| doc.financials.balance_sheet.total_equity),
            (TOTAL_ASSETS, |doc| doc.financials.balance_sheet.total_assets),
            // Cash flow
            (OPERATING_CASH_FLOW, |doc| {
                doc.financials.cash_flow.net_cash_from_ops
            }),
            ("financials.cash_flow.capex", |doc| doc.financials.cash_flow.capex),
            (FREE_CASH_FLOW, |doc| doc.financials.cash_flow.fcf),
            ("financials.cash_flow.interest_paid_if_disclosed", |doc| {
                doc.financials.cash_flow.interest_paid_if_disclosed
            }),
        ];

        entries.iter().copied().collect()
    })
}
