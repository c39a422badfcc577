use crate::ratios::{RatioReport, RatioTable};
use serde::Serialize;
use std::io::Write;

pub const RATIO_CSV_HEADERS: [&str; 5] = ["key", "value", "unit", "is_not_available", "formula"];

#[derive(Serialize)]
struct RatioRow<'a> {
    key: &'a str,
    value: Option<f64>,
    unit: &'static str,
    is_not_available: bool,
    formula: &'a str,
}

/// One row per ratio in table order. NA values are written as empty cells.
pub fn write_ratio_csv<W: Write>(
    writer: W,
    report: &RatioReport,
    table: &RatioTable,
) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);
    for spec in table.specs() {
        let Some(result) = report.get(&spec.key) else {
            continue;
        };
        csv.serialize(RatioRow {
            key: &spec.key,
            value: result.value,
            unit: result.unit.label(),
            is_not_available: result.is_not_available,
            formula: &spec.formula_hint,
        })?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filing::FilingDocument;
    use crate::ratios::compute_ratios;

    #[test]
    fn writes_header_and_blank_values_for_na() {
        let mut document = FilingDocument::default();
        document.financials.balance_sheet.current_assets = Some(300.0);
        document.financials.balance_sheet.current_liabilities = Some(200.0);
        let table = RatioTable::standard();
        let report = compute_ratios(&document, &table);

        let mut buffer = Vec::new();
        write_ratio_csv(&mut buffer, &report, &table).expect("csv writes");
        let text = String::from_utf8(buffer).expect("utf8");
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some(RATIO_CSV_HEADERS.join(",").as_str()));
        let current = lines.next().expect("current ratio row");
        assert!(current.starts_with("CURRENT_RATIO,1.5,multiple,false,"));
        assert!(text.lines().any(|line| line.starts_with("DEBT_TO_ASSETS,,percent,true,")));
        assert_eq!(text.lines().count(), 1 + table.specs().len());
    }
}
