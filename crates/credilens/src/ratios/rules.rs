use super::spec::{RatioKey, RatioSpec, RatioUnit};
use super::RatioResult;

/// Failure while evaluating a single ratio. The engine downgrades every
/// variant to NA for that ratio only.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("no formula is defined for ratio {0}")]
    UnknownRatio(String),
    #[error("ratio {ratio} expects {expected} inputs, table declares {found}")]
    Arity {
        ratio: RatioKey,
        expected: usize,
        found: usize,
    },
    #[error("ratio {0} evaluated to a non-finite value")]
    NonFinite(RatioKey),
}

/// How a denominator disqualifies a ratio.
#[derive(Clone, Copy)]
enum Denominator {
    NonZero,
    Positive,
}

impl Denominator {
    fn admits(self, value: f64) -> bool {
        match self {
            Denominator::NonZero => value != 0.0,
            Denominator::Positive => value > 0.0,
        }
    }
}

/// Unit reported for `spec`, NA or not.
pub(crate) fn result_unit(spec: &RatioSpec) -> RatioUnit {
    match spec.key.parse::<RatioKey>() {
        Ok(key) if key.is_percentage() => RatioUnit::Percent,
        _ => spec.display_unit,
    }
}

pub(crate) fn evaluate(spec: &RatioSpec, inputs: &[Option<f64>]) -> Result<RatioResult, EvalError> {
    let key: RatioKey = spec
        .key
        .parse()
        .map_err(|_| EvalError::UnknownRatio(spec.key.clone()))?;
    let unit = result_unit(spec);

    let (numerator, denominator, rule) = match key {
        RatioKey::QuickRatio => {
            let [cash, investments, receivables, liabilities] = expect_inputs::<4>(key, inputs)?;
            (
                sum_disclosed(&[cash, investments, receivables]),
                liabilities,
                Denominator::NonZero,
            )
        }
        RatioKey::InterestCoverage => {
            let [ebit, interest] = expect_inputs::<2>(key, inputs)?;
            (ebit, interest, Denominator::Positive)
        }
        RatioKey::CurrentRatio
        | RatioKey::DebtToEquity
        | RatioKey::DebtToAssets
        | RatioKey::OcfToDebt
        | RatioKey::FcfMargin
        | RatioKey::GrossMargin
        | RatioKey::EbitMargin
        | RatioKey::NetMargin
        | RatioKey::AssetTurnover
        | RatioKey::OcfToCl => {
            let [numerator, denominator] = expect_inputs::<2>(key, inputs)?;
            (numerator, denominator, Denominator::NonZero)
        }
    };

    let (Some(numerator), Some(denominator)) = (numerator, denominator) else {
        return Ok(RatioResult::not_available(unit));
    };
    if !rule.admits(denominator) {
        return Ok(RatioResult::not_available(unit));
    }

    let value = numerator / denominator;
    if !value.is_finite() {
        return Err(EvalError::NonFinite(key));
    }

    Ok(RatioResult::available(round4(value), unit))
}

fn expect_inputs<const N: usize>(
    key: RatioKey,
    inputs: &[Option<f64>],
) -> Result<[Option<f64>; N], EvalError> {
    <[Option<f64>; N]>::try_from(inputs).map_err(|_| EvalError::Arity {
        ratio: key,
        expected: N,
        found: inputs.len(),
    })
}

// Undisclosed addends count as zero; with nothing disclosed the sum is unknown.
fn sum_disclosed(addends: &[Option<f64>]) -> Option<f64> {
    addends
        .iter()
        .flatten()
        .fold(None, |total, value| Some(total.unwrap_or(0.0) + value))
}

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratios::RatioTable;

    fn spec(key: RatioKey) -> RatioSpec {
        RatioTable::standard()
            .get(key.as_str())
            .cloned()
            .expect("standard spec")
    }

    #[test]
    fn divides_and_rounds_to_four_places() {
        let result =
            evaluate(&spec(RatioKey::CurrentRatio), &[Some(2.0), Some(3.0)]).expect("evaluates");
        assert_eq!(result.value, Some(0.6667));
        assert!(!result.is_not_available);
    }

    #[test]
    fn interest_coverage_requires_positive_expense() {
        let coverage = spec(RatioKey::InterestCoverage);
        assert!(evaluate(&coverage, &[Some(10.0), Some(-2.0)])
            .expect("evaluates")
            .is_not_available);
        assert!(evaluate(&coverage, &[Some(10.0), Some(0.0)])
            .expect("evaluates")
            .is_not_available);
        assert_eq!(
            evaluate(&coverage, &[Some(10.0), Some(4.0)])
                .expect("evaluates")
                .value,
            Some(2.5)
        );
    }

    #[test]
    fn negative_denominators_are_allowed_elsewhere() {
        let result = evaluate(&spec(RatioKey::DebtToEquity), &[Some(50.0), Some(-25.0)])
            .expect("evaluates");
        assert_eq!(result.value, Some(-2.0));
    }

    #[test]
    fn quick_ratio_sums_disclosed_addends() {
        let quick = spec(RatioKey::QuickRatio);
        let result =
            evaluate(&quick, &[Some(30.0), None, Some(20.0), Some(100.0)]).expect("evaluates");
        assert_eq!(result.value, Some(0.5));

        let result = evaluate(&quick, &[None, None, None, Some(100.0)]).expect("evaluates");
        assert!(result.is_not_available);
        assert_eq!(result.value, None);
    }

    #[test]
    fn wrong_arity_is_an_evaluation_error() {
        let error = evaluate(&spec(RatioKey::NetMargin), &[Some(1.0)]).expect_err("arity");
        assert_eq!(
            error,
            EvalError::Arity {
                ratio: RatioKey::NetMargin,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn unknown_keys_are_evaluation_errors() {
        let mut custom = spec(RatioKey::NetMargin);
        custom.key = "RETURN_ON_EQUITY".to_string();
        assert_eq!(
            evaluate(&custom, &[Some(1.0), Some(2.0)]),
            Err(EvalError::UnknownRatio("RETURN_ON_EQUITY".to_string()))
        );
    }

    #[test]
    fn overflowing_quotients_are_rejected() {
        let error = evaluate(&spec(RatioKey::AssetTurnover), &[Some(f64::MAX), Some(1e-300)])
            .expect_err("overflow");
        assert_eq!(error, EvalError::NonFinite(RatioKey::AssetTurnover));
    }

    #[test]
    fn percentage_ratios_keep_percent_unit_when_not_available() {
        let mut custom = spec(RatioKey::DebtToAssets);
        custom.display_unit = RatioUnit::Multiple;
        let result = evaluate(&custom, &[Some(50.0), Some(0.0)]).expect("evaluates");
        assert!(result.is_not_available);
        assert_eq!(result.unit, RatioUnit::Percent);
    }
}
