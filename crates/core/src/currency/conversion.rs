//! Currency conversion logic.
//!
//! CRITICAL: intermediate values keep full `Decimal` precision. Rounding to
//! storage precision happens exactly once, when the converted amount is
//! stored (see [`spendflow_shared::types::round_money`]).

use rust_decimal::Decimal;
use spendflow_shared::types::CurrencyCode;

use super::error::CurrencyError;
use super::rates::ExchangeRateTable;

/// Converts `amount` from one currency to another through the table anchor.
///
/// Same-currency conversion returns the amount unchanged without consulting
/// the table. Otherwise the result is `amount * rate[to] / rate[from]`,
/// which is the same as applying the cross rate `rate[to] / rate[from]` but
/// loses no precision when either side is the anchor.
///
/// # Errors
///
/// Returns `RateUnavailable` when either currency is missing from the table
/// and `Overflow` when the result cannot be represented.
pub fn convert(
    amount: Decimal,
    from: &CurrencyCode,
    to: &CurrencyCode,
    table: &ExchangeRateTable,
) -> Result<Decimal, CurrencyError> {
    if from == to {
        return Ok(amount);
    }

    let from_rate = lookup(table, from)?;
    let to_rate = lookup(table, to)?;

    amount
        .checked_mul(to_rate)
        .and_then(|scaled| scaled.checked_div(from_rate))
        .ok_or(CurrencyError::Overflow(amount))
}

/// Effective rate applied when converting `from` into `to`.
///
/// # Errors
///
/// Returns `RateUnavailable` when either currency is missing.
pub fn cross_rate(
    table: &ExchangeRateTable,
    from: &CurrencyCode,
    to: &CurrencyCode,
) -> Result<Decimal, CurrencyError> {
    if from == to {
        return Ok(Decimal::ONE);
    }
    let from_rate = lookup(table, from)?;
    let to_rate = lookup(table, to)?;
    to_rate
        .checked_div(from_rate)
        .ok_or(CurrencyError::Overflow(to_rate))
}

fn lookup(table: &ExchangeRateTable, code: &CurrencyCode) -> Result<Decimal, CurrencyError> {
    table
        .rate(code)
        .ok_or_else(|| CurrencyError::RateUnavailable {
            currency: code.clone(),
            base: table.base_currency().clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use spendflow_shared::types::round_money;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    fn eur_table() -> ExchangeRateTable {
        ExchangeRateTable::new(
            code("EUR"),
            [
                (code("USD"), dec!(1.10)),
                (code("GBP"), dec!(0.85)),
                (code("IDR"), dec!(17000)),
            ],
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_eur_to_usd() {
        // 100 EUR at 1.10 -> 110.00 USD
        let result = convert(dec!(100), &code("EUR"), &code("USD"), &eur_table()).unwrap();
        assert_eq!(round_money(result), dec!(110.00));
    }

    #[test]
    fn test_usd_to_eur_via_anchor() {
        let result = convert(dec!(110), &code("USD"), &code("EUR"), &eur_table()).unwrap();
        assert_eq!(round_money(result), dec!(100.00));
    }

    #[test]
    fn test_cross_currency_through_anchor() {
        // 17000 IDR = 1 EUR = 0.85 GBP
        let result = convert(dec!(17000), &code("IDR"), &code("GBP"), &eur_table()).unwrap();
        assert_eq!(round_money(result), dec!(0.85));
    }

    #[rstest]
    #[case("USD")]
    #[case("XYZ")]
    fn test_same_currency_is_identity(#[case] c: &str) {
        // Unknown codes still convert to themselves.
        let amount = dec!(123.456);
        let result = convert(amount, &code(c), &code(c), &eur_table()).unwrap();
        assert_eq!(result, amount);
    }

    #[rstest]
    #[case("XYZ", "USD")]
    #[case("USD", "XYZ")]
    fn test_missing_rate(#[case] from: &str, #[case] to: &str) {
        let result = convert(dec!(1), &code(from), &code(to), &eur_table());
        match result {
            Err(CurrencyError::RateUnavailable { currency, base }) => {
                assert_eq!(currency, code("XYZ"));
                assert_eq!(base, code("EUR"));
            }
            other => panic!("expected RateUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_cross_rate() {
        let table = eur_table();
        assert_eq!(
            cross_rate(&table, &code("EUR"), &code("USD")).unwrap(),
            dec!(1.10)
        );
        assert_eq!(
            cross_rate(&table, &code("USD"), &code("USD")).unwrap(),
            Decimal::ONE
        );
    }

    #[test]
    fn test_overflow_reported() {
        let result = convert(Decimal::MAX, &code("EUR"), &code("IDR"), &eur_table());
        assert!(matches!(result, Err(CurrencyError::Overflow(_))));
    }

    #[test]
    fn test_no_intermediate_rounding() {
        let result = convert(dec!(0.01), &code("GBP"), &code("USD"), &eur_table()).unwrap();
        // 0.01 * 1.10 / 0.85 = 0.012941...
        assert!(result > dec!(0.0129) && result < dec!(0.0130));
    }
}
