//! Property-based tests for currency conversion.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use spendflow_shared::types::{CurrencyCode, round_money};

use super::conversion::convert;
use super::rates::ExchangeRateTable;

/// Strategy to generate positive amounts (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate positive rates (0.0001 to 10000.0000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn currency_code() -> impl Strategy<Value = CurrencyCode> {
    "[A-Z]{3}".prop_map(|s| CurrencyCode::parse(&s).unwrap())
}

fn code(s: &str) -> CurrencyCode {
    CurrencyCode::parse(s).unwrap()
}

fn table_with(base: &CurrencyCode, other: &CurrencyCode, rate: Decimal) -> ExchangeRateTable {
    ExchangeRateTable::new(base.clone(), [(other.clone(), rate)], Utc::now()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Same-currency conversion never consults the table.
    #[test]
    fn prop_same_currency_is_identity(
        amount in positive_amount(),
        currency in currency_code(),
    ) {
        let table = ExchangeRateTable::identity(code("USD"));
        prop_assert_eq!(convert(amount, &currency, &currency, &table).unwrap(), amount);
    }

    /// Converting out of the anchor multiplies by the quoted rate.
    #[test]
    fn prop_from_base_multiplies(
        amount in positive_amount(),
        rate in positive_rate(),
    ) {
        let (base, other) = (code("USD"), code("EUR"));
        let table = table_with(&base, &other, rate);
        prop_assert_eq!(convert(amount, &base, &other, &table).unwrap(), amount * rate);
    }

    /// Converting into the anchor divides by the quoted rate.
    #[test]
    fn prop_to_base_divides(
        amount in positive_amount(),
        rate in positive_rate(),
    ) {
        let (base, other) = (code("USD"), code("EUR"));
        let table = table_with(&base, &other, rate);
        prop_assert_eq!(convert(amount, &other, &base, &table).unwrap(), amount / rate);
    }

    /// A round trip lands within one cent once rounded for storage.
    #[test]
    fn prop_round_trip_within_a_cent(
        amount in positive_amount(),
        rate in positive_rate(),
    ) {
        let (base, other) = (code("USD"), code("EUR"));
        let table = table_with(&base, &other, rate);

        let there = convert(amount, &base, &other, &table).unwrap();
        let back = convert(there, &other, &base, &table).unwrap();

        prop_assert!((round_money(back) - amount).abs() <= Decimal::new(1, 2));
    }

    /// Rebasing a table does not change any cross conversion beyond rounding.
    #[test]
    fn prop_rebased_preserves_conversion(
        amount in positive_amount(),
        eur in positive_rate(),
        gbp in positive_rate(),
    ) {
        let table = ExchangeRateTable::new(
            code("USD"),
            [(code("EUR"), eur), (code("GBP"), gbp)],
            Utc::now(),
        )
        .unwrap();
        let rebased = table.rebased(&code("EUR")).unwrap();

        let direct = convert(amount, &code("GBP"), &code("USD"), &table).unwrap();
        let via_rebased = convert(amount, &code("GBP"), &code("USD"), &rebased).unwrap();

        prop_assert!((round_money(direct) - round_money(via_rebased)).abs() <= Decimal::new(1, 2));
    }

    /// Stored amounts always carry at most two decimal places.
    #[test]
    fn prop_storage_rounding_scale(
        amount in positive_amount(),
        rate in positive_rate(),
    ) {
        let table = table_with(&code("USD"), &code("JPY"), rate);
        let stored = round_money(convert(amount, &code("JPY"), &code("USD"), &table).unwrap());
        prop_assert!(stored.scale() <= 2);
    }
}
