//! Exchange-rate table snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use spendflow_shared::types::CurrencyCode;

use super::conversion;
use super::error::CurrencyError;

/// A point-in-time set of rates, all quoted against one anchor currency.
///
/// `rates[c]` is how many units of `c` one unit of the anchor buys, so the
/// anchor itself is always exactly 1. Tables are immutable: a refresh builds
/// a new table and replaces the old one wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeRateTable {
    base_currency: CurrencyCode,
    rates: BTreeMap<CurrencyCode, Decimal>,
    fetched_at: DateTime<Utc>,
}

impl ExchangeRateTable {
    /// Builds a table anchored at `base_currency`.
    ///
    /// The anchor is inserted with rate 1 when absent.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveRate` for any rate <= 0 and `InconsistentBase` if
    /// the anchor is quoted at anything other than 1.
    pub fn new(
        base_currency: CurrencyCode,
        rates: impl IntoIterator<Item = (CurrencyCode, Decimal)>,
        fetched_at: DateTime<Utc>,
    ) -> Result<Self, CurrencyError> {
        let mut table = BTreeMap::new();
        for (code, rate) in rates {
            if rate <= Decimal::ZERO {
                return Err(CurrencyError::NonPositiveRate(code));
            }
            if code == base_currency && rate != Decimal::ONE {
                return Err(CurrencyError::InconsistentBase {
                    base: code,
                    rate,
                });
            }
            table.insert(code, rate);
        }
        table.insert(base_currency.clone(), Decimal::ONE);

        Ok(Self {
            base_currency,
            rates: table,
            fetched_at,
        })
    }

    /// A table that only knows its own anchor.
    #[must_use]
    pub fn identity(base_currency: CurrencyCode) -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(base_currency.clone(), Decimal::ONE);
        Self {
            base_currency,
            rates,
            fetched_at: Utc::now(),
        }
    }

    /// Anchor currency of this table.
    #[must_use]
    pub const fn base_currency(&self) -> &CurrencyCode {
        &self.base_currency
    }

    /// When the quotes were obtained.
    #[must_use]
    pub const fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Rate for `code`, if quoted.
    #[must_use]
    pub fn rate(&self, code: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(code).copied()
    }

    /// Returns true if `code` is quoted.
    #[must_use]
    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.rates.contains_key(code)
    }

    /// Number of quoted currencies, anchor included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Always false: the anchor is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Iterates quotes in currency-code order.
    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, &Decimal)> {
        self.rates.iter()
    }

    /// Converts using this table. See [`conversion::convert`].
    ///
    /// # Errors
    ///
    /// Returns `RateUnavailable` when either currency is missing.
    pub fn convert(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Decimal, CurrencyError> {
        conversion::convert(amount, from, to, self)
    }

    /// Re-expresses the same quotes against another anchor.
    ///
    /// # Errors
    ///
    /// Returns `RateUnavailable` if `new_base` is not quoted, or `Overflow`
    /// if a quote cannot be represented.
    pub fn rebased(&self, new_base: &CurrencyCode) -> Result<Self, CurrencyError> {
        let pivot = self
            .rate(new_base)
            .ok_or_else(|| CurrencyError::RateUnavailable {
                currency: new_base.clone(),
                base: self.base_currency.clone(),
            })?;

        let mut rates = BTreeMap::new();
        for (code, rate) in &self.rates {
            let rebased = if code == new_base {
                Decimal::ONE
            } else {
                rate.checked_div(pivot)
                    .ok_or(CurrencyError::Overflow(*rate))?
            };
            rates.insert(code.clone(), rebased);
        }

        Ok(Self {
            base_currency: new_base.clone(),
            rates,
            fetched_at: self.fetched_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    fn usd_table() -> ExchangeRateTable {
        ExchangeRateTable::new(
            code("USD"),
            [(code("EUR"), dec!(0.8)), (code("JPY"), dec!(150))],
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_anchor_inserted_with_rate_one() {
        let table = usd_table();
        assert_eq!(table.rate(&code("USD")), Some(Decimal::ONE));
        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_anchor_quoted_at_one_accepted() {
        let table = ExchangeRateTable::new(
            code("USD"),
            [(code("USD"), dec!(1.000)), (code("EUR"), dec!(0.8))],
            Utc::now(),
        );
        assert!(table.is_ok());
    }

    #[test]
    fn test_anchor_quoted_wrong_rejected() {
        let result = ExchangeRateTable::new(code("USD"), [(code("USD"), dec!(1.1))], Utc::now());
        assert!(matches!(
            result,
            Err(CurrencyError::InconsistentBase { .. })
        ));
    }

    #[test]
    fn test_non_positive_rate_rejected() {
        let result = ExchangeRateTable::new(code("USD"), [(code("EUR"), dec!(0))], Utc::now());
        assert!(matches!(result, Err(CurrencyError::NonPositiveRate(_))));

        let result = ExchangeRateTable::new(code("USD"), [(code("EUR"), dec!(-1))], Utc::now());
        assert!(matches!(result, Err(CurrencyError::NonPositiveRate(_))));
    }

    #[test]
    fn test_identity_table() {
        let table = ExchangeRateTable::identity(code("EUR"));
        assert_eq!(table.len(), 1);
        assert!(table.contains(&code("EUR")));
        assert!(!table.contains(&code("USD")));
    }

    #[test]
    fn test_rebased_to_quoted_currency() {
        let table = usd_table().rebased(&code("EUR")).unwrap();

        assert_eq!(table.base_currency(), &code("EUR"));
        assert_eq!(table.rate(&code("EUR")), Some(Decimal::ONE));
        assert_eq!(table.rate(&code("USD")), Some(dec!(1.25)));
        assert_eq!(table.rate(&code("JPY")), Some(dec!(187.5)));
    }

    #[test]
    fn test_rebased_to_unknown_currency_fails() {
        let result = usd_table().rebased(&code("GBP"));
        assert!(matches!(
            result,
            Err(CurrencyError::RateUnavailable { .. })
        ));
    }

    #[test]
    fn test_iter_sorted_by_code() {
        let table = usd_table();
        let codes: Vec<_> = table.iter().map(|(c, _)| c.as_str().to_string()).collect();
        assert_eq!(codes, vec!["EUR", "JPY", "USD"]);
    }
}
