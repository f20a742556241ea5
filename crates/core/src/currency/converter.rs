//! Converter service: owns the live rate table and the recovery policy.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;
use spendflow_shared::types::{CurrencyCode, Money};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::conversion;
use super::error::CurrencyError;
use super::provider::RateProvider;
use super::rates::ExchangeRateTable;

/// Outcome of converting an amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    /// Amount as entered.
    pub original: Money,
    /// Converted amount, rounded to storage precision.
    pub converted: Money,
    /// Effective multiplier applied (`converted ~= original * rate`).
    pub rate: Decimal,
    /// True when no rate could be found and an identity rate was used.
    pub degraded: bool,
}

/// Converts amounts using the current rate table.
///
/// The table is swapped as a whole on refresh; a conversion always sees one
/// consistent snapshot. When a rate is missing the converter fetches a table
/// anchored at the source currency, installs it and retries once. If that
/// still fails it either degrades to a rate of 1 (logged at `warn` and
/// flagged on the result) or returns the error, depending on configuration.
pub struct CurrencyConverter {
    base_currency: CurrencyCode,
    provider: Arc<dyn RateProvider>,
    table: RwLock<Arc<ExchangeRateTable>>,
    fallback_to_identity: bool,
}

impl CurrencyConverter {
    /// Creates a converter seeded with an identity table for the base currency.
    ///
    /// Call [`refresh`](Self::refresh) to load real quotes.
    pub fn new(
        base_currency: CurrencyCode,
        provider: Arc<dyn RateProvider>,
        fallback_to_identity: bool,
    ) -> Self {
        let table = Arc::new(ExchangeRateTable::identity(base_currency.clone()));
        Self {
            base_currency,
            provider,
            table: RwLock::new(table),
            fallback_to_identity,
        }
    }

    /// Company base currency.
    pub const fn base_currency(&self) -> &CurrencyCode {
        &self.base_currency
    }

    /// Current table snapshot.
    pub async fn snapshot(&self) -> Arc<ExchangeRateTable> {
        Arc::clone(&*self.table.read().await)
    }

    /// Replaces the current table.
    pub async fn install(&self, table: ExchangeRateTable) {
        let table = Arc::new(table);
        *self.table.write().await = table;
    }

    /// Fetches a fresh table anchored at the base currency and installs it.
    pub async fn refresh(&self) -> Result<Arc<ExchangeRateTable>, CurrencyError> {
        let base = self.base_currency.clone();
        self.refresh_anchored(&base).await
    }

    /// Fetches a fresh table anchored at `anchor` and installs it.
    pub async fn refresh_anchored(
        &self,
        anchor: &CurrencyCode,
    ) -> Result<Arc<ExchangeRateTable>, CurrencyError> {
        let table = Arc::new(self.provider.fetch_rates(anchor).await?);
        *self.table.write().await = Arc::clone(&table);
        tracing::info!(
            anchor = %anchor,
            currencies = table.len(),
            "Installed exchange-rate table"
        );
        Ok(table)
    }

    /// Converts `amount` from `from` into the base currency.
    pub async fn to_base(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
    ) -> Result<Conversion, CurrencyError> {
        let base = self.base_currency.clone();
        self.convert(amount, from, &base).await
    }

    /// Converts `amount` with the current table only.
    ///
    /// Never fetches or swaps tables; a missing rate is `RateUnavailable`.
    pub async fn quote(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Conversion, CurrencyError> {
        let table = self.snapshot().await;
        Self::apply(&table, amount, from, to)
    }

    /// Converts `amount` between two currencies, applying the recovery path.
    pub async fn convert(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Conversion, CurrencyError> {
        let table = self.snapshot().await;
        let error = match Self::apply(&table, amount, from, to) {
            Ok(conversion) => return Ok(conversion),
            Err(e @ CurrencyError::RateUnavailable { .. }) => e,
            Err(e) => return Err(e),
        };

        tracing::warn!(
            from = %from,
            to = %to,
            error = %error,
            "Rate missing, refreshing table and retrying once"
        );

        let retried = match self.refresh_anchored(from).await {
            Ok(fresh) => Self::apply(&fresh, amount, from, to),
            Err(e) => Err(e),
        };

        match retried {
            Ok(conversion) => Ok(conversion),
            Err(e) if e.is_recoverable() && self.fallback_to_identity => {
                tracing::warn!(
                    from = %from,
                    to = %to,
                    %amount,
                    error = %e,
                    "No exchange rate available, falling back to identity rate"
                );
                Ok(Conversion {
                    original: Money::new(amount, from.clone()),
                    converted: Money::new(amount, to.clone()).rounded(),
                    rate: Decimal::ONE,
                    degraded: true,
                })
            }
            Err(e) => Err(e),
        }
    }

    fn apply(
        table: &ExchangeRateTable,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Conversion, CurrencyError> {
        let converted = conversion::convert(amount, from, to, table)?;
        let rate = conversion::cross_rate(table, from, to)?;
        Ok(Conversion {
            original: Money::new(amount, from.clone()),
            converted: Money::new(converted, to.clone()).rounded(),
            rate,
            degraded: false,
        })
    }

    /// Spawns a task that refreshes the base table every `interval`.
    ///
    /// Failures are logged and the previous table stays in place.
    pub fn spawn_refresh(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.refresh().await {
                    tracing::error!(error = %e, "Scheduled exchange-rate refresh failed");
                }
            }
        })
    }
}
