//! Exchange-rate sources.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client as HttpClient;
use rust_decimal::Decimal;
use serde::Deserialize;
use spendflow_shared::types::CurrencyCode;

use super::error::CurrencyError;
use super::rates::ExchangeRateTable;

/// Source of exchange-rate tables.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches a full table anchored at `base`.
    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<ExchangeRateTable, CurrencyError>;
}

/// Fetches tables from a JSON endpoint shaped like
/// `{"base": "USD", "rates": {"EUR": 0.92, ...}}` at `{base_url}/{BASE}`.
pub struct HttpRateProvider {
    base_url: String,
    http_client: HttpClient,
}

#[derive(Debug, Deserialize)]
struct RatesPayload {
    #[serde(default)]
    base: Option<String>,
    rates: HashMap<String, serde_json::Number>,
}

impl HttpRateProvider {
    /// Creates a provider with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CurrencyError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CurrencyError::Fetch(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn parse_payload(
        requested: &CurrencyCode,
        payload: RatesPayload,
    ) -> Result<ExchangeRateTable, CurrencyError> {
        if let Some(base) = payload.base.as_deref() {
            let returned = CurrencyCode::parse(base)?;
            if &returned != requested {
                return Err(CurrencyError::Fetch(format!(
                    "requested rates for {requested}, source answered for {returned}"
                )));
            }
        }

        let mut rates = Vec::with_capacity(payload.rates.len());
        for (raw_code, raw_rate) in payload.rates {
            let Ok(code) = CurrencyCode::parse(&raw_code) else {
                tracing::debug!(code = %raw_code, "Skipping unparseable currency code");
                continue;
            };
            let text = raw_rate.to_string();
            let rate = Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map_err(|e| CurrencyError::Fetch(format!("rate for {code} is not a number: {e}")))?;
            rates.push((code, rate));
        }

        ExchangeRateTable::new(requested.clone(), rates, Utc::now())
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<ExchangeRateTable, CurrencyError> {
        let url = format!("{}/{}", self.base_url, base);
        tracing::debug!(%url, "Fetching exchange rates");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| CurrencyError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CurrencyError::Fetch(format!(
                "rate source returned HTTP {status}"
            )));
        }

        let payload: RatesPayload = response
            .json()
            .await
            .map_err(|e| CurrencyError::Fetch(e.to_string()))?;

        let table = Self::parse_payload(base, payload)?;
        tracing::info!(base = %base, currencies = table.len(), "Fetched exchange rates");
        Ok(table)
    }
}

/// Serves a fixed table, rebased to whatever anchor is requested.
///
/// Used by tests and by deployments without network access to a rate source.
#[derive(Debug, Clone)]
pub struct StaticRateProvider {
    table: ExchangeRateTable,
}

impl StaticRateProvider {
    /// Wraps a table.
    #[must_use]
    pub const fn new(table: ExchangeRateTable) -> Self {
        Self { table }
    }
}

#[async_trait]
impl RateProvider for StaticRateProvider {
    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<ExchangeRateTable, CurrencyError> {
        if self.table.base_currency() == base {
            return Ok(self.table.clone());
        }
        self.table.rebased(base)
    }
}
