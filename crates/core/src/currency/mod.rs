//! Multi-currency handling and exchange rates.
//!
//! Every stored amount is normalized into one company base currency at
//! submission time. Rates come from an external [`RateProvider`] as whole
//! tables anchored at a single currency; the [`CurrencyConverter`] keeps the
//! current table behind an atomic swap and owns the refresh/fallback policy.
//!
//! # Modules
//!
//! - `rates` - Exchange-rate table snapshot
//! - `conversion` - Pure cross-rate conversion
//! - `provider` - Rate sources (HTTP and static)
//! - `converter` - Converter service with refresh, retry and degraded mode
//! - `error` - Currency error types

pub mod conversion;
pub mod converter;
pub mod error;
pub mod provider;
pub mod rates;

#[cfg(test)]
mod props;

pub use conversion::{convert, cross_rate};
pub use converter::{Conversion, CurrencyConverter};
pub use error::CurrencyError;
pub use provider::{HttpRateProvider, RateProvider, StaticRateProvider};
pub use rates::ExchangeRateTable;
