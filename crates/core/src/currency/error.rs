//! Currency error types.

use rust_decimal::Decimal;
use spendflow_shared::types::{CurrencyCode, CurrencyCodeError};
use thiserror::Error;

/// Errors raised while building rate tables or converting amounts.
#[derive(Debug, Clone, Error)]
pub enum CurrencyError {
    /// The table has no rate for the requested currency.
    #[error("No exchange rate for {currency} in table anchored at {base}")]
    RateUnavailable {
        /// The missing currency.
        currency: CurrencyCode,
        /// Anchor currency of the table that was consulted.
        base: CurrencyCode,
    },

    /// A rate was zero or negative.
    #[error("Exchange rate for {0} must be positive")]
    NonPositiveRate(CurrencyCode),

    /// The anchor currency was quoted at something other than 1.
    #[error("Anchor currency {base} must have rate 1, got {rate}")]
    InconsistentBase {
        /// Anchor currency.
        base: CurrencyCode,
        /// The offending rate.
        rate: Decimal,
    },

    /// A currency code could not be parsed.
    #[error(transparent)]
    InvalidCode(#[from] CurrencyCodeError),

    /// Decimal arithmetic overflowed.
    #[error("Conversion of {0} overflowed")]
    Overflow(Decimal),

    /// The rate source failed or returned an unusable payload.
    #[error("Exchange rate source error: {0}")]
    Fetch(String),
}

impl CurrencyError {
    /// Returns true if the recovery path (refresh, retry, fallback) applies.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::RateUnavailable { .. } | Self::Fetch(_))
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCode(_) | Self::Overflow(_) => 400,
            Self::RateUnavailable { .. } | Self::Fetch(_) => 502,
            Self::NonPositiveRate(_) | Self::InconsistentBase { .. } => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::RateUnavailable { .. } => "RATE_UNAVAILABLE",
            Self::NonPositiveRate(_) | Self::InconsistentBase { .. } => "INVALID_RATE_TABLE",
            Self::InvalidCode(_) => "INVALID_CURRENCY",
            Self::Overflow(_) => "AMOUNT_OVERFLOW",
            Self::Fetch(_) => "RATE_SOURCE_ERROR",
        }
    }
}
