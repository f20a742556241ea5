//! Input validation for new expenses.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use spendflow_shared::types::{CurrencyCode, CurrencyCodeError, round_money};
use thiserror::Error;

use super::model::NewExpense;

/// Largest accepted amount, in entered currency units.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0); // 1e12
/// Longest accepted category.
pub const MAX_CATEGORY_LEN: usize = 100;
/// Longest accepted description.
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Reasons a new expense is rejected before any state change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Amount is zero or negative, or rounds to zero at storage precision.
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Amount exceeds [`MAX_AMOUNT`].
    #[error("amount {0} exceeds the maximum of {max}", max = MAX_AMOUNT)]
    AmountTooLarge(Decimal),

    /// Currency code malformed.
    #[error(transparent)]
    InvalidCurrency(#[from] CurrencyCodeError),

    /// Category missing.
    #[error("category is required")]
    EmptyCategory,

    /// A text field is too long.
    #[error("{field} must be at most {max} characters")]
    FieldTooLong {
        /// Field name.
        field: &'static str,
        /// Limit.
        max: usize,
    },

    /// Expense dated in the future.
    #[error("expense date {0} is in the future")]
    FutureDate(NaiveDate),
}

/// A [`NewExpense`] that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidExpense {
    /// Positive amount as entered; rounded only when stored.
    pub amount: Decimal,
    /// Normalized currency.
    pub currency: CurrencyCode,
    /// Trimmed, non-empty category.
    pub category: String,
    /// Trimmed description.
    pub description: String,
    /// Expense date.
    pub expense_date: NaiveDate,
}

/// Validates `input` against `today`.
///
/// Dates up to one day ahead are accepted to absorb time-zone differences
/// between the submitter and the server.
pub fn validate(input: &NewExpense, today: NaiveDate) -> Result<ValidExpense, ValidationError> {
    let amount = input.amount.normalize();
    if round_money(amount) <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(input.amount));
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge(input.amount));
    }

    let currency = CurrencyCode::parse(&input.currency)?;

    let category = input.category.trim();
    if category.is_empty() {
        return Err(ValidationError::EmptyCategory);
    }
    if category.chars().count() > MAX_CATEGORY_LEN {
        return Err(ValidationError::FieldTooLong {
            field: "category",
            max: MAX_CATEGORY_LEN,
        });
    }

    let description = input.description.trim();
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::FieldTooLong {
            field: "description",
            max: MAX_DESCRIPTION_LEN,
        });
    }

    let latest = today.checked_add_days(Days::new(1)).unwrap_or(today);
    if input.expense_date > latest {
        return Err(ValidationError::FutureDate(input.expense_date));
    }

    Ok(ValidExpense {
        amount,
        currency,
        category: category.to_string(),
        description: description.to_string(),
        expense_date: input.expense_date,
    })
}
