//! Expense records.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendflow_shared::types::{CurrencyCode, ExpenseId, Money, UserId};

use crate::workflow::{ApprovalAction, ApprovalState, ExpenseStatus};

/// A submitted expense.
///
/// `base_amount` is computed once at submission from the rate valid then
/// and is never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID.
    pub id: ExpenseId,
    /// Who submitted it.
    pub submitter_id: UserId,
    /// Submitter username at submission time.
    pub submitter_name: String,
    /// Spending category.
    pub category: String,
    /// Free text; may be empty.
    pub description: String,
    /// Amount as entered.
    pub amount: Decimal,
    /// Currency as entered.
    pub currency: CurrencyCode,
    /// Amount in the company base currency, rounded for storage.
    pub base_amount: Decimal,
    /// Company base currency at submission time.
    pub base_currency: CurrencyCode,
    /// Effective multiplier from `currency` to `base_currency`.
    pub conversion_rate: Decimal,
    /// True when no rate was available and an identity rate was used.
    pub rate_degraded: bool,
    /// Calendar date of the expense.
    pub expense_date: NaiveDate,
    /// Approval position.
    #[serde(flatten)]
    pub approval: ApprovalState,
    /// Approval actions, oldest first.
    pub history: Vec<ApprovalAction>,
    /// Incremented on every status change.
    pub version: i64,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Current disposition.
    #[must_use]
    pub const fn status(&self) -> ExpenseStatus {
        self.approval.status
    }

    /// Amount as entered.
    #[must_use]
    pub fn original(&self) -> Money {
        Money::new(self.amount, self.currency.clone())
    }

    /// Normalized amount.
    #[must_use]
    pub fn normalized(&self) -> Money {
        Money::new(self.base_amount, self.base_currency.clone())
    }
}

/// Input for a new expense.
///
/// Approval state is never accepted from the client; it is derived from the
/// configured flow.
#[derive(Debug, Clone, Deserialize)]
pub struct NewExpense {
    /// Amount in `currency`.
    pub amount: Decimal,
    /// Three-letter currency code.
    pub currency: String,
    /// Spending category.
    pub category: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
    /// Calendar date of the expense.
    #[serde(alias = "date")]
    pub expense_date: NaiveDate,
}
