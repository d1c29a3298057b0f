//! Loan (borrow) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Loan row as stored; fines are kept in integer cents
#[derive(Debug, Clone, FromRow)]
pub struct LoanRow {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub is_returned: bool,
    pub fine_cents: i64,
}

/// Loan model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Loan {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub is_returned: bool,
    #[schema(value_type = String)]
    pub fine_amount: Decimal,
}

impl Loan {
    /// Open loans past their due date are overdue
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_returned && now > self.due_date
    }
}

impl From<LoanRow> for Loan {
    fn from(row: LoanRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            book_id: row.book_id,
            loan_date: row.loan_date,
            due_date: row.due_date,
            return_date: row.return_date,
            is_returned: row.is_returned,
            fine_amount: cents_to_amount(row.fine_cents),
        }
    }
}

/// Loan of the current user, with book details and overdue status
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanView {
    #[serde(flatten)]
    pub loan: Loan,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub is_overdue: bool,
}

/// Loan entry of a book's history
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanHistoryEntry {
    #[serde(flatten)]
    pub loan: Loan,
    pub username: String,
}

/// Loan with borrower and title, for the admin dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanDetails {
    #[serde(flatten)]
    pub loan: Loan,
    pub username: String,
    pub title: String,
    pub is_overdue: bool,
}

/// Outcome of a return
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReturnedLoan {
    pub loan: Loan,
    #[schema(value_type = String)]
    pub fine: Decimal,
}

/// Fine owed when a loan due at `due_date` is returned at `returned_at`.
///
/// Only whole days past the due date count; returning at or before the due
/// timestamp costs nothing.
pub fn compute_fine(due_date: DateTime<Utc>, returned_at: DateTime<Utc>, per_day: Decimal) -> Decimal {
    if returned_at <= due_date {
        return Decimal::ZERO;
    }
    let days_overdue = (returned_at - due_date).num_days();
    Decimal::from(days_overdue) * per_day
}

pub fn cents_to_amount(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Convert an amount to whole cents, truncating sub-cent digits
pub fn amount_to_cents(amount: Decimal) -> i64 {
    let cents = (amount * Decimal::ONE_HUNDRED).trunc();
    // Out-of-range amounts cannot be produced by the fine schedule
    i64::try_from(cents).unwrap_or(i64::MAX)
}
