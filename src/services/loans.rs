//! Circulation service: borrowing and returning books

use chrono::Duration;

use crate::{
    config::CirculationConfig,
    error::{AppError, AppResult},
    models::loan::{Loan, LoanDetails, LoanView, ReturnedLoan},
    repository::{loans::BorrowRequest, Repository},
};

use super::SharedClock;

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: CirculationConfig,
    clock: SharedClock,
}

impl LoansService {
    pub fn new(repository: Repository, config: CirculationConfig, clock: SharedClock) -> Self {
        Self {
            repository,
            config,
            clock,
        }
    }

    /// Borrow a book for `user_id`; the loan is due after the loan period
    pub async fn borrow(&self, user_id: i64, book_id: i64) -> AppResult<Loan> {
        self.require_active_user(user_id).await?;

        let now = self.clock.utc();
        let request = BorrowRequest {
            user_id,
            book_id,
            now,
            due_date: now + Duration::days(self.config.loan_period_days),
            max_open_loans: self.config.max_open_loans,
        };

        match self.repository.loans.borrow(request).await {
            Ok(loan) => {
                tracing::info!(
                    "Loan {} opened: user={} book={} due={}",
                    loan.id,
                    user_id,
                    book_id,
                    loan.due_date
                );
                Ok(loan)
            }
            Err(e) => {
                tracing::debug!("Borrow refused: user={} book={}: {}", user_id, book_id, e);
                Err(e)
            }
        }
    }

    /// Return a loan owned by `user_id`, charging any overdue fine
    pub async fn return_loan(&self, user_id: i64, loan_id: i64) -> AppResult<ReturnedLoan> {
        let loan = self
            .repository
            .loans
            .return_loan(user_id, loan_id, self.clock.utc(), self.config.fine_per_day)
            .await?;

        tracing::info!(
            "Loan {} returned: user={} book={} fine={}",
            loan.id,
            user_id,
            loan.book_id,
            loan.fine_amount
        );

        Ok(ReturnedLoan {
            fine: loan.fine_amount,
            loan,
        })
    }

    /// All loans of a user, newest first
    pub async fn get_user_loans(&self, user_id: i64) -> AppResult<Vec<LoanView>> {
        self.repository
            .loans
            .get_user_loans(user_id, self.clock.utc())
            .await
    }

    /// Every loan, for the admin dashboard
    pub async fn list_all(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list_all(self.clock.utc()).await
    }

    async fn require_active_user(&self, user_id: i64) -> AppResult<()> {
        let user = self.repository.users.get_by_id(user_id).await?;
        if !user.is_active {
            return Err(AppError::Authorization("Account is deactivated".to_string()));
        }
        Ok(())
    }
}
