//! Loans repository for database operations
//!
//! Borrow and return each run in a single transaction that opens with a
//! write, so SQLite grants the write lock before the transaction reads
//! anything and contending writers queue on the busy timeout instead of
//! failing on a stale snapshot. The store backs them up: stock changes are conditional updates, `books` carries a CHECK on
//! `0 <= available_copies <= total_copies`, and a partial unique index allows
//! one open loan per (user, book).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use crate::{
    error::{AppError, AppResult},
    models::loan::{amount_to_cents, compute_fine, Loan, LoanDetails, LoanRow, LoanView},
};

const LOAN_COLUMNS: &str =
    "id, user_id, book_id, loan_date, due_date, return_date, is_returned, fine_cents";

/// Parameters of a borrow
#[derive(Debug, Clone, Copy)]
pub struct BorrowRequest {
    pub user_id: i64,
    pub book_id: i64,
    pub now: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub max_open_loans: i64,
}

#[derive(Clone)]
pub struct LoansRepository {
    pool: SqlitePool,
}

impl LoansRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Loan> {
        sqlx::query_as::<_, LoanRow>(&format!("SELECT {LOAN_COLUMNS} FROM loans WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Loan::from)
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Open a loan and take one copy off the shelf
    pub async fn borrow(&self, request: BorrowRequest) -> AppResult<Loan> {
        let BorrowRequest {
            user_id,
            book_id,
            now,
            due_date,
            max_open_loans,
        } = request;

        let mut tx = self.pool.begin().await?;

        // Writing first takes the database write lock before anything is read
        let taken = sqlx::query(
            "UPDATE books SET available_copies = available_copies - 1 WHERE id = ? AND available_copies > 0",
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        if taken.rows_affected() == 0 {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = ?)")
                .bind(book_id)
                .fetch_one(&mut *tx)
                .await?;

            return Err(if exists {
                AppError::OutOfStock(format!("No copy of book {} is available", book_id))
            } else {
                AppError::NotFound(format!("Book with id {} not found", book_id))
            });
        }

        let already_borrowed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE user_id = ? AND book_id = ? AND is_returned = 0)",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_borrowed {
            return Err(already_borrowed_error(book_id));
        }

        let open_loans: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE user_id = ? AND is_returned = 0")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;

        if open_loans >= max_open_loans {
            return Err(AppError::LoanLimitExceeded {
                max: max_open_loans,
            });
        }

        let inserted = sqlx::query_as::<_, LoanRow>(&format!(
            r#"
            INSERT INTO loans (user_id, book_id, loan_date, due_date, is_returned, fine_cents)
            VALUES (?, ?, ?, ?, 0, 0)
            RETURNING {LOAN_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(book_id)
        .bind(now)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await;

        let row = match inserted {
            Ok(row) => row,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(already_borrowed_error(book_id));
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;

        Ok(row.into())
    }

    /// Close a loan of `user_id`, charge the fine and put the copy back
    pub async fn return_loan(
        &self,
        user_id: i64,
        loan_id: i64,
        now: DateTime<Utc>,
        fine_per_day: Decimal,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        // Closing first takes the write lock; the fine is settled once the
        // due date is known
        let closed = sqlx::query_as::<_, LoanRow>(&format!(
            r#"
            UPDATE loans
            SET is_returned = 1, return_date = ?
            WHERE id = ? AND user_id = ? AND is_returned = 0
            RETURNING {LOAN_COLUMNS}
            "#
        ))
        .bind(now)
        .bind(loan_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(closed) = closed else {
            let owned: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM loans WHERE id = ? AND user_id = ?)")
                    .bind(loan_id)
                    .bind(user_id)
                    .fetch_one(&mut *tx)
                    .await?;

            return Err(if owned {
                AppError::AlreadyReturned(loan_id)
            } else {
                AppError::NotFound(format!("Loan with id {} not found", loan_id))
            });
        };

        let fine = compute_fine(closed.due_date, now, fine_per_day);

        let settled = sqlx::query_as::<_, LoanRow>(&format!(
            "UPDATE loans SET fine_cents = ? WHERE id = ? RETURNING {LOAN_COLUMNS}"
        ))
        .bind(amount_to_cents(fine))
        .bind(loan_id)
        .fetch_one(&mut *tx)
        .await?;

        let restocked = sqlx::query(
            "UPDATE books SET available_copies = available_copies + 1 WHERE id = ? AND available_copies < total_copies",
        )
        .bind(settled.book_id)
        .execute(&mut *tx)
        .await?;

        if restocked.rows_affected() == 0 {
            return Err(AppError::Internal(format!(
                "Book {} has no copy on loan to take back",
                settled.book_id
            )));
        }

        tx.commit().await?;

        Ok(settled.into())
    }

    /// All loans of a user with book details, newest first
    pub async fn get_user_loans(&self, user_id: i64, now: DateTime<Utc>) -> AppResult<Vec<LoanView>> {
        #[derive(sqlx::FromRow)]
        struct UserLoanRow {
            #[sqlx(flatten)]
            loan: LoanRow,
            title: String,
            author: String,
            isbn: Option<String>,
        }

        let rows = sqlx::query_as::<_, UserLoanRow>(
            r#"
            SELECT l.id, l.user_id, l.book_id, l.loan_date, l.due_date, l.return_date,
                   l.is_returned, l.fine_cents, b.title, b.author, b.isbn
            FROM loans l
            JOIN books b ON l.book_id = b.id
            WHERE l.user_id = ?
            ORDER BY l.loan_date DESC, l.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let loan = Loan::from(row.loan);
                LoanView {
                    is_overdue: loan.is_overdue_at(now),
                    loan,
                    title: row.title,
                    author: row.author,
                    isbn: row.isbn,
                }
            })
            .collect())
    }

    /// Every loan with borrower and title, newest first
    pub async fn list_all(&self, now: DateTime<Utc>) -> AppResult<Vec<LoanDetails>> {
        #[derive(sqlx::FromRow)]
        struct DetailsRow {
            #[sqlx(flatten)]
            loan: LoanRow,
            username: String,
            title: String,
        }

        let rows = sqlx::query_as::<_, DetailsRow>(
            r#"
            SELECT l.id, l.user_id, l.book_id, l.loan_date, l.due_date, l.return_date,
                   l.is_returned, l.fine_cents, u.username, b.title
            FROM loans l
            JOIN users u ON l.user_id = u.id
            JOIN books b ON l.book_id = b.id
            ORDER BY l.loan_date DESC, l.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let loan = Loan::from(row.loan);
                LoanDetails {
                    is_overdue: loan.is_overdue_at(now),
                    loan,
                    username: row.username,
                    title: row.title,
                }
            })
            .collect())
    }

    /// Count open loans of a user
    pub async fn count_open_for_user(&self, user_id: i64) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE user_id = ? AND is_returned = 0")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count active loans
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE is_returned = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count open loans past their due date
    pub async fn count_overdue(&self, now: DateTime<Utc>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE is_returned = 0 AND due_date < ?",
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

fn already_borrowed_error(book_id: i64) -> AppError {
    AppError::AlreadyBorrowed(format!("Book {} is already on loan to this user", book_id))
}
