//! Books repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, CreateBook},
        loan::{LoanHistoryEntry, LoanRow},
    },
};

const BOOK_COLUMNS: &str = "id, isbn, title, author, category, description, \
     total_copies, available_copies, created_at";

#[derive(Clone)]
pub struct BooksRepository {
    pool: SqlitePool,
}

impl BooksRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Search books by text and category, newest first
    pub async fn search(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {BOOK_COLUMNS} FROM books WHERE 1 = 1"));

        if let Some(text) = query.text() {
            // instr() keeps LIKE wildcards in user input literal
            builder
                .push(" AND (instr(lower(title), lower(")
                .push_bind(text.to_string())
                .push(")) > 0 OR instr(lower(author), lower(")
                .push_bind(text.to_string())
                .push(")) > 0 OR instr(lower(COALESCE(isbn, '')), lower(")
                .push_bind(text.to_string())
                .push(")) > 0)");
        }

        if let Some(category) = query.category() {
            builder.push(" AND category = ").push_bind(category.to_string());
        }

        builder.push(" ORDER BY created_at DESC, id DESC");

        let books = builder
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Distinct categories, sorted
    pub async fn categories(&self) -> AppResult<Vec<String>> {
        let categories: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT category FROM books WHERE category IS NOT NULL ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    /// Most recent loans of a book with the borrower's username
    pub async fn loan_history(&self, book_id: i64, limit: i64) -> AppResult<Vec<LoanHistoryEntry>> {
        #[derive(sqlx::FromRow)]
        struct HistoryRow {
            #[sqlx(flatten)]
            loan: LoanRow,
            username: String,
        }

        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT l.id, l.user_id, l.book_id, l.loan_date, l.due_date, l.return_date,
                   l.is_returned, l.fine_cents, u.username
            FROM loans l
            JOIN users u ON l.user_id = u.id
            WHERE l.book_id = ?
            ORDER BY l.loan_date DESC, l.id DESC
            LIMIT ?
            "#,
        )
        .bind(book_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| LoanHistoryEntry {
                loan: row.loan.into(),
                username: row.username,
            })
            .collect())
    }

    /// Create a book with every copy available
    pub async fn create(&self, book: &CreateBook, now: DateTime<Utc>) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (isbn, title, author, category, description,
                               total_copies, available_copies, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.category)
        .bind(&book.description)
        .bind(book.total_copies)
        .bind(book.total_copies)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Create a book unless one with the same ISBN (or same title, without ISBN) exists
    pub async fn create_if_absent(&self, book: &CreateBook, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO books (isbn, title, author, category, description,
                               total_copies, available_copies, created_at)
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?6, ?7
            WHERE NOT EXISTS (
                SELECT 1 FROM books
                WHERE (?1 IS NOT NULL AND isbn = ?1) OR (?1 IS NULL AND title = ?2)
            )
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.category)
        .bind(&book.description)
        .bind(book.total_copies)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List all books, newest first
    pub async fn list_all(&self) -> AppResult<Vec<Book>> {
        self.search(&BookQuery::default()).await
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
