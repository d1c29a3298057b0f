//! Aggregate queries for reporting

use sqlx::SqlitePool;

use crate::{error::AppResult, models::book::PopularBook};

#[derive(Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Books ranked by historical loan count, newest first on ties
    pub async fn popular_books(&self, limit: i64) -> AppResult<Vec<PopularBook>> {
        let books = sqlx::query_as::<_, PopularBook>(
            r#"
            SELECT b.id, b.isbn, b.title, b.author, b.category, b.description,
                   b.total_copies, b.available_copies, b.created_at,
                   COUNT(l.id) AS loan_count
            FROM books b
            LEFT JOIN loans l ON b.id = l.book_id
            GROUP BY b.id
            ORDER BY loan_count DESC, b.created_at DESC, b.id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }
}
