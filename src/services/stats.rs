//! Reporting service


use crate::{
    error::AppResult,
    models::stats::{Dashboard, LibraryCounts, LibrarySummary},
    repository::Repository,
};

use super::SharedClock;

/// Number of books listed on the home page ranking
pub const POPULAR_BOOKS_LIMIT: i64 = 6;

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
    clock: SharedClock,
}

impl StatsService {
    pub fn new(repository: Repository, clock: SharedClock) -> Self {
        Self { repository, clock }
    }

    pub async fn counts(&self) -> AppResult<LibraryCounts> {
        Ok(LibraryCounts {
            total_books: self.repository.books.count().await?,
            total_users: self.repository.users.count().await?,
            active_loans: self.repository.loans.count_active().await?,
            overdue_loans: self.repository.loans.count_overdue(self.clock.utc()).await?,
        })
    }

    /// Home page summary
    pub async fn summary(&self) -> AppResult<LibrarySummary> {
        let counts = self.counts().await?;
        Ok(LibrarySummary {
            total_books: counts.total_books,
            total_users: counts.total_users,
            active_loans: counts.active_loans,
            popular_books: self.repository.stats.popular_books(POPULAR_BOOKS_LIMIT).await?,
        })
    }

    /// Administrator dashboard
    pub async fn dashboard(&self) -> AppResult<Dashboard> {
        Ok(Dashboard {
            counts: self.counts().await?,
            books: self.repository.books.list_all().await?,
            users: self.repository.users.list_all().await?,
            loans: self.repository.loans.list_all(self.clock.utc()).await?,
        })
    }
}
