//! Reporting snapshots

use serde::Serialize;
use utoipa::ToSchema;

use super::{Book, LoanDetails, PopularBook, User};

/// Point-in-time counters
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LibraryCounts {
    pub total_books: i64,
    pub total_users: i64,
    pub active_loans: i64,
    pub overdue_loans: i64,
}

/// Public summary shown on the home page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LibrarySummary {
    pub total_books: i64,
    pub total_users: i64,
    pub active_loans: i64,
    pub popular_books: Vec<PopularBook>,
}

/// Administrator dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Dashboard {
    pub counts: LibraryCounts,
    pub books: Vec<Book>,
    pub users: Vec<User>,
    pub loans: Vec<LoanDetails>,
}
