//! Catalog service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, CreateBook},
        loan::LoanHistoryEntry,
    },
    repository::Repository,
};

use super::SharedClock;

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    clock: SharedClock,
}

impl CatalogService {
    pub fn new(repository: Repository, clock: SharedClock) -> Self {
        Self { repository, clock }
    }

    /// Search books with filters
    pub async fn search(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        self.repository.books.search(query).await
    }

    /// Get book by ID
    pub async fn get(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Most recent loans of a book
    pub async fn loan_history(&self, book_id: i64, limit: i64) -> AppResult<Vec<LoanHistoryEntry>> {
        if limit < 1 {
            return Err(AppError::Validation("Limit must be positive".to_string()));
        }
        // 404 for unknown books rather than an empty history
        self.repository.books.get_by_id(book_id).await?;
        self.repository.books.loan_history(book_id, limit).await
    }

    pub async fn categories(&self) -> AppResult<Vec<String>> {
        self.repository.books.categories().await
    }

    /// Add a book to the catalog
    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        let book = CreateBook {
            title: book.title.trim().to_string(),
            author: book.author.trim().to_string(),
            isbn: non_blank(book.isbn),
            category: non_blank(book.category),
            description: non_blank(book.description),
            total_copies: book.total_copies,
        };

        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let created = self.repository.books.create(&book, self.clock.utc()).await?;
        tracing::info!("Catalog: added '{}' (id={}, {} copies)", created.title, created.id, created.total_copies);
        Ok(created)
    }

    /// Add a book unless it is already catalogued
    pub async fn create_if_absent(&self, book: &CreateBook) -> AppResult<bool> {
        self.repository.books.create_if_absent(book, self.clock.utc()).await
    }

    pub async fn list_all(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list_all().await
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
