//! Librarium Library Circulation Server
//!
//! A REST JSON API for a small lending library: accounts, catalog browsing,
//! borrowing and returning with due dates and overdue fines, and an
//! administrator dashboard.

use std::sync::Arc;

use sqlx::SqlitePool;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub pool: SqlitePool,
}

impl AppState {
    /// Wire repository and services over an open pool
    pub fn new(config: AppConfig, pool: SqlitePool, clock: services::SharedClock) -> Self {
        let repository = repository::Repository::new(pool.clone());
        let services = services::Services::new(repository, &config, clock);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
            pool,
        }
    }
}
