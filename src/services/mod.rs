//! Business logic services

pub mod bootstrap;
pub mod catalog;
pub mod loans;
pub mod stats;
pub mod users;

use std::sync::Arc;

use mockable::Clock;

use crate::{config::AppConfig, repository::Repository};

/// Source of the current time shared by services
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig, clock: SharedClock) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), config.auth.clone(), clock.clone()),
            catalog: catalog::CatalogService::new(repository.clone(), clock.clone()),
            loans: loans::LoansService::new(
                repository.clone(),
                config.circulation.clone(),
                clock.clone(),
            ),
            stats: stats::StatsService::new(repository, clock),
        }
    }
}
