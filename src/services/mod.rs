//! Business logic services

pub mod accounts;
pub mod cache;
pub mod catalog;
pub mod reservations;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub accounts: accounts::AccountsService,
    pub catalog: catalog::CatalogService,
    pub reservations: reservations::ReservationsService,
    pub cache: cache::CacheService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        cache_service: cache::CacheService,
    ) -> Self {
        Self {
            accounts: accounts::AccountsService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone(), cache_service.clone()),
            reservations: reservations::ReservationsService::new(
                repository.clone(),
                cache_service.clone(),
            ),
            cache: cache_service,
            repository,
        }
    }
}
