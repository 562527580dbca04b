//! Biblio - Online Library Catalogue and Reservation Server
//!
//! A Rust REST API server exposing a public book catalogue and an
//! authenticated reservation workflow backed by Postgres and Redis.

use std::sync::Arc;

pub mod api;
pub mod config;
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
}
