//! Book Lending Server
//!
//! A REST JSON API for a library book catalog: book CRUD plus take/return
//! lending actions, with race-free state transitions in the storage layer.

use std::sync::Arc;

pub mod api;
pub mod auth;
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
    pub authenticator: Arc<dyn auth::Authenticator>,
}
