//! Tabetala Laboratory Management System
//!
//! REST JSON API for computer laboratories: users and roles, laboratories,
//! equipment inventory, class schedules and biometric attendance.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use api::create_router;
pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
