//! GearGuard Maintenance Tracking Server
//!
//! REST JSON API for tracking company equipment, the maintenance teams that
//! look after it, and the maintenance requests that move through a Kanban
//! stage workflow.

use std::{sync::Arc, time::Instant};

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
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, services: services::Services) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
            started_at: Instant::now(),
        }
    }
}
