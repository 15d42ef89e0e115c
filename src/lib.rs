//! Library Manager
//!
//! A book catalog served as a REST JSON API, with a terminal admin console
//! that consumes it.

use std::sync::Arc;

pub mod admin;
pub mod api;
pub mod capability;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod sanitize;
pub mod services;
pub mod validation;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use capability::CapabilityCheck;
use repository::BookStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub capability: Arc<dyn CapabilityCheck>,
}

impl AppState {
    /// Wire the services over `store`; mutating routes consult `capability`.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn BookStore>,
        capability: Arc<dyn CapabilityCheck>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(services::Services::new(store)),
            capability,
        }
    }
}
