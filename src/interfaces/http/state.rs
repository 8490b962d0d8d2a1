//! Shared handler state

use std::sync::Arc;
use std::time::Instant;

use sea_orm::DatabaseConnection;

use crate::application::AppServices;

/// Everything a handler can reach. Cloned per request; all fields are handles.
#[derive(Clone)]
pub struct ApiState {
    pub services: AppServices,
    pub db: DatabaseConnection,
    pub started_at: Arc<Instant>,
}

impl ApiState {
    pub fn new(services: AppServices, db: DatabaseConnection) -> Self {
        Self {
            services,
            db,
            started_at: Arc::new(Instant::now()),
        }
    }
}
