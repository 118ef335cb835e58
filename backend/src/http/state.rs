//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::geocode::GeocodeClient;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Outbound geocoding client
    pub geocoder: Arc<GeocodeClient>,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>, geocoder: GeocodeClient) -> Self {
        Self {
            repository,
            geocoder: Arc::new(geocoder),
        }
    }
}
