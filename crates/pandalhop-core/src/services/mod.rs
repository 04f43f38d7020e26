//! Swappable data service for the browse views.
//!
//! `ApiDataService` reads from the live API; `MockDataService` serves a small
//! static catalog so front ends can be exercised without a backend.
//! `data_service` picks one according to `Config::use_mock_data`.

pub mod api;
pub mod mock;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::models::{District, FoodStop, Pandal, Route};

pub use api::ApiDataService;
pub use mock::MockDataService;

#[async_trait]
pub trait DataService: Send + Sync {
    async fn get_routes(&self) -> Result<Vec<Route>, ApiError>;
    async fn get_food_stops(&self) -> Result<Vec<FoodStop>, ApiError>;
    /// Approved pandals only
    async fn get_pandals(&self) -> Result<Vec<Pandal>, ApiError>;
    async fn get_districts(&self) -> Result<Vec<District>, ApiError>;
}

pub fn data_service(config: &Config, client: ApiClient) -> Arc<dyn DataService> {
    if config.use_mock_data {
        Arc::new(MockDataService::with_latency(Duration::from_millis(
            config.mock_latency_ms,
        )))
    } else {
        Arc::new(ApiDataService::new(client))
    }
}
