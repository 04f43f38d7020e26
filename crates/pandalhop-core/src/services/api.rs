use async_trait::async_trait;

use super::DataService;
use crate::api::{ApiClient, ApiError};
use crate::models::{District, FoodStop, Pandal, Route};

/// Data service backed by the live API
pub struct ApiDataService {
    client: ApiClient,
}

impl ApiDataService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataService for ApiDataService {
    async fn get_routes(&self) -> Result<Vec<Route>, ApiError> {
        self.client.list_routes().await
    }

    async fn get_food_stops(&self) -> Result<Vec<FoodStop>, ApiError> {
        self.client.list_food_stops().await
    }

    async fn get_pandals(&self) -> Result<Vec<Pandal>, ApiError> {
        self.client.list_approved(None).await
    }

    async fn get_districts(&self) -> Result<Vec<District>, ApiError> {
        self.client.list_districts().await
    }
}
