use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::DataService;
use crate::api::ApiError;
use crate::models::{District, FoodStop, Location, Pandal, PandalStatus, Route};

/// Simulated network delay
const DEFAULT_LATENCY_MS: u64 = 500;

/// Static catalog for running without a backend
pub struct MockDataService {
    latency: Duration,
}

impl MockDataService {
    pub fn new() -> Self {
        Self::with_latency(Duration::from_millis(DEFAULT_LATENCY_MS))
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for MockDataService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataService for MockDataService {
    async fn get_routes(&self) -> Result<Vec<Route>, ApiError> {
        self.delay().await;
        Ok(mock_routes())
    }

    async fn get_food_stops(&self) -> Result<Vec<FoodStop>, ApiError> {
        self.delay().await;
        Ok(mock_food_stops())
    }

    async fn get_pandals(&self) -> Result<Vec<Pandal>, ApiError> {
        self.delay().await;
        Ok(mock_pandals())
    }

    async fn get_districts(&self) -> Result<Vec<District>, ApiError> {
        self.delay().await;
        Ok(mock_districts())
    }
}

fn route(id: &str, title: &str, description: &str, duration: &str, stop_count: i64) -> Route {
    Route {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        duration: duration.to_string(),
        stops: Vec::new(),
        stop_count,
        created_at: Some(Utc::now()),
    }
}

fn mock_routes() -> Vec<Route> {
    vec![
        route(
            "1",
            "Lights of the City of Joy",
            "Chase the glow of Kolkata's most dazzling pandals as the city comes alive after dark.",
            "~4-5 Hours",
            20,
        ),
        route(
            "2",
            "Heritage & Grandeur Trail",
            "Walk through decades of tradition across the oldest and grandest community pujas.",
            "~3-5 Hours",
            24,
        ),
        route(
            "3",
            "The Artisan's Circuit",
            "A curated path through pandals celebrated for their themes and craftsmanship.",
            "~2-3 Hours",
            14,
        ),
    ]
}

fn food_stop(id: &str, name: &str, kind: &str, image: &str, area: &str) -> FoodStop {
    FoodStop {
        id: id.to_string(),
        name: name.to_string(),
        kind: kind.to_string(),
        image: image.to_string(),
        location: Location::default(),
        area: area.to_string(),
        district: "Kolkata".to_string(),
    }
}

fn mock_food_stops() -> Vec<FoodStop> {
    vec![
        food_stop("1", "The Gazeboo", "Restaurant", "", "Bidhannagar"),
        food_stop("2", "Mocambo Restaurant and Bar", "Restaurant", "", "Park Street"),
        food_stop(
            "3",
            "Oh! Calcutta",
            "Fine Dining",
            "https://images.unsplash.com/photo-1414235077428-338989a2e8c0?w=400&q=80",
            "Salt Lake",
        ),
    ]
}

fn mock_pandals() -> Vec<Pandal> {
    vec![
        Pandal {
            id: "1".to_string(),
            name: "Sreebhumi Sporting Club".to_string(),
            description: "Known for its extravagant themes, this year featuring a majestic palace replica."
                .to_string(),
            area: "Lake Town".to_string(),
            theme: "Vatican City".to_string(),
            location: Location::point(88.3973, 22.5976),
            images: vec!["https://example.com/sreebhumi.jpg".to_string()],
            rating_avg: 4.8,
            rating_count: 1205,
            status: PandalStatus::Approved,
            approval_count: 5,
            approved_by: vec!["admin1".to_string()],
            created_at: Some(Utc::now()),
            ..Pandal::default()
        },
        Pandal {
            id: "2".to_string(),
            name: "Suruchi Sangha".to_string(),
            description: "Award winning puja featuring traditional art forms.".to_string(),
            area: "New Alipore".to_string(),
            theme: "Bengal Traditional Art".to_string(),
            location: Location::point(88.3308, 22.5186),
            images: vec!["https://example.com/suruchi.jpg".to_string()],
            rating_avg: 4.6,
            rating_count: 890,
            status: PandalStatus::Approved,
            approval_count: 5,
            approved_by: vec!["admin1".to_string()],
            created_at: Some(Utc::now()),
            ..Pandal::default()
        },
    ]
}

fn district(id: &str, name: &str, pandal_count: i64) -> District {
    District {
        id: id.to_string(),
        name: name.to_string(),
        pandal_count,
        image: None,
    }
}

fn mock_districts() -> Vec<District> {
    vec![
        district("1", "Kolkata", 450),
        district("2", "Howrah", 120),
        district("3", "24 Parganas (N)", 300),
    ]
}
