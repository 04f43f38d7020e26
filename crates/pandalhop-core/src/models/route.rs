use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Pandal;

/// A curated pandal-hopping itinerary. `stops` holds pandal ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration: String,
    #[serde(deserialize_with = "super::null_default")]
    pub stops: Vec<String>,
    pub stop_count: i64,
    pub created_at: Option<DateTime<Utc>>,
}

/// Route detail with each stop expanded to its pandal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouteWithStops {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration: String,
    #[serde(deserialize_with = "super::null_default")]
    pub stops: Vec<Pandal>,
    pub stop_count: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl Route {
    pub fn stops_display(&self) -> String {
        match self.stop_count {
            1 => "1 stop".to_string(),
            n => format!("{} stops", n),
        }
    }
}
