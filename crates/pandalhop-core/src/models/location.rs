use serde::{Deserialize, Serialize};

/// GeoJSON geometry type for a single point
const POINT: &str = "Point";

/// GeoJSON point. Coordinates are `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl Location {
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: POINT.to_string(),
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    /// Finite coordinates within longitude ±180 and latitude ±90
    pub fn is_valid(&self) -> bool {
        let (lng, lat) = (self.longitude(), self.latitude());
        self.kind == POINT
            && lng.is_finite()
            && lat.is_finite()
            && (-180.0..=180.0).contains(&lng)
            && (-90.0..=90.0).contains(&lat)
    }

    /// Placeholder `[0, 0]` points carry no position
    pub fn is_unset(&self) -> bool {
        self.coordinates == [0.0, 0.0]
    }

    /// Display as "lat, lng" the way map apps expect
    pub fn display(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude(), self.longitude())
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::point(0.0, 0.0)
    }
}
