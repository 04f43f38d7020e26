use serde::{Deserialize, Serialize};

use super::Location;

/// A restaurant or food stall near the pandal trails
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodStop {
    pub id: String,
    pub name: String,
    /// "Restaurant", "Fine Dining", "Street Food"
    #[serde(rename = "type")]
    pub kind: String,
    pub image: String,
    pub location: Location,
    pub area: String,
    pub district: String,
}

impl FoodStop {
    pub fn place_display(&self) -> String {
        match (self.area.is_empty(), self.district.is_empty()) {
            (false, false) => format!("{}, {}", self.area, self.district),
            (false, true) => self.area.clone(),
            (true, false) => self.district.clone(),
            (true, true) => "Unknown".to_string(),
        }
    }
}
