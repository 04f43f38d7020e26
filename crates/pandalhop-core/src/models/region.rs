use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminDistrict {
    pub code: String,
    pub name: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminState {
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub iso_code: String,
    pub is_active: bool,
    #[serde(deserialize_with = "super::null_default")]
    pub districts: Vec<AdminDistrict>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminCountry {
    pub code: String,
    pub name: String,
}

/// Countries, states and districts the service accepts pandal submissions for
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdministrativeData {
    pub version: String,
    pub last_updated: String,
    pub country: AdminCountry,
    #[serde(deserialize_with = "super::null_default")]
    pub states: Vec<AdminState>,
}

impl AdministrativeData {
    /// Human-readable district name, falling back to the code itself
    pub fn district_name(&self, state_code: Option<&str>, district_code: &str) -> String {
        self.states
            .iter()
            .filter(|s| state_code.map_or(true, |code| s.code == code))
            .flat_map(|s| s.districts.iter())
            .find(|d| d.code == district_code)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| district_code.to_string())
    }

    /// Whether a submission for this state/district would be accepted
    pub fn is_supported(&self, state_code: &str, district_code: &str) -> bool {
        self.states
            .iter()
            .filter(|s| s.is_active && s.code == state_code)
            .flat_map(|s| s.districts.iter())
            .any(|d| d.is_active && d.code == district_code)
    }

    pub fn active_states(&self) -> impl Iterator<Item = &AdminState> {
        self.states.iter().filter(|s| s.is_active)
    }
}
