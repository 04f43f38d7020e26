use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Location;
use crate::api::ApiError;

/// Community approval state of a submitted pandal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PandalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl PandalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PandalStatus::Pending => "pending",
            PandalStatus::Approved => "approved",
            PandalStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pandal {
    pub id: String,
    pub name: String,
    pub description: String,
    pub area: String,
    pub district: String,
    pub state: String,
    pub country: String,
    pub theme: String,
    #[serde(deserialize_with = "super::null_default")]
    pub tags: Vec<String>,
    pub location: Location,
    #[serde(deserialize_with = "super::null_default")]
    pub images: Vec<String>,
    pub rating_avg: f64,
    pub rating_count: i64,
    pub status: PandalStatus,
    pub approval_count: i64,
    #[serde(deserialize_with = "super::null_default")]
    pub approved_by: Vec<String>,
    pub created_by: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Pandal {
    pub fn is_approved(&self) -> bool {
        self.status == PandalStatus::Approved
    }

    /// Whether `user_id` has already voted for this pandal
    pub fn approved_by_user(&self, user_id: &str) -> bool {
        self.approved_by.iter().any(|u| u == user_id)
    }

    pub fn rating_display(&self) -> String {
        if self.rating_count == 0 {
            "No ratings".to_string()
        } else {
            format!("{:.1} ({})", self.rating_avg, self.rating_count)
        }
    }

    /// "Area, District" with whichever parts are known
    pub fn place_display(&self) -> String {
        [self.area.as_str(), self.district.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Body for submitting a new pandal for community approval
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePandalInput {
    pub name: String,
    pub area: String,
    pub district: String,
    pub state: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl CreatePandalInput {
    /// Trim every text field and check what the server would reject anyway.
    /// Blank optional fields are dropped rather than sent empty.
    pub fn normalized(&self) -> Result<Self, ApiError> {
        let name = self.name.trim();
        let area = self.area.trim();
        if name.is_empty() || area.is_empty() {
            return Err(ApiError::Validation(
                "Name and Area are required fields".to_string(),
            ));
        }
        if !self.location.is_valid() {
            return Err(ApiError::Validation(
                "Please enter valid numeric latitude and longitude values".to_string(),
            ));
        }

        let tags = self.tags.as_ref().map(|tags| {
            tags.iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        });
        let images = self.images.as_ref().map(|images| {
            images
                .iter()
                .map(|i| i.trim())
                .filter(|i| !i.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        });

        Ok(Self {
            name: name.to_string(),
            area: area.to_string(),
            district: self.district.trim().to_string(),
            state: self.state.trim().to_string(),
            country: self.country.trim().to_string(),
            description: trimmed(&self.description),
            theme: trimmed(&self.theme),
            tags: tags.filter(|t| !t.is_empty()),
            location: self.location.clone(),
            images: images.filter(|i| !i.is_empty()),
        })
    }
}

/// Id the server assigned to a newly submitted pandal
#[derive(Debug, Clone, Deserialize)]
pub struct InsertedPandal {
    #[serde(rename = "InsertedID")]
    pub inserted_id: String,
}

/// Lightweight view aggregated from pandal areas
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct District {
    pub id: String,
    pub name: String,
    pub pandal_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
