//! Data models for pandal-hopping entities.
//!
//! This module contains the data-transfer types exchanged with the API:
//!
//! - `Pandal`, `CreatePandalInput`, `District`: community-submitted pandals
//! - `FoodStop`: restaurants and stalls near the pandal trails
//! - `Route`, `RouteWithStops`: curated itineraries
//! - `AdministrativeData`: supported country/state/district codes
//!
//! All of them share the GeoJSON `Location` point type.

pub mod food;
pub mod location;
pub mod pandal;
pub mod region;
pub mod route;

pub use food::FoodStop;
pub use location::Location;
pub use pandal::{CreatePandalInput, District, InsertedPandal, Pandal, PandalStatus};
pub use region::{AdminCountry, AdminDistrict, AdminState, AdministrativeData};
pub use route::{Route, RouteWithStops};

use serde::{Deserialize, Deserializer};

/// Resource payloads arrive wrapped as `{ "data": ... }`
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

/// The Go backend encodes nil slices as `null`; read that as the default
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
