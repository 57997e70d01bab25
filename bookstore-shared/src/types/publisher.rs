//! Publisher entity.

use bigdecimal::{BigDecimal, ToPrimitive};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A book publisher.
///
/// `uuid` is the primary key; `id` is the sequential display counter assigned
/// on first save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Publisher {
    pub uuid: Uuid,
    pub id: i32,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state_province: String,
    pub country: String,
    pub website: String,
    pub latitude: Option<BigDecimal>,
    pub longitude: Option<BigDecimal>,
}

/// Latitude/longitude pair in the shape search engines expect for geo points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl Publisher {
    /// Geo point built from the stored coordinates, if both are present.
    pub fn location(&self) -> Option<GeoPoint> {
        let lat = self.latitude.as_ref()?.to_f64()?;
        let lon = self.longitude.as_ref()?.to_f64()?;
        Some(GeoPoint { lat, lon })
    }

    /// Apply the editable fields of `changes`, keeping identity untouched.
    pub fn apply(&mut self, changes: NewPublisher) {
        self.name = changes.name;
        self.address = changes.address;
        self.city = changes.city;
        self.state_province = changes.state_province;
        self.country = changes.country;
        self.website = changes.website;
        self.latitude = changes.latitude;
        self.longitude = changes.longitude;
    }
}

/// Input for creating or updating a publisher.
///
/// The primary key is generated when the value is constructed, so the same
/// `NewPublisher` always persists under the same `uuid`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPublisher {
    pub uuid: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state_province: String,
    pub country: String,
    pub website: String,
    pub latitude: Option<BigDecimal>,
    pub longitude: Option<BigDecimal>,
}

impl NewPublisher {
    /// Create a publisher input with coordinates defaulting to `0`.
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
        state_province: impl Into<String>,
        country: impl Into<String>,
        website: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            address: address.into(),
            city: city.into(),
            state_province: state_province.into(),
            country: country.into(),
            website: website.into(),
            latitude: Some(BigDecimal::from(0)),
            longitude: Some(BigDecimal::from(0)),
        }
    }

    /// Set the publisher coordinates.
    pub fn with_location(mut self, latitude: BigDecimal, longitude: BigDecimal) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Materialize the publisher with its assigned sequential id.
    pub fn into_publisher(self, id: i32) -> Publisher {
        Publisher {
            uuid: self.uuid,
            id,
            name: self.name,
            address: self.address,
            city: self.city,
            state_province: self.state_province,
            country: self.country,
            website: self.website,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}
