//! Address records and request bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Assigned by the store.
    pub id: i64,
    /// Owning client.
    pub client_id: i64,
    /// Short label, e.g. "Warehouse".
    pub title: String,
    /// City name.
    pub city: String,
    /// Street and number.
    pub street: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Postal code.
    pub zip: Option<String>,
    /// Latitude in degrees.
    pub lat: Option<f64>,
    /// Longitude in degrees.
    pub long: Option<f64>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last changed.
    pub updated_at: DateTime<Utc>,
}

/// Every field of an address the caller controls.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct AddressDraft {
    pub client_id: i64,
    pub title: String,
    pub city: String,
    pub street: Option<String>,
    pub phone: Option<String>,
    pub zip: Option<String>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
}

/// Criteria for listing addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressFilter {
    /// Only addresses owned by this client.
    pub client_id: i64,
}

/// Body of `POST /addresses`.
///
/// Missing required fields decode to empty values so they are reported as
/// validation failures rather than decode failures.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateAddress {
    #[serde(default)]
    pub client_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub city: String,
    pub street: Option<String>,
    pub phone: Option<String>,
    pub zip: Option<String>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
}

impl From<CreateAddress> for AddressDraft {
    fn from(input: CreateAddress) -> Self {
        Self {
            client_id: input.client_id,
            title: input.title,
            city: input.city,
            street: input.street,
            phone: input.phone,
            zip: input.zip,
            lat: input.lat,
            long: input.long,
        }
    }
}

/// Body of `PUT /addresses/{id}`. Absent fields keep their stored value.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdateAddress {
    pub title: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub phone: Option<String>,
    pub zip: Option<String>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
}

impl UpdateAddress {
    /// Overlays the present fields onto `existing`.
    #[must_use]
    pub fn merge_into(self, existing: &Address) -> AddressDraft {
        AddressDraft {
            client_id: existing.client_id,
            title: self.title.unwrap_or_else(|| existing.title.clone()),
            city: self.city.unwrap_or_else(|| existing.city.clone()),
            street: self.street.or_else(|| existing.street.clone()),
            phone: self.phone.or_else(|| existing.phone.clone()),
            zip: self.zip.or_else(|| existing.zip.clone()),
            lat: self.lat.or(existing.lat),
            long: self.long.or(existing.long),
        }
    }
}
