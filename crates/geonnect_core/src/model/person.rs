//! Person domain model.
//!
//! # Responsibility
//! - Define the canonical registered-person record.
//! - Validate required fields and coordinate ranges before persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another person.
//! - `coords` are finite and inside latitude/longitude bounds.
//! - A person is only constructed after geocoding succeeded, so `coords`
//!   are never placeholders.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every registered person.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type PersonId = Uuid;

/// A geographic point in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Checks both axes for finiteness and bounds.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if !self.latitude.is_finite() {
            return Err(PersonValidationError::NonFiniteCoordinate("latitude"));
        }
        if !self.longitude.is_finite() {
            return Err(PersonValidationError::NonFiniteCoordinate("longitude"));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(PersonValidationError::CoordinateOutOfRange {
                axis: "latitude",
                value: self.latitude,
            });
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(PersonValidationError::CoordinateOutOfRange {
                axis: "longitude",
                value: self.longitude,
            });
        }
        Ok(())
    }
}

/// Validation error for person records and form input.
#[derive(Debug, Clone, PartialEq)]
pub enum PersonValidationError {
    /// A required input field is missing or blank.
    EmptyField(&'static str),
    /// A coordinate axis is NaN or infinite.
    NonFiniteCoordinate(&'static str),
    /// A coordinate axis is outside its WGS84 bounds.
    CoordinateOutOfRange { axis: &'static str, value: f64 },
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "required field `{field}` is empty"),
            Self::NonFiniteCoordinate(axis) => {
                write!(f, "coordinate `{axis}` is not a finite number")
            }
            Self::CoordinateOutOfRange { axis, value } => {
                write!(f, "coordinate `{axis}` out of range: {value}")
            }
        }
    }
}

impl Error for PersonValidationError {}

/// Canonical record for one registered person.
///
/// The serialized shape (field names below) is also the persistence-mirror
/// payload format, so renames here are storage-format changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Stable ID used for edit/delete addressing across screens.
    pub id: PersonId,
    /// Display name, non-empty.
    pub name: String,
    /// Formatted street address, non-empty.
    pub address: String,
    /// Geocoded position for the map pin.
    pub coords: GeoPoint,
}

impl Person {
    /// Creates a person with a generated stable ID.
    pub fn new(name: impl Into<String>, address: impl Into<String>, coords: GeoPoint) -> Self {
        Self::with_id(Uuid::new_v4(), name, address, coords)
    }

    /// Creates a person with a caller-provided stable ID.
    ///
    /// Used by edit flows that replace a record wholesale while keeping
    /// its identity, and by the mirror when rehydrating persisted records.
    pub fn with_id(
        id: PersonId,
        name: impl Into<String>,
        address: impl Into<String>,
        coords: GeoPoint,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
            coords,
        }
    }

    /// Validates required fields and coordinate bounds.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if self.name.trim().is_empty() {
            return Err(PersonValidationError::EmptyField("name"));
        }
        if self.address.trim().is_empty() {
            return Err(PersonValidationError::EmptyField("address"));
        }
        self.coords.validate()
    }
}
