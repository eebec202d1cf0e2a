//! Struct definitions and implementations for [`Coordinate`] and
//! [`TrackedPosition`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A geographic position in degrees, WGS84.
///
/// Float values give well beyond 5-decimal precision (0.00001), which
/// narrows the error margin to about a meter -- the same resolution the
/// polyline wire format carries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Builds a validated coordinate.
    ///
    /// # Errors
    /// [`EngineError::InvalidCoordinate`] when either component is
    /// non-finite or outside the WGS84 domain.
    pub fn new(latitude: f64, longitude: f64) -> Result<Coordinate, EngineError> {
        let coordinate = Coordinate {
            latitude,
            longitude,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Checks that the coordinate lies in the WGS84 domain:
    /// latitude in [-90, 90], longitude in [-180, 180], both finite.
    ///
    /// Collaborator payloads are deserialized before validation, so a
    /// literally-constructed or decoded value must be checked again at
    /// every ingestion point.
    pub fn validate(&self) -> Result<(), EngineError> {
        let valid = self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude);
        if valid {
            Ok(())
        } else {
            Err(EngineError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

/// A single reading from the location source.
///
/// Ephemeral: each reading supersedes the previous one and the core
/// retains no history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedPosition {
    pub coordinate: Coordinate,
    pub captured_at: DateTime<Utc>,
}

impl TrackedPosition {
    /// A reading captured right now.
    pub fn now(coordinate: Coordinate) -> TrackedPosition {
        TrackedPosition {
            coordinate,
            captured_at: Utc::now(),
        }
    }
}
