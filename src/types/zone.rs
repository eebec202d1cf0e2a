//! Struct definitions and implementations for [`RiskZone`] and
//! [`SafeZone`].
//!
//! Both zone kinds are circles: a center plus a radius in meters.
//! A safe zone may be scoped to one risk zone through `risk_zone_id`
//! (a non-owning reference -- deleting a risk zone does not cascade
//! here) or stand alone and be matched by proximity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;
use crate::error::EngineError;

/// A circular geofenced hazard area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskZone {
    /// Typed as a [`String`] to allow for synthetic ids assigned by the
    /// external zone store.
    pub id: String,

    pub name: String,

    pub center: Coordinate,

    pub radius_meters: f64,

    /// Tri-state on the wire: the store may omit the flag entirely.
    pub active: Option<bool>,

    pub created_at: DateTime<Utc>,
}

impl RiskZone {
    /// Risk zones count as active unless the flag is explicitly
    /// `false`. This default differs from [`SafeZone::is_active`] on
    /// purpose: the two zone kinds are filtered with different
    /// predicates at their call sites and the asymmetry is preserved.
    pub fn is_active(&self) -> bool {
        self.active != Some(false)
    }

    /// Rejects zones with malformed coordinates or a non-positive
    /// radius before they reach any consumer.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.center.validate()?;
        if self.radius_meters > 0.0 {
            Ok(())
        } else {
            Err(EngineError::NonPositiveRadius(self.radius_meters))
        }
    }
}

/// A circular geofenced refuge area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
    pub id: String,

    /// The risk zone this refuge is scoped to, if any.
    pub risk_zone_id: Option<String>,

    pub center: Coordinate,

    pub radius_meters: f64,

    /// Tri-state on the wire, same as [`RiskZone::active`].
    pub active: Option<bool>,
}

impl SafeZone {
    /// Safe zones count as active only when the flag is explicitly
    /// `true`. See [`RiskZone::is_active`] for the asymmetry note.
    pub fn is_active(&self) -> bool {
        self.active == Some(true)
    }

    /// Same cleansing rule as [`RiskZone::validate`].
    pub fn validate(&self) -> Result<(), EngineError> {
        self.center.validate()?;
        if self.radius_meters > 0.0 {
            Ok(())
        } else {
            Err(EngineError::NonPositiveRadius(self.radius_meters))
        }
    }
}

#[cfg(test)]
mod zone_tests {
    use super::*;

    fn risk_zone(active: Option<bool>) -> RiskZone {
        RiskZone {
            id: "rz-1".to_string(),
            name: "Flood Basin".to_string(),
            center: Coordinate {
                latitude: 16.5062,
                longitude: 80.6480,
            },
            radius_meters: 10000.0,
            active,
            created_at: Utc::now(),
        }
    }

    fn safe_zone(active: Option<bool>) -> SafeZone {
        SafeZone {
            id: "sz-1".to_string(),
            risk_zone_id: Some("rz-1".to_string()),
            center: Coordinate {
                latitude: 16.5100,
                longitude: 80.6500,
            },
            radius_meters: 100.0,
            active,
        }
    }

    /// Risk zones default to active; safe zones require the explicit
    /// flag. Both predicates must hold exactly as-is.
    #[test]
    fn test_asymmetric_active_defaults() {
        assert!(risk_zone(None).is_active());
        assert!(risk_zone(Some(true)).is_active());
        assert!(!risk_zone(Some(false)).is_active());

        assert!(!safe_zone(None).is_active());
        assert!(safe_zone(Some(true)).is_active());
        assert!(!safe_zone(Some(false)).is_active());
    }

    #[test]
    fn test_non_positive_radius_rejected() {
        let mut zone = risk_zone(Some(true));
        zone.radius_meters = 0.0;
        assert!(zone.validate().is_err());
        zone.radius_meters = -250.0;
        assert!(zone.validate().is_err());
        zone.radius_meters = 1.0;
        assert!(zone.validate().is_ok());
    }
}
