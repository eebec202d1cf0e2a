//! Definitions for the routing-provider wire types and the derived
//! [`RoutePlan`].

use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;

/// One maneuver of a returned route, as the provider describes it.
///
/// The maneuver kind is a free-form string on the wire (`"depart"`,
/// `"turn"`, `"arrive"`, ...); instruction synthesis is total over it,
/// so an unknown kind still produces text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub distance_meters: f64,

    /// Maneuver kind, e.g. `"turn"`.
    pub maneuver: String,

    /// Direction qualifier for turns, e.g. `"left"`.
    pub modifier: Option<String>,
}

/// A single route alternative returned by the provider: compact
/// encoded geometry plus the maneuver list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    /// Polyline-encoded path, 1e5 precision.
    pub geometry: String,

    pub steps: Vec<RouteStep>,
}

/// The decoded, presentation-ready evacuation route.
///
/// A derived artifact: recomputed per navigation trigger and discarded
/// once consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub geometry: Vec<Coordinate>,
    pub instructions: Vec<String>,
}
