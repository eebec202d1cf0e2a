//! Definitions for [`ContainmentState`] and the [`TrackingEvent`]s a
//! tracker emits.

use super::route::RoutePlan;
use super::zone::RiskZone;

/// Whether the tracked entity currently sits inside a risk zone.
///
/// Derived state: recomputed on every position reading against the
/// zone snapshot current at evaluation time, never persisted by the
/// core.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainmentState {
    Outside,
    Inside(RiskZone),
}

impl ContainmentState {
    pub fn is_inside(&self) -> bool {
        matches!(self, ContainmentState::Inside(_))
    }

    /// The matched risk zone, when inside one.
    pub fn zone(&self) -> Option<&RiskZone> {
        match self {
            ContainmentState::Inside(zone) => Some(zone),
            ContainmentState::Outside => None,
        }
    }
}

/// Events emitted by an entity tracker, in processing order.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingEvent {
    /// `Outside -> Inside(zone)`.
    EnteredRisk(RiskZone),

    /// `Inside -> Outside`.
    ExitedRisk,

    /// `Inside(a) -> Inside(b)` in a single evaluation pass: the
    /// previous zone no longer contains the point but another does.
    ChangedRiskZone(RiskZone),

    /// An evacuation route to the selected safe zone is ready.
    RouteReady(RoutePlan),

    /// No route could be produced for the current containment: no safe
    /// zone candidate, a provider failure, or malformed geometry.
    /// Recoverable; re-attempted on the next trigger.
    RouteUnavailable,

    /// Location access was revoked; tracking for this entity is over
    /// and its last known state is kept. A plain stream disconnect
    /// does not emit this -- tracking may resume on reconnect.
    TrackingStopped,
}
