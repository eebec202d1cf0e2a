//! Geofence Monitoring & Safe-Zone Routing Engine.
//!
//! Continuously evaluates tracked positions against circular risk
//! zones and, on containment, selects the best nearby safe zone and
//! produces a turn-by-turn evacuation route.
//!
//! The externals -- zone storage, the location stream, position
//! persistence, and the routing-geometry provider -- are collaborator
//! traits; the engine owns containment evaluation, zone snapshots,
//! safe-zone selection, publish throttling, and route decoding.

pub mod types {
    pub mod coordinate;
    pub mod event;
    pub mod route;
    pub mod status;
    pub mod zone;
}

pub mod utils {
    pub mod generator;
    pub mod haversine;
    pub mod polyline;
}

pub mod error;
pub mod monitor;
pub mod planner;
pub mod publisher;
pub mod selector;
pub mod zone_index;

pub use error::{DecodeError, EngineError};
pub use monitor::{
    evaluate, transition, EntityTracker, LocationSource, PositionUpdate, TrackerConfig,
};
pub use planner::{RoutePlanner, RouteProvider};
pub use publisher::{LocationPublisher, PositionSink, PUBLISH_INTERVAL};
pub use selector::{
    GeodesicScorer, SafeZoneScorer, SafeZoneSelector, SquaredDegreeScorer,
    FALLBACK_RADIUS_METERS,
};
pub use types::coordinate::{Coordinate, TrackedPosition};
pub use types::event::{ContainmentState, TrackingEvent};
pub use types::route::{RoutePlan, RouteResponse, RouteStep};
pub use types::status::TrackingStatus;
pub use types::zone::{RiskZone, SafeZone};
pub use zone_index::{run_zone_feed, ZoneIndex, ZoneSnapshot, ZoneStore};
