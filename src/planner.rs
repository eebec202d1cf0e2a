//! Orchestrates one evacuation-route request: ask the external
//! provider for geometry and maneuvers, decode, synthesize
//! instructions.
//!
//! Route absence is a normal, recoverable outcome -- a failed request,
//! an empty route list, or malformed geometry all yield `None` and the
//! caller retries on the next containment trigger. A route is applied
//! whole or not at all.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::types::coordinate::Coordinate;
use crate::types::route::{RoutePlan, RouteResponse};
use crate::utils::polyline;

/// The external routing-geometry collaborator. A black box returning
/// encoded paths and maneuver lists; may fail or return zero routes.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn request_route(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
    ) -> Result<Vec<RouteResponse>, EngineError>;
}

/// The planning component. Cloneable so a tracker can hand an owned
/// copy to an in-flight request task.
#[derive(Clone)]
pub struct RoutePlanner {
    provider: Arc<dyn RouteProvider>,
}

impl RoutePlanner {
    pub fn new(provider: Arc<dyn RouteProvider>) -> RoutePlanner {
        RoutePlanner { provider }
    }

    /// Requests, decodes, and annotates a route from `origin` to
    /// `destination`. Returns `None` when no usable route exists.
    pub async fn plan(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
    ) -> Option<RoutePlan> {
        // Correlation id: ties provider calls, discards, and late
        // results together in the logs.
        let request_id = Uuid::new_v4();
        debug!(
            "route request {request_id}: ({}, {}) -> ({}, {})",
            origin.latitude, origin.longitude, destination.latitude, destination.longitude
        );

        let routes = match self.provider.request_route(origin, destination).await {
            Ok(routes) => routes,
            Err(err) => {
                warn!("route request {request_id} failed: {err}");
                return None;
            }
        };

        let Some(route) = routes.into_iter().next() else {
            info!("route request {request_id}: provider returned no routes");
            return None;
        };

        let geometry = match polyline::decode(&route.geometry) {
            Ok(geometry) => geometry,
            Err(err) => {
                warn!("route request {request_id}: discarding malformed geometry: {err}");
                return None;
            }
        };

        let instructions = route.steps.iter().map(polyline::step_text).collect();
        debug!("route request {request_id}: {} points", geometry.len());
        Some(RoutePlan {
            geometry,
            instructions,
        })
    }
}
