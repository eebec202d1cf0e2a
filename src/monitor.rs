//! Containment monitoring: pure state evaluation plus the per-entity
//! tracker task.
//!
//! Each tracked entity gets its own [`EntityTracker`] task owning its
//! containment state, publish window, and pending route request, fed
//! by a message queue of position updates. Entities share nothing but
//! the read-only zone snapshot, so they can be processed in parallel
//! while events for one entity stay in arrival order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use log::{debug, info, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::error::EngineError;
use crate::planner::{RoutePlanner, RouteProvider};
use crate::publisher::{LocationPublisher, PositionSink, PUBLISH_INTERVAL};
use crate::selector::SafeZoneSelector;
use crate::types::coordinate::{Coordinate, TrackedPosition};
use crate::types::event::{ContainmentState, TrackingEvent};
use crate::types::route::RoutePlan;
use crate::types::zone::RiskZone;
use crate::zone_index::{ZoneIndex, ZoneSnapshot};

/// One message from the location source.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionUpdate {
    Reading(TrackedPosition),

    /// Location access was revoked. Terminal for this entity.
    PermissionDenied,
}

/// The external location-stream collaborator.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn subscribe(&self) -> Result<mpsc::Receiver<PositionUpdate>, EngineError>;
}

/// Evaluates containment of a position against one zone snapshot.
///
/// The first active risk zone in snapshot order that contains the
/// point wins and evaluation stops there -- no distance-based
/// prioritization. With a fixed snapshot order the result is fully
/// deterministic.
pub fn evaluate(position: &Coordinate, snapshot: &ZoneSnapshot) -> ContainmentState {
    for zone in &snapshot.risk_zones {
        if crate::utils::haversine::is_inside(position, &zone.center, zone.radius_meters) {
            return ContainmentState::Inside(zone.clone());
        }
    }
    ContainmentState::Outside
}

/// Derives the transition event between two evaluation passes, if any.
pub fn transition(
    previous: &ContainmentState,
    next: &ContainmentState,
) -> Option<TrackingEvent> {
    match (previous, next) {
        (ContainmentState::Outside, ContainmentState::Inside(zone)) => {
            Some(TrackingEvent::EnteredRisk(zone.clone()))
        }
        (ContainmentState::Inside(_), ContainmentState::Outside) => {
            Some(TrackingEvent::ExitedRisk)
        }
        (ContainmentState::Inside(a), ContainmentState::Inside(b)) if a.id != b.id => {
            Some(TrackingEvent::ChangedRiskZone(b.clone()))
        }
        _ => None,
    }
}

/// Tunables for one tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Minimum interval between external position writes.
    pub publish_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            publish_interval: PUBLISH_INTERVAL,
        }
    }
}

type RouteFuture = BoxFuture<'static, Option<RoutePlan>>;

/// Per-entity monitoring actor.
///
/// Drives the containment state machine over a stream of position
/// updates, throttles external publishing, and orchestrates route
/// planning on risk entry. An in-flight route request is cancelled by
/// dropping its future whenever it is superseded or the entity leaves
/// the risk zone, so a late result can never be applied to state.
pub struct EntityTracker {
    entity_id: String,
    state: ContainmentState,
    last_position: Option<TrackedPosition>,
    publisher: LocationPublisher,
    selector: SafeZoneSelector,
    planner: RoutePlanner,
    zones: watch::Receiver<Arc<ZoneSnapshot>>,
    events: mpsc::Sender<TrackingEvent>,
}

impl EntityTracker {
    pub fn new(
        entity_id: impl Into<String>,
        index: &ZoneIndex,
        sink: Arc<dyn PositionSink>,
        provider: Arc<dyn RouteProvider>,
        events: mpsc::Sender<TrackingEvent>,
        config: TrackerConfig,
    ) -> EntityTracker {
        let entity_id = entity_id.into();
        EntityTracker {
            publisher: LocationPublisher::with_interval(
                entity_id.clone(),
                sink,
                config.publish_interval,
            ),
            entity_id,
            state: ContainmentState::Outside,
            last_position: None,
            selector: SafeZoneSelector::new(),
            planner: RoutePlanner::new(provider),
            zones: index.subscribe(),
            events,
        }
    }

    /// Replaces the default squared-degree selector.
    pub fn with_selector(mut self, selector: SafeZoneSelector) -> EntityTracker {
        self.selector = selector;
        self
    }

    /// Runs the tracker on its own task.
    pub fn spawn(self, updates: mpsc::Receiver<PositionUpdate>) -> JoinHandle<()> {
        tokio::spawn(self.run(updates))
    }

    /// Subscribes to the source and runs the tracker on its own task.
    pub async fn spawn_from_source(
        self,
        source: &dyn LocationSource,
    ) -> Result<JoinHandle<()>, EngineError> {
        let updates = source.subscribe().await?;
        Ok(self.spawn(updates))
    }

    /// The tracker loop. Consumes updates in arrival order; resolves
    /// at most one route request at a time.
    pub async fn run(mut self, mut updates: mpsc::Receiver<PositionUpdate>) {
        let mut pending: Option<RouteFuture> = None;
        let mut source_open = true;

        // Keep going until the stream is gone AND no route request is
        // left in flight; an already-started request may still finish
        // after an upstream disconnect.
        while source_open || pending.is_some() {
            tokio::select! {
                update = updates.recv(), if source_open => match update {
                    Some(PositionUpdate::Reading(reading)) => {
                        self.on_reading(reading, &mut pending).await;
                    }
                    Some(PositionUpdate::PermissionDenied) => {
                        warn!("{}: location access revoked; stopping", self.entity_id);
                        if let Some(last) = self.last_position.clone() {
                            self.publisher.mark_stopped(&last).await;
                        }
                        let _ = self.events.send(TrackingEvent::TrackingStopped).await;
                        break;
                    }
                    None => {
                        // Upstream disconnect: freeze at the last known
                        // state so a reconnect can pick up transparently.
                        info!("{}: location stream closed", self.entity_id);
                        source_open = false;
                    }
                },
                plan = poll_route(&mut pending), if pending.is_some() => {
                    pending = None;
                    let event = match plan {
                        Some(plan) => TrackingEvent::RouteReady(plan),
                        None => TrackingEvent::RouteUnavailable,
                    };
                    let _ = self.events.send(event).await;
                }
            }
        }
    }

    async fn on_reading(&mut self, reading: TrackedPosition, pending: &mut Option<RouteFuture>) {
        if let Err(err) = reading.coordinate.validate() {
            // Prior state retained; the reading never reaches the
            // publisher or the state machine.
            warn!("{}: rejecting reading: {err}", self.entity_id);
            return;
        }

        self.publisher.offer(&reading).await;

        // One consistent snapshot per evaluation pass. Later refreshes
        // cannot alter the transition derived here.
        let snapshot = self.zones.borrow().clone();
        let next = evaluate(&reading.coordinate, &snapshot);
        let event = transition(&self.state, &next);
        self.state = next;
        self.last_position = Some(reading.clone());

        let Some(event) = event else {
            return;
        };

        match event {
            TrackingEvent::EnteredRisk(ref zone) | TrackingEvent::ChangedRiskZone(ref zone) => {
                if pending.is_some() {
                    debug!("{}: superseding in-flight route request", self.entity_id);
                }
                *pending = self.start_route_request(&reading, zone, &snapshot);
            }
            TrackingEvent::ExitedRisk => {
                if pending.take().is_some() {
                    debug!("{}: abandoning in-flight route request", self.entity_id);
                }
            }
            _ => {}
        }

        let no_target = matches!(
            event,
            TrackingEvent::EnteredRisk(_) | TrackingEvent::ChangedRiskZone(_)
        ) && pending.is_none();

        let _ = self.events.send(event).await;
        if no_target {
            let _ = self.events.send(TrackingEvent::RouteUnavailable).await;
        }
    }

    /// Selects a safe zone and kicks off a route request owning all of
    /// its data, so the tracker keeps processing while it runs.
    fn start_route_request(
        &self,
        reading: &TrackedPosition,
        zone: &RiskZone,
        snapshot: &ZoneSnapshot,
    ) -> Option<RouteFuture> {
        let safe = self
            .selector
            .select(&reading.coordinate, Some(zone), snapshot)?;
        info!(
            "{}: inside {}, routing to safe zone {}",
            self.entity_id, zone.id, safe.id
        );

        let planner = self.planner.clone();
        let origin = reading.coordinate;
        let destination = safe.center;
        Some(Box::pin(async move {
            planner.plan(&origin, &destination).await
        }))
    }
}

/// Awaits the pending route request; parks forever when there is none
/// (the `select!` guard keeps this branch disabled in that case).
async fn poll_route(pending: &mut Option<RouteFuture>) -> Option<RoutePlan> {
    match pending {
        Some(request) => request.as_mut().await,
        None => futures::future::pending().await,
    }
}
