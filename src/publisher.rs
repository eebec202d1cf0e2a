//! Throttled persistence of the tracked position.
//!
//! Every reading is used locally by the monitor; only the external
//! write is throttled. The throttle is a hard minimum interval, not a
//! periodic timer: the first reading after the window elapses
//! publishes immediately and the window restarts from that publish.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::time::Instant;

use crate::error::EngineError;
use crate::types::coordinate::TrackedPosition;
use crate::types::status::TrackingStatus;

/// Default minimum interval between external writes per entity.
pub const PUBLISH_INTERVAL: Duration = Duration::from_secs(15);

/// The external position-persistence collaborator.
#[async_trait]
pub trait PositionSink: Send + Sync {
    async fn upsert(
        &self,
        entity_id: &str,
        position: &TrackedPosition,
        status: TrackingStatus,
    ) -> Result<(), EngineError>;
}

/// Per-entity publish throttle. Owns its own window state, so there is
/// no shared last-publish bookkeeping between entities.
pub struct LocationPublisher {
    entity_id: String,
    sink: Arc<dyn PositionSink>,
    interval: Duration,
    last_publish: Option<Instant>,
}

impl LocationPublisher {
    /// A publisher with the default 15 s window.
    pub fn new(entity_id: impl Into<String>, sink: Arc<dyn PositionSink>) -> LocationPublisher {
        LocationPublisher::with_interval(entity_id, sink, PUBLISH_INTERVAL)
    }

    pub fn with_interval(
        entity_id: impl Into<String>,
        sink: Arc<dyn PositionSink>,
        interval: Duration,
    ) -> LocationPublisher {
        LocationPublisher {
            entity_id: entity_id.into(),
            sink,
            interval,
            last_publish: None,
        }
    }

    /// Offers a reading for external persistence.
    ///
    /// Publishes when no publish has happened yet or the window has
    /// elapsed; otherwise the reading is skipped externally. A sink
    /// failure does not consume the window, so the next reading may
    /// retry immediately. Returns whether a write went out.
    pub async fn offer(&mut self, position: &TrackedPosition) -> bool {
        let now = Instant::now();
        let due = match self.last_publish {
            None => true,
            Some(at) => now.duration_since(at) >= self.interval,
        };
        if !due {
            return false;
        }

        match self
            .sink
            .upsert(&self.entity_id, position, TrackingStatus::Active)
            .await
        {
            Ok(()) => {
                debug!("published position for {}", self.entity_id);
                self.last_publish = Some(now);
                true
            }
            Err(err) => {
                warn!("position upsert failed for {}: {err}", self.entity_id);
                false
            }
        }
    }

    /// Best-effort final upsert marking the track as stopped. Bypasses
    /// the window: the status change must not wait out a throttle.
    pub async fn mark_stopped(&mut self, position: &TrackedPosition) {
        match self
            .sink
            .upsert(&self.entity_id, position, TrackingStatus::Stopped)
            .await
        {
            Ok(()) => self.last_publish = Some(Instant::now()),
            Err(err) => {
                warn!("stop marker upsert failed for {}: {err}", self.entity_id);
            }
        }
    }
}
