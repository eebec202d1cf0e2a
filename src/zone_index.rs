//! In-memory mirror of the active risk and safe zones.
//!
//! The external zone store delivers *full snapshots*, not diffs: every
//! notification carries the complete current collection. The index
//! models that as an atomically swapped, immutable [`ZoneSnapshot`]
//! behind a watch channel. Consumers clone the `Arc` once per
//! evaluation pass and therefore always see one consistent, unchanging
//! view -- a later refresh never alters an evaluation already made.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::sync::watch;

use crate::error::EngineError;
use crate::types::zone::{RiskZone, SafeZone};

/// One immutable view of the zone collections.
///
/// Risk-zone iteration order is the ingestion order of the snapshot
/// vector; containment evaluation depends on it for determinism.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ZoneSnapshot {
    pub risk_zones: Vec<RiskZone>,
    pub safe_zones: Vec<SafeZone>,
}

/// The shared zone mirror. Writes happen only through the `apply_*`
/// methods; readers get [`Arc`] snapshots and cannot mutate anything.
#[derive(Debug)]
pub struct ZoneIndex {
    tx: watch::Sender<Arc<ZoneSnapshot>>,
}

impl Default for ZoneIndex {
    fn default() -> Self {
        ZoneIndex::new()
    }
}

impl ZoneIndex {
    /// Creates an index with empty collections.
    pub fn new() -> ZoneIndex {
        let (tx, _) = watch::channel(Arc::new(ZoneSnapshot::default()));
        ZoneIndex { tx }
    }

    /// The current snapshot. Cheap: clones an `Arc`.
    pub fn snapshot(&self) -> Arc<ZoneSnapshot> {
        self.tx.borrow().clone()
    }

    /// A receiver that observes every snapshot swap. Trackers hold one
    /// of these so they can read without going through the index.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ZoneSnapshot>> {
        self.tx.subscribe()
    }

    /// Replaces the risk-zone collection with a fresh store snapshot.
    ///
    /// Zones are filtered at ingestion: inactive ones (risk zones are
    /// active unless explicitly flagged `false`) and zones that fail
    /// validation are dropped before any consumer can see them.
    pub fn apply_risk_zones(&self, zones: Vec<RiskZone>) {
        let total = zones.len();
        let kept: Vec<RiskZone> = zones
            .into_iter()
            .filter(|zone| {
                if !zone.is_active() {
                    return false;
                }
                match zone.validate() {
                    Ok(()) => true,
                    Err(err) => {
                        warn!("dropping malformed risk zone {}: {err}", zone.id);
                        false
                    }
                }
            })
            .collect();

        debug!("risk zone snapshot: kept {}/{total}", kept.len());
        self.swap(move |previous| ZoneSnapshot {
            risk_zones: kept,
            safe_zones: previous.safe_zones.clone(),
        });
    }

    /// Replaces the safe-zone collection with a fresh store snapshot.
    ///
    /// Safe zones require an explicit `active == true`; see
    /// [`SafeZone::is_active`] for why the predicate differs from the
    /// risk-zone one.
    pub fn apply_safe_zones(&self, zones: Vec<SafeZone>) {
        let total = zones.len();
        let kept: Vec<SafeZone> = zones
            .into_iter()
            .filter(|zone| {
                if !zone.is_active() {
                    return false;
                }
                match zone.validate() {
                    Ok(()) => true,
                    Err(err) => {
                        warn!("dropping malformed safe zone {}: {err}", zone.id);
                        false
                    }
                }
            })
            .collect();

        debug!("safe zone snapshot: kept {}/{total}", kept.len());
        self.swap(move |previous| ZoneSnapshot {
            risk_zones: previous.risk_zones.clone(),
            safe_zones: kept,
        });
    }

    /// Atomic whole-snapshot replacement. Receivers never observe a
    /// half-applied update.
    fn swap(&self, build: impl FnOnce(&ZoneSnapshot) -> ZoneSnapshot) {
        self.tx.send_modify(|current| {
            let next = build(current.as_ref());
            *current = Arc::new(next);
        });
    }
}

/// The external zone-storage collaborator.
///
/// The core never writes zones; create/toggle/delete belong to the
/// excluded admin surface. Each received item is the complete current
/// collection for that zone kind.
#[async_trait]
pub trait ZoneStore: Send + Sync {
    async fn subscribe_risk_zones(
        &self,
    ) -> Result<tokio::sync::mpsc::Receiver<Vec<RiskZone>>, EngineError>;

    async fn subscribe_safe_zones(
        &self,
    ) -> Result<tokio::sync::mpsc::Receiver<Vec<SafeZone>>, EngineError>;
}

/// Forwards store notifications into the index until both streams end.
///
/// Fire-and-forget: run this on its own task. A closed stream is an
/// upstream disconnect -- the index freezes at its last snapshot and
/// consumers keep working from it.
pub async fn run_zone_feed(store: &dyn ZoneStore, index: &ZoneIndex) -> Result<(), EngineError> {
    let mut risk_rx = store.subscribe_risk_zones().await?;
    let mut safe_rx = store.subscribe_safe_zones().await?;

    let mut risk_open = true;
    let mut safe_open = true;
    while risk_open || safe_open {
        tokio::select! {
            update = risk_rx.recv(), if risk_open => match update {
                Some(zones) => index.apply_risk_zones(zones),
                None => risk_open = false,
            },
            update = safe_rx.recv(), if safe_open => match update {
                Some(zones) => index.apply_safe_zones(zones),
                None => safe_open = false,
            },
        }
    }

    warn!("zone store disconnected; keeping last snapshot");
    Err(EngineError::UpstreamUnavailable(
        "zone store stream ended".to_string(),
    ))
}

#[cfg(test)]
mod zone_index_tests {
    use super::*;
    use crate::types::coordinate::Coordinate;
    use chrono::Utc;

    fn risk_zone(id: &str, active: Option<bool>) -> RiskZone {
        RiskZone {
            id: id.to_string(),
            name: format!("zone {id}"),
            center: Coordinate {
                latitude: 16.5062,
                longitude: 80.6480,
            },
            radius_meters: 10_000.0,
            active,
            created_at: Utc::now(),
        }
    }

    fn safe_zone(id: &str, active: Option<bool>) -> SafeZone {
        SafeZone {
            id: id.to_string(),
            risk_zone_id: None,
            center: Coordinate {
                latitude: 16.5100,
                longitude: 80.6500,
            },
            radius_meters: 100.0,
            active,
        }
    }

    #[test]
    fn test_risk_zones_default_to_active() {
        let index = ZoneIndex::new();
        index.apply_risk_zones(vec![
            risk_zone("implicit", None),
            risk_zone("explicit", Some(true)),
            risk_zone("disabled", Some(false)),
        ]);

        let snapshot = index.snapshot();
        let ids: Vec<&str> = snapshot.risk_zones.iter().map(|z| z.id.as_str()).collect();
        assert_eq!(ids, vec!["implicit", "explicit"]);
    }

    #[test]
    fn test_safe_zones_require_explicit_active() {
        let index = ZoneIndex::new();
        index.apply_safe_zones(vec![
            safe_zone("implicit", None),
            safe_zone("explicit", Some(true)),
            safe_zone("disabled", Some(false)),
        ]);

        let snapshot = index.snapshot();
        let ids: Vec<&str> = snapshot.safe_zones.iter().map(|z| z.id.as_str()).collect();
        assert_eq!(ids, vec!["explicit"]);
    }

    #[test]
    fn test_malformed_zones_are_cleansed() {
        let index = ZoneIndex::new();

        let mut bad_radius = risk_zone("bad-radius", Some(true));
        bad_radius.radius_meters = 0.0;
        let mut bad_coords = risk_zone("bad-coords", Some(true));
        bad_coords.center.latitude = 123.0;

        index.apply_risk_zones(vec![bad_radius, risk_zone("good", None), bad_coords]);

        let snapshot = index.snapshot();
        assert_eq!(snapshot.risk_zones.len(), 1);
        assert_eq!(snapshot.risk_zones[0].id, "good");
    }

    /// Each notification replaces the whole collection: zones absent
    /// from the newest snapshot are gone, and an already-taken
    /// snapshot is not affected by the swap.
    #[test]
    fn test_snapshot_replace_is_wholesale_and_immutable() {
        let index = ZoneIndex::new();
        index.apply_risk_zones(vec![risk_zone("first", None)]);

        let before = index.snapshot();
        index.apply_risk_zones(vec![risk_zone("second", None)]);

        assert_eq!(before.risk_zones[0].id, "first");
        let after = index.snapshot();
        assert_eq!(after.risk_zones.len(), 1);
        assert_eq!(after.risk_zones[0].id, "second");
    }

    #[test]
    fn test_applying_one_kind_keeps_the_other() {
        let index = ZoneIndex::new();
        index.apply_risk_zones(vec![risk_zone("rz", None)]);
        index.apply_safe_zones(vec![safe_zone("sz", Some(true))]);

        let snapshot = index.snapshot();
        assert_eq!(snapshot.risk_zones.len(), 1);
        assert_eq!(snapshot.safe_zones.len(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_observe_swaps() {
        let index = ZoneIndex::new();
        let mut rx = index.subscribe();

        index.apply_risk_zones(vec![risk_zone("rz", None)]);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().risk_zones.len(), 1);
    }
}
