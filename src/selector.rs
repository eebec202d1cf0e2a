//! Picks the best safe zone for a containment event.
//!
//! Candidate set: safe zones scoped to the matched risk zone, union
//! safe zones within a fixed proximity of the current position. The
//! ranking strategy is pluggable; the default reproduces the source
//! system's squared-degree proxy exactly.

use log::debug;
use ordered_float::OrderedFloat;

use crate::types::coordinate::Coordinate;
use crate::types::zone::{RiskZone, SafeZone};
use crate::utils::haversine;
use crate::zone_index::ZoneSnapshot;

/// Standalone safe zones this close (geodesic meters) to the current
/// position are candidates even without a parent match.
pub const FALLBACK_RADIUS_METERS: f64 = 5_000.0;

/// Ranking strategy for safe-zone candidates. Lower is better; `None`
/// means the strategy cannot rank this candidate.
pub trait SafeZoneScorer: Send + Sync {
    fn score(&self, position: &Coordinate, zone: &SafeZone) -> Option<f64>;
}

/// Squared planar difference in degrees:
/// `(lat_u - lat_z)^2 + (lng_u - lng_z)^2`.
///
/// Not a geodesic distance -- a deliberately cheap monotonic proxy for
/// nearest-neighbor ranking over short ranges, kept for parity with
/// the source system. Swap in [`GeodesicScorer`] for the corrected
/// ranking; the selection fallback contract is unaffected.
#[derive(Debug, Default, Clone, Copy)]
pub struct SquaredDegreeScorer;

impl SafeZoneScorer for SquaredDegreeScorer {
    fn score(&self, position: &Coordinate, zone: &SafeZone) -> Option<f64> {
        let d_lat = position.latitude - zone.center.latitude;
        let d_lng = position.longitude - zone.center.longitude;
        let score = d_lat * d_lat + d_lng * d_lng;
        score.is_finite().then_some(score)
    }
}

/// True great-circle distance ranking.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeodesicScorer;

impl SafeZoneScorer for GeodesicScorer {
    fn score(&self, position: &Coordinate, zone: &SafeZone) -> Option<f64> {
        let score = haversine::distance_meters(position, &zone.center);
        score.is_finite().then_some(score)
    }
}

/// The selection component. Owns its scorer so trackers can carry it
/// across await points.
pub struct SafeZoneSelector {
    scorer: Box<dyn SafeZoneScorer>,
}

impl Default for SafeZoneSelector {
    fn default() -> Self {
        SafeZoneSelector::new()
    }
}

impl SafeZoneSelector {
    /// A selector with the parity [`SquaredDegreeScorer`].
    pub fn new() -> SafeZoneSelector {
        SafeZoneSelector {
            scorer: Box::new(SquaredDegreeScorer),
        }
    }

    /// A selector with a custom ranking strategy.
    pub fn with_scorer(scorer: impl SafeZoneScorer + 'static) -> SafeZoneSelector {
        SafeZoneSelector {
            scorer: Box::new(scorer),
        }
    }

    /// Picks the best candidate for the current position.
    ///
    /// Selection rules:
    /// * minimum score wins, ties broken by first-seen order;
    /// * if the scorer ranks no candidate but candidates exist, fall
    ///   back to geodesic nearest over the same set;
    /// * empty candidate set returns `None`.
    pub fn select<'a>(
        &self,
        position: &Coordinate,
        matched: Option<&RiskZone>,
        snapshot: &'a ZoneSnapshot,
    ) -> Option<&'a SafeZone> {
        let candidates: Vec<&SafeZone> = snapshot
            .safe_zones
            .iter()
            .filter(|zone| {
                let parent_match = match (matched, &zone.risk_zone_id) {
                    (Some(risk), Some(parent)) => *parent == risk.id,
                    _ => false,
                };
                parent_match
                    || haversine::distance_meters(position, &zone.center)
                        <= FALLBACK_RADIUS_METERS
            })
            .collect();

        if candidates.is_empty() {
            debug!("no safe zone candidates at ({:?})", position);
            return None;
        }

        let mut best: Option<&SafeZone> = None;
        let mut best_score = OrderedFloat(f64::INFINITY);
        for &zone in &candidates {
            if let Some(score) = self.scorer.score(position, zone) {
                // Strictly-smaller keeps the first-seen candidate on ties.
                if OrderedFloat(score) < best_score {
                    best_score = OrderedFloat(score);
                    best = Some(zone);
                }
            }
        }

        if best.is_none() {
            debug!("scorer ranked no candidate; falling back to geodesic nearest");
            let mut best_distance = OrderedFloat(f64::INFINITY);
            for &zone in &candidates {
                let distance =
                    OrderedFloat(haversine::distance_meters(position, &zone.center));
                if distance < best_distance {
                    best_distance = distance;
                    best = Some(zone);
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod selector_tests {
    use super::*;

    fn position() -> Coordinate {
        Coordinate {
            latitude: 16.5062,
            longitude: 80.6480,
        }
    }

    fn risk_zone() -> RiskZone {
        RiskZone {
            id: "rz-1".to_string(),
            name: "Flood Basin".to_string(),
            center: position(),
            radius_meters: 10_000.0,
            active: Some(true),
            created_at: chrono::Utc::now(),
        }
    }

    fn safe_zone(id: &str, parent: Option<&str>, latitude: f64, longitude: f64) -> SafeZone {
        SafeZone {
            id: id.to_string(),
            risk_zone_id: parent.map(str::to_string),
            center: Coordinate {
                latitude,
                longitude,
            },
            radius_meters: 100.0,
            active: Some(true),
        }
    }

    fn snapshot(safe_zones: Vec<SafeZone>) -> ZoneSnapshot {
        ZoneSnapshot {
            risk_zones: vec![risk_zone()],
            safe_zones,
        }
    }

    #[test]
    fn test_empty_candidate_set_returns_none() {
        let selector = SafeZoneSelector::new();
        let snapshot = snapshot(vec![]);
        assert!(selector
            .select(&position(), Some(&risk_zone()), &snapshot)
            .is_none());
    }

    /// A single parent-scoped candidate wins regardless of how far
    /// away it is.
    #[test]
    fn test_single_candidate_wins_at_any_distance() {
        let selector = SafeZoneSelector::new();
        // ~180 km away, far past the proximity fallback radius.
        let snapshot = snapshot(vec![safe_zone("far", Some("rz-1"), 18.0, 81.0)]);

        let selected = selector.select(&position(), Some(&risk_zone()), &snapshot);
        assert_eq!(selected.map(|z| z.id.as_str()), Some("far"));
    }

    #[test]
    fn test_nearest_by_squared_degrees_wins() {
        let selector = SafeZoneSelector::new();
        let snapshot = snapshot(vec![
            safe_zone("farther", Some("rz-1"), 16.6000, 80.7000),
            safe_zone("nearer", Some("rz-1"), 16.5100, 80.6500),
        ]);

        let selected = selector.select(&position(), Some(&risk_zone()), &snapshot);
        assert_eq!(selected.map(|z| z.id.as_str()), Some("nearer"));
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let selector = SafeZoneSelector::new();
        // Same offset north and south: identical squared-degree score.
        let snapshot = snapshot(vec![
            safe_zone("first", Some("rz-1"), 16.5162, 80.6480),
            safe_zone("second", Some("rz-1"), 16.4962, 80.6480),
        ]);

        let selected = selector.select(&position(), Some(&risk_zone()), &snapshot);
        assert_eq!(selected.map(|z| z.id.as_str()), Some("first"));
    }

    /// Standalone zones near the position are candidates even without
    /// a parent reference, and even with no matched risk zone at all.
    #[test]
    fn test_proximity_union_includes_unscoped_zones() {
        let selector = SafeZoneSelector::new();
        let snapshot = snapshot(vec![
            // ~1.1 km north of the position, no parent.
            safe_zone("standalone", None, 16.5162, 80.6480),
            // Scoped to a different risk zone and ~180 km away.
            safe_zone("other", Some("rz-2"), 18.0, 81.0),
        ]);

        let selected = selector.select(&position(), None, &snapshot);
        assert_eq!(selected.map(|z| z.id.as_str()), Some("standalone"));
    }

    /// A scorer that ranks nothing forces the geodesic fallback over
    /// the same candidate set.
    #[test]
    fn test_geodesic_fallback_when_scorer_abstains() {
        struct Abstainer;
        impl SafeZoneScorer for Abstainer {
            fn score(&self, _: &Coordinate, _: &SafeZone) -> Option<f64> {
                None
            }
        }

        let selector = SafeZoneSelector::with_scorer(Abstainer);
        let snapshot = snapshot(vec![
            safe_zone("farther", Some("rz-1"), 16.6000, 80.7000),
            safe_zone("nearer", Some("rz-1"), 16.5100, 80.6500),
        ]);

        let selected = selector.select(&position(), Some(&risk_zone()), &snapshot);
        assert_eq!(selected.map(|z| z.id.as_str()), Some("nearer"));
    }

    #[test]
    fn test_geodesic_scorer_strategy() {
        let selector = SafeZoneSelector::with_scorer(GeodesicScorer);
        let snapshot = snapshot(vec![
            safe_zone("nearer", Some("rz-1"), 16.5100, 80.6500),
            safe_zone("farther", Some("rz-1"), 16.6000, 80.7000),
        ]);

        let selected = selector.select(&position(), Some(&risk_zone()), &snapshot);
        assert_eq!(selected.map(|z| z.id.as_str()), Some("nearer"));
    }
}
