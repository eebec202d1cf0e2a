//! Definition for the [`TrackingStatus`] type, implemented by an enum.

use serde::{Deserialize, Serialize};

/// The status marker written alongside every position upsert, so the
/// persistence collaborator can tell a live track from one that ended.
#[derive(Debug, Clone, Copy, PartialEq, Hash, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingStatus {
    Active,
    Stopped,
}
